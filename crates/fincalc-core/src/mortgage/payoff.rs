use std::collections::BTreeMap;
use std::time::Instant;

use chrono::Datelike;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::amortization::{compute_amortization_schedule, compute_baseline_schedule};
use super::loan::{
    ExtraPaymentPolicy, InterestAccrual, LoanParameters, PaymentFrequency, PaymentScheduleEntry,
};
use crate::summary::{compare_schedules, PayoffComparison};
use crate::types::{with_metadata, ComputationOutput, Money};
use crate::CalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Input for the mortgage payoff calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffInput {
    pub loan: LoanParameters,
    #[serde(default)]
    pub extra: ExtraPaymentPolicy,
    /// Return full schedules alongside the summary.
    #[serde(default = "default_include_schedule")]
    pub include_schedule: bool,
}

fn default_include_schedule() -> bool {
    true
}

/// Output of `analyze_payoff`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayoffOutput {
    pub monthly_payment: Money,
    pub periodic_payment: Money,
    pub payment_frequency: PaymentFrequency,
    pub comparison: PayoffComparison,
    pub yearly_breakdown: Vec<YearlyLoanTotals>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub schedule: Vec<PaymentScheduleEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub baseline_schedule: Vec<PaymentScheduleEntry>,
}

/// Calendar-year roll-up of the accelerated schedule, with the baseline
/// balance alongside for charting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyLoanTotals {
    pub year: i32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub extra_paid: Money,
    pub ending_balance: Money,
    pub baseline_ending_balance: Money,
}

impl YearlyLoanTotals {
    fn empty(year: i32) -> Self {
        Self {
            year,
            principal_paid: Decimal::ZERO,
            interest_paid: Decimal::ZERO,
            extra_paid: Decimal::ZERO,
            ending_balance: Decimal::ZERO,
            baseline_ending_balance: Decimal::ZERO,
        }
    }
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Run the baseline and accelerated schedules for a loan and report how much
/// interest and time the extra-payment policy saves.
pub fn analyze_payoff(input: &PayoffInput) -> CalcResult<ComputationOutput<PayoffOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let loan = &input.loan;
    let extra = &input.extra;

    let baseline = compute_baseline_schedule(loan)?;
    let schedule = compute_amortization_schedule(loan, extra)?;

    if loan.payment_frequency != PaymentFrequency::Monthly
        && loan.interest_accrual == InterestAccrual::MonthlyRate
    {
        warnings.push(format!(
            "Interest is charged at the full monthly rate on every {:?} payment; \
             use per_period accrual for interest proportional to period length",
            loan.payment_frequency
        ));
    }

    if extra.is_empty() {
        warnings.push("No extra payments configured; schedule matches the baseline".into());
    }

    if let Some(one_time) = extra.one_time.as_ref().filter(|p| !p.amount.is_zero()) {
        match schedule.iter().find(|e| extra.one_time_due(e.date)) {
            None => {
                warn!("one-time payment dated {} is outside the schedule", one_time.date);
                warnings.push(format!(
                    "One-time payment dated {} falls outside the payment schedule and was not applied",
                    one_time.date
                ));
            }
            // The final period is settled exactly, so a lump sum landing there
            // is absorbed by the payoff.
            Some(entry) if entry.extra_applied < one_time.amount => {
                warn!(
                    "one-time payment of {} in period {} exceeds the payoff amount",
                    one_time.amount, entry.period
                );
                warnings.push(format!(
                    "One-time payment of {} falls in the final period; only the remaining \
                     balance of {} was paid",
                    one_time.amount,
                    entry.principal_portion.round_dp(2)
                ));
            }
            Some(_) => {}
        }
    }

    let comparison = compare_schedules(&baseline, &schedule, loan.payment_frequency);
    let yearly_breakdown = yearly_breakdown(&schedule, &baseline);

    let output = PayoffOutput {
        monthly_payment: loan.monthly_payment()?,
        periodic_payment: loan.periodic_payment()?,
        payment_frequency: loan.payment_frequency,
        comparison,
        yearly_breakdown,
        schedule: if input.include_schedule { schedule } else { Vec::new() },
        baseline_schedule: if input.include_schedule { baseline } else { Vec::new() },
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Mortgage payoff (level-payment amortization with extra, round-up and one-time payments)",
        &serde_json::json!({
            "principal": loan.principal.to_string(),
            "annual_rate_percent": loan.annual_rate_percent.to_string(),
            "term_years": loan.term_years,
            "payment_frequency": loan.payment_frequency,
            "interest_accrual": loan.interest_accrual,
            "recurring_extra": extra.recurring_extra.to_string(),
            "round_up_enabled": extra.round_up_enabled,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn yearly_breakdown(
    schedule: &[PaymentScheduleEntry],
    baseline: &[PaymentScheduleEntry],
) -> Vec<YearlyLoanTotals> {
    let mut years: BTreeMap<i32, YearlyLoanTotals> = BTreeMap::new();

    for entry in baseline {
        let year = entry.date.year();
        years
            .entry(year)
            .or_insert_with(|| YearlyLoanTotals::empty(year))
            .baseline_ending_balance = entry.remaining_balance;
    }

    for entry in schedule {
        let year = entry.date.year();
        let row = years
            .entry(year)
            .or_insert_with(|| YearlyLoanTotals::empty(year));
        row.principal_paid += entry.principal_portion + entry.extra_applied;
        row.interest_paid += entry.interest_portion;
        row.extra_paid += entry.extra_applied;
        row.ending_balance = entry.remaining_balance;
    }

    years.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mortgage::loan::OneTimePayment;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn input(extra: ExtraPaymentPolicy) -> PayoffInput {
        PayoffInput {
            loan: LoanParameters {
                principal: dec!(300_000),
                annual_rate_percent: dec!(6),
                term_years: 30,
                start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
                payment_frequency: PaymentFrequency::Monthly,
                interest_accrual: InterestAccrual::MonthlyRate,
            },
            extra,
            include_schedule: true,
        }
    }

    #[test]
    fn test_payoff_with_recurring_extra() {
        let out = analyze_payoff(&input(ExtraPaymentPolicy::recurring(dec!(200)))).unwrap();
        let r = &out.result;
        assert_eq!(r.schedule.len(), 279);
        assert_eq!(r.baseline_schedule.len(), 360);
        assert_eq!(r.comparison.periods_saved, 81);
        assert!(r.comparison.interest_saved > Decimal::ZERO);
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_yearly_breakdown_spans_baseline_years() {
        let out = analyze_payoff(&input(ExtraPaymentPolicy::recurring(dec!(200)))).unwrap();
        let rows = &out.result.yearly_breakdown;
        assert_eq!(rows.len(), 30);
        assert_eq!(rows[0].year, 2025);
        // 279 payments from Jan 2025 end in March 2048.
        let tail = rows.iter().find(|r| r.year == 2049).unwrap();
        assert_eq!(tail.ending_balance, Decimal::ZERO);
        assert!(tail.baseline_ending_balance > Decimal::ZERO);
        let paid: Money = rows.iter().map(|r| r.principal_paid).sum();
        assert!((paid - dec!(300_000)).abs() < dec!(0.000001));
    }

    #[test]
    fn test_schedule_can_be_omitted() {
        let mut i = input(ExtraPaymentPolicy::recurring(dec!(100)));
        i.include_schedule = false;
        let out = analyze_payoff(&i).unwrap();
        assert!(out.result.schedule.is_empty());
        assert!(out.result.baseline_schedule.is_empty());
        assert!(out.result.comparison.accelerated.number_of_payments < 360);
    }

    #[test]
    fn test_warns_on_empty_policy_and_missed_one_time() {
        let out = analyze_payoff(&input(ExtraPaymentPolicy::none())).unwrap();
        assert_eq!(out.warnings.len(), 1);

        let extra = ExtraPaymentPolicy {
            one_time: Some(OneTimePayment {
                amount: dec!(5_000),
                date: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            }),
            ..ExtraPaymentPolicy::default()
        };
        let out = analyze_payoff(&input(extra)).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("outside the payment schedule")));
        assert_eq!(out.result.comparison.interest_saved, Decimal::ZERO);
    }

    #[test]
    fn test_warns_when_one_time_lands_in_final_period() {
        // The 360th payment of a January 2025 loan falls in December 2054.
        let extra = ExtraPaymentPolicy {
            one_time: Some(OneTimePayment {
                amount: dec!(10_000),
                date: NaiveDate::from_ymd_opt(2054, 12, 15).unwrap(),
            }),
            ..ExtraPaymentPolicy::default()
        };
        let out = analyze_payoff(&input(extra)).unwrap();
        let last = out.result.schedule.last().unwrap();
        assert_eq!(out.result.schedule.len(), 360);
        assert_eq!(last.extra_applied, Decimal::ZERO);
        assert!(out.warnings.iter().any(|w| w.contains("final period")));
        assert!(!out.warnings.iter().any(|w| w.contains("outside the payment schedule")));
        assert_eq!(out.result.comparison.interest_saved, Decimal::ZERO);
    }
}
