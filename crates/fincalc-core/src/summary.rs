//! Headline metrics derived from completed schedules and projections.
//!
//! Everything here is a total function over already-computed sequences; the
//! projectors own validation.

#[cfg(feature = "mortgage")]
use chrono::NaiveDate;
#[cfg(any(feature = "mortgage", feature = "retirement"))]
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[cfg(feature = "mortgage")]
use crate::mortgage::loan::{PaymentFrequency, PaymentScheduleEntry};
#[cfg(feature = "retirement")]
use crate::retirement::projection::{RetirementAccountParameters, YearlyProjectionEntry};
#[cfg(feature = "retirement")]
use crate::time_value::real_value;
use crate::types::{Money, Rate, Years};
use crate::CalcResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Totals for a single amortization schedule.
#[cfg(feature = "mortgage")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanSummary {
    pub number_of_payments: u32,
    pub total_interest_paid: Money,
    pub total_principal_paid: Money,
    pub total_extra_paid: Money,
    pub total_paid: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payoff_date: Option<NaiveDate>,
    pub years_to_payoff: Years,
}

/// Accelerated schedule measured against its no-extra baseline.
#[cfg(feature = "mortgage")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffComparison {
    pub baseline: LoanSummary,
    pub accelerated: LoanSummary,
    pub interest_saved: Money,
    pub interest_saved_pct: Rate,
    pub periods_saved: i64,
    pub time_saved_years: Years,
}

/// Headline figures for a retirement growth projection.
#[cfg(feature = "retirement")]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementSummary {
    pub years: u32,
    pub initial_balance: Money,
    pub final_balance: Money,
    pub total_contributions: Money,
    pub investment_growth: Money,
    pub effective_rate_percent: Decimal,
    pub inflation_adjusted_balance: Money,
}

/// A completed projection handed to [`summarize`].
pub enum Projection<'a> {
    #[cfg(feature = "mortgage")]
    Loan {
        schedule: &'a [PaymentScheduleEntry],
        baseline: Option<&'a [PaymentScheduleEntry]>,
        frequency: PaymentFrequency,
    },
    #[cfg(feature = "retirement")]
    Retirement {
        entries: &'a [YearlyProjectionEntry],
        params: &'a RetirementAccountParameters,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SummaryMetrics {
    #[cfg(feature = "mortgage")]
    Loan(LoanSummary),
    #[cfg(feature = "mortgage")]
    Payoff(PayoffComparison),
    #[cfg(feature = "retirement")]
    Retirement(RetirementSummary),
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Derive headline metrics for any projection. Loan schedules with a
/// baseline produce a [`PayoffComparison`].
pub fn summarize(projection: Projection<'_>) -> CalcResult<SummaryMetrics> {
    match projection {
        #[cfg(feature = "mortgage")]
        Projection::Loan {
            schedule,
            baseline: Some(baseline),
            frequency,
        } => Ok(SummaryMetrics::Payoff(compare_schedules(
            baseline, schedule, frequency,
        ))),
        #[cfg(feature = "mortgage")]
        Projection::Loan {
            schedule,
            baseline: None,
            frequency,
        } => Ok(SummaryMetrics::Loan(summarize_schedule(schedule, frequency))),
        #[cfg(feature = "retirement")]
        Projection::Retirement { entries, params } => Ok(SummaryMetrics::Retirement(
            summarize_projection(entries, params)?,
        )),
    }
}

// ---------------------------------------------------------------------------
// Loans
// ---------------------------------------------------------------------------

#[cfg(feature = "mortgage")]
pub fn summarize_schedule(
    schedule: &[PaymentScheduleEntry],
    frequency: PaymentFrequency,
) -> LoanSummary {
    let mut total_principal = Decimal::ZERO;
    let mut total_extra = Decimal::ZERO;
    for entry in schedule {
        total_principal += entry.principal_portion + entry.extra_applied;
        total_extra += entry.extra_applied;
    }

    let total_interest = schedule
        .last()
        .map_or(Decimal::ZERO, |e| e.cumulative_interest);
    let number_of_payments = schedule.len() as u32;

    LoanSummary {
        number_of_payments,
        total_interest_paid: total_interest,
        total_principal_paid: total_principal,
        total_extra_paid: total_extra,
        total_paid: total_principal + total_interest,
        payoff_date: schedule.last().map(|e| e.date),
        years_to_payoff: frequency.periods_to_years(number_of_payments),
    }
}

#[cfg(feature = "mortgage")]
pub fn compare_schedules(
    baseline: &[PaymentScheduleEntry],
    accelerated: &[PaymentScheduleEntry],
    frequency: PaymentFrequency,
) -> PayoffComparison {
    let base = summarize_schedule(baseline, frequency);
    let fast = summarize_schedule(accelerated, frequency);

    let interest_saved = base.total_interest_paid - fast.total_interest_paid;
    if interest_saved < Decimal::ZERO {
        warn!("accelerated schedule pays {interest_saved} more interest than its baseline");
    }
    let interest_saved_pct = if base.total_interest_paid.is_zero() {
        Decimal::ZERO
    } else {
        interest_saved / base.total_interest_paid
    };

    let periods_saved = i64::from(base.number_of_payments) - i64::from(fast.number_of_payments);
    let time_saved_years =
        Decimal::from(periods_saved) / Decimal::from(frequency.payments_per_year());

    PayoffComparison {
        baseline: base,
        accelerated: fast,
        interest_saved,
        interest_saved_pct,
        periods_saved,
        time_saved_years,
    }
}

// ---------------------------------------------------------------------------
// Retirement
// ---------------------------------------------------------------------------

#[cfg(feature = "retirement")]
pub fn summarize_projection(
    entries: &[YearlyProjectionEntry],
    params: &RetirementAccountParameters,
) -> CalcResult<RetirementSummary> {
    let years = entries.len() as u32;
    let final_balance = entries
        .last()
        .map_or(params.current_balance, |e| e.balance);
    let total_contributions = entries
        .last()
        .map_or(Decimal::ZERO, |e| e.cumulative_contributions);
    let investment_growth = final_balance - total_contributions - params.current_balance;
    if investment_growth < Decimal::ZERO {
        warn!("projection lost {investment_growth} against contributions");
    }

    Ok(RetirementSummary {
        years,
        initial_balance: params.current_balance,
        final_balance,
        total_contributions,
        investment_growth,
        effective_rate_percent: params.effective_rate_percent(),
        inflation_adjusted_balance: real_value(
            final_balance,
            crate::types::percent_to_rate(params.inflation_percent),
            years,
        )?,
    })
}

#[cfg(all(test, feature = "mortgage"))]
mod tests {
    use super::*;
    use crate::mortgage::amortization::{compute_amortization_schedule, compute_baseline_schedule};
    use crate::mortgage::loan::{ExtraPaymentPolicy, InterestAccrual, LoanParameters};
    use rust_decimal_macros::dec;

    fn loan() -> LoanParameters {
        LoanParameters {
            principal: dec!(300_000),
            annual_rate_percent: dec!(6),
            term_years: 30,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            payment_frequency: PaymentFrequency::Monthly,
            interest_accrual: InterestAccrual::MonthlyRate,
        }
    }

    #[test]
    fn test_schedule_summary_totals() {
        let schedule = compute_baseline_schedule(&loan()).unwrap();
        let s = summarize_schedule(&schedule, PaymentFrequency::Monthly);
        assert_eq!(s.number_of_payments, 360);
        assert_eq!(s.years_to_payoff, dec!(30));
        assert!((s.total_principal_paid - dec!(300_000)).abs() < dec!(0.000001));
        assert_eq!(s.total_extra_paid, Decimal::ZERO);
        assert_eq!(s.payoff_date, NaiveDate::from_ymd_opt(2054, 12, 1));
    }

    #[test]
    fn test_comparison_reports_savings() {
        let l = loan();
        let base = compute_baseline_schedule(&l).unwrap();
        let fast = compute_amortization_schedule(&l, &ExtraPaymentPolicy::recurring(dec!(200))).unwrap();
        let cmp = compare_schedules(&base, &fast, PaymentFrequency::Monthly);
        assert_eq!(cmp.periods_saved, 81);
        assert_eq!(cmp.time_saved_years, dec!(6.75));
        assert!((cmp.interest_saved - dec!(91_173.43)).abs() < dec!(0.1), "got {}", cmp.interest_saved);
        assert!(cmp.interest_saved_pct > dec!(0.26) && cmp.interest_saved_pct < dec!(0.27));
    }

    #[test]
    fn test_summarize_dispatches_on_baseline() {
        let l = loan();
        let base = compute_baseline_schedule(&l).unwrap();
        let single = summarize(Projection::Loan {
            schedule: &base,
            baseline: None,
            frequency: PaymentFrequency::Monthly,
        })
        .unwrap();
        assert!(matches!(single, SummaryMetrics::Loan(_)));

        let paired = summarize(Projection::Loan {
            schedule: &base,
            baseline: Some(&base),
            frequency: PaymentFrequency::Monthly,
        })
        .unwrap();
        match paired {
            SummaryMetrics::Payoff(cmp) => {
                assert_eq!(cmp.interest_saved, Decimal::ZERO);
                assert_eq!(cmp.periods_saved, 0);
            }
            other => panic!("expected payoff comparison, got {other:?}"),
        }
    }
}
