use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::loan::{ExtraPaymentPolicy, LoanParameters, PaymentScheduleEntry};
use crate::error::CalcError;
use crate::CalcResult;

/// Years of payments allowed beyond the contractual term before a schedule
/// is declared non-convergent.
pub const SCHEDULE_OVERRUN_YEARS: u32 = 100;

/// Residual balance below this is settled in the current period instead of
/// spilling into a dust period.
const SETTLEMENT_TOLERANCE: Decimal = dec!(0.005);

/// Hard ceiling on schedule length for `loan`, in payment periods.
pub fn max_schedule_periods(loan: &LoanParameters) -> u32 {
    loan.term_years
        .saturating_add(SCHEDULE_OVERRUN_YEARS)
        .saturating_mul(loan.payment_frequency.payments_per_year())
}

/// Build the payment-by-payment schedule for `loan` with `extra` applied on
/// top of each scheduled payment. The last entry always carries a zero
/// balance.
pub fn compute_amortization_schedule(
    loan: &LoanParameters,
    extra: &ExtraPaymentPolicy,
) -> CalcResult<Vec<PaymentScheduleEntry>> {
    loan.validate()?;
    extra.validate()?;
    amortize(loan, extra, max_schedule_periods(loan))
}

fn amortize(
    loan: &LoanParameters,
    extra: &ExtraPaymentPolicy,
    max_periods: u32,
) -> CalcResult<Vec<PaymentScheduleEntry>> {
    let frequency = loan.payment_frequency;
    let rate = loan.periodic_rate();
    let payment = loan.periodic_payment()?;
    let round_up = extra.round_up_amount(payment)?;
    let recurring = checked(extra.recurring_extra.checked_add(round_up), "recurring_extra")?;

    let mut schedule: Vec<PaymentScheduleEntry> =
        Vec::with_capacity((loan.term_years * frequency.payments_per_year()) as usize);
    let mut balance = loan.principal;
    let mut cumulative_interest = Decimal::ZERO;
    let mut one_time_pending = extra.one_time.is_some();
    let mut period: u32 = 0;

    while balance > Decimal::ZERO {
        if period >= max_periods {
            warn!(
                "amortization hit the {max_periods}-period cap with {balance} outstanding"
            );
            return Err(CalcError::NonConvergence {
                function: "amortization".into(),
                iterations: period,
                remaining_balance: balance,
            });
        }

        let date = frequency.advance(loan.start_date, period)?;
        let interest = checked(balance.checked_mul(rate), "annual_rate_percent")?;
        let mut principal = payment - interest;

        let mut extra_amount = recurring;
        if one_time_pending && extra.one_time_due(date) {
            if let Some(one_time) = &extra.one_time {
                extra_amount = checked(extra_amount.checked_add(one_time.amount), "one_time.amount")?;
            }
            // Several biweekly/weekly periods can share a month; pay once.
            one_time_pending = false;
        }

        let paid_down = checked(principal.checked_add(extra_amount), "recurring_extra")?;
        if paid_down <= Decimal::ZERO {
            warn!(
                "payment {payment} does not cover interest {interest} in period {}",
                period + 1
            );
            return Err(CalcError::NonConvergence {
                function: "amortization".into(),
                iterations: period,
                remaining_balance: balance,
            });
        }

        // Final period: pay off exactly, never overpay.
        if balance - paid_down < SETTLEMENT_TOLERANCE {
            principal = balance;
            extra_amount = Decimal::ZERO;
        }

        balance -= principal + extra_amount;
        cumulative_interest = checked(
            cumulative_interest.checked_add(interest),
            "annual_rate_percent",
        )?;
        period += 1;

        schedule.push(PaymentScheduleEntry {
            period,
            date,
            scheduled_payment: payment,
            principal_portion: principal,
            interest_portion: interest,
            extra_applied: extra_amount,
            total_payment: principal + interest + extra_amount,
            remaining_balance: balance,
            cumulative_interest,
        });
    }

    debug!(
        "amortization: {} {:?} periods, total interest {}",
        schedule.len(),
        frequency,
        cumulative_interest.round_dp(2)
    );

    Ok(schedule)
}

fn checked(value: Option<Decimal>, field: &str) -> CalcResult<Decimal> {
    value.ok_or_else(|| CalcError::overflow(field, "amortization arithmetic"))
}

/// Schedule for `loan` with no extra payments, the comparison baseline.
pub fn compute_baseline_schedule(loan: &LoanParameters) -> CalcResult<Vec<PaymentScheduleEntry>> {
    compute_amortization_schedule(loan, &ExtraPaymentPolicy::none())
}
