use chrono::{Datelike, Days, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::time_value::level_payment;
use crate::types::{percent_to_rate, Money, Rate};
use crate::CalcResult;

/// Highest annual rate accepted, in percent.
pub const MAX_ANNUAL_RATE_PERCENT: Decimal = dec!(100);

/// Longest loan term accepted, in years.
pub const MAX_TERM_YEARS: u32 = 200;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// How often a payment is made.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    Biweekly,
    Weekly,
}

/// How interest accrues on a non-monthly schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterestAccrual {
    /// Every period is charged the full monthly rate, whatever its length.
    /// Matches the published calculators.
    #[default]
    MonthlyRate,
    /// Annual rate divided by the number of payments per year.
    PerPeriod,
}

/// Loan terms shared by the baseline and accelerated schedules.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    pub annual_rate_percent: Decimal,
    pub term_years: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub payment_frequency: PaymentFrequency,
    #[serde(default)]
    pub interest_accrual: InterestAccrual,
}

/// A single lump-sum payment applied in the month of `date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneTimePayment {
    pub amount: Money,
    pub date: NaiveDate,
}

/// Extra principal paid on top of the scheduled payment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraPaymentPolicy {
    #[serde(default)]
    pub recurring_extra: Money,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_time: Option<OneTimePayment>,
    #[serde(default)]
    pub round_up_enabled: bool,
    #[serde(default)]
    pub round_up_increment: Money,
}

/// One payment period of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentScheduleEntry {
    pub period: u32,
    pub date: NaiveDate,
    pub scheduled_payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub extra_applied: Money,
    pub total_payment: Money,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
}

// ---------------------------------------------------------------------------
// PaymentFrequency
// ---------------------------------------------------------------------------

impl PaymentFrequency {
    pub fn payments_per_year(self) -> u32 {
        match self {
            PaymentFrequency::Monthly => 12,
            PaymentFrequency::Biweekly => 26,
            PaymentFrequency::Weekly => 52,
        }
    }

    /// Payments made per monthly payment (1, 26/12, 52/12).
    pub fn multiplier(self) -> Decimal {
        Decimal::from(self.payments_per_year()) / dec!(12)
    }

    /// Date of the payment `periods` periods after `start`.
    ///
    /// Months are added from the start date rather than chained, so a loan
    /// starting on the 31st keeps paying at month end.
    pub fn advance(self, start: NaiveDate, periods: u32) -> CalcResult<NaiveDate> {
        let next = match self {
            PaymentFrequency::Monthly => start.checked_add_months(Months::new(periods)),
            PaymentFrequency::Biweekly => start.checked_add_days(Days::new(14 * u64::from(periods))),
            PaymentFrequency::Weekly => start.checked_add_days(Days::new(7 * u64::from(periods))),
        };
        next.ok_or_else(|| {
            CalcError::DateError(format!(
                "payment date overflow {periods} {self:?} periods after {start}"
            ))
        })
    }

    /// Convert a count of periods into years.
    pub fn periods_to_years(self, periods: u32) -> Decimal {
        Decimal::from(periods) / Decimal::from(self.payments_per_year())
    }
}

// ---------------------------------------------------------------------------
// LoanParameters
// ---------------------------------------------------------------------------

impl LoanParameters {
    pub fn validate(&self) -> CalcResult<()> {
        if self.principal <= Decimal::ZERO {
            return Err(CalcError::invalid("principal", "Principal must be positive"));
        }
        if self.annual_rate_percent < Decimal::ZERO {
            return Err(CalcError::invalid(
                "annual_rate_percent",
                "Interest rate cannot be negative",
            ));
        }
        if self.annual_rate_percent > MAX_ANNUAL_RATE_PERCENT {
            return Err(CalcError::invalid(
                "annual_rate_percent",
                format!("Interest rate cannot exceed {MAX_ANNUAL_RATE_PERCENT}%"),
            ));
        }
        if self.term_years == 0 {
            return Err(CalcError::invalid("term_years", "Term must be at least 1 year"));
        }
        if self.term_years > MAX_TERM_YEARS {
            return Err(CalcError::invalid(
                "term_years",
                format!("Term cannot exceed {MAX_TERM_YEARS} years"),
            ));
        }
        Ok(())
    }

    /// Number of monthly payments on the base schedule.
    pub fn number_of_payments(&self) -> u32 {
        self.term_years * 12
    }

    pub fn monthly_rate(&self) -> Rate {
        percent_to_rate(self.annual_rate_percent) / dec!(12)
    }

    /// Rate charged against the balance each period.
    pub fn periodic_rate(&self) -> Rate {
        match self.interest_accrual {
            InterestAccrual::MonthlyRate => self.monthly_rate(),
            InterestAccrual::PerPeriod => {
                percent_to_rate(self.annual_rate_percent)
                    / Decimal::from(self.payment_frequency.payments_per_year())
            }
        }
    }

    /// Standard fixed payment on the monthly base schedule.
    pub fn monthly_payment(&self) -> CalcResult<Money> {
        level_payment(self.principal, self.monthly_rate(), self.number_of_payments())
    }

    /// Monthly payment split across the chosen payment frequency.
    pub fn periodic_payment(&self) -> CalcResult<Money> {
        Ok(self.monthly_payment()? / self.payment_frequency.multiplier())
    }
}

// ---------------------------------------------------------------------------
// ExtraPaymentPolicy
// ---------------------------------------------------------------------------

impl ExtraPaymentPolicy {
    /// No extra payments of any kind.
    pub fn none() -> Self {
        Self::default()
    }

    pub fn recurring(amount: Money) -> Self {
        Self {
            recurring_extra: amount,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.recurring_extra < Decimal::ZERO {
            return Err(CalcError::invalid(
                "recurring_extra",
                "Recurring extra payment cannot be negative",
            ));
        }
        if let Some(one_time) = &self.one_time {
            if one_time.amount < Decimal::ZERO {
                return Err(CalcError::invalid(
                    "one_time.amount",
                    "One-time payment cannot be negative",
                ));
            }
        }
        if self.round_up_enabled && self.round_up_increment <= Decimal::ZERO {
            return Err(CalcError::invalid(
                "round_up_increment",
                "Round-up increment must be positive when round-up is enabled",
            ));
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.recurring_extra.is_zero()
            && self.one_time.as_ref().map_or(true, |p| p.amount.is_zero())
            && !self.round_up_enabled
    }

    /// Top-up that lifts `payment` to the next multiple of the increment.
    pub fn round_up_amount(&self, payment: Money) -> CalcResult<Money> {
        if !self.round_up_enabled || self.round_up_increment <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let inc = self.round_up_increment;
        payment
            .checked_div(inc)
            .and_then(|steps| steps.ceil().checked_mul(inc))
            .map(|rounded| rounded - payment)
            .ok_or_else(|| CalcError::overflow("round_up_increment", "round-up of the payment"))
    }

    /// True when the one-time payment belongs to the period dated `date`.
    pub fn one_time_due(&self, date: NaiveDate) -> bool {
        self.one_time
            .as_ref()
            .map_or(false, |p| p.date.year() == date.year() && p.date.month() == date.month())
    }
}
