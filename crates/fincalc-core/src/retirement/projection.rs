use log::{debug, warn};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::limits::ContributionLimits;
use crate::error::CalcError;
use crate::types::{percent_to_rate, Money, Rate};
use crate::CalcResult;

/// Highest return, inflation or contribution growth accepted, in percent.
pub const MAX_ANNUAL_PERCENT: Decimal = dec!(100);

/// Oldest target age accepted.
pub const MAX_TARGET_AGE: u32 = 150;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Inputs for a tax-advantaged account growth projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementAccountParameters {
    pub current_age: u32,
    pub target_age: u32,
    pub current_balance: Money,
    pub annual_contribution: Money,
    #[serde(default)]
    pub annual_contribution_growth_percent: Decimal,
    #[serde(default)]
    pub catch_up_enabled: bool,
    pub annual_return_percent: Decimal,
    #[serde(default)]
    pub management_fee_percent: Decimal,
    #[serde(default = "default_compounding")]
    pub compounding_periods_per_year: u32,
    #[serde(default)]
    pub inflation_percent: Decimal,
    /// Calendar year of the first projected year; limits lookups use it.
    /// Defaults to the latest year in the limits table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_year: Option<i32>,
}

fn default_compounding() -> u32 {
    12
}

/// One projected year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyProjectionEntry {
    pub year: u32,
    /// Age during the contribution year.
    pub age: u32,
    pub calendar_year: i32,
    pub contribution: Money,
    pub contribution_capped: bool,
    pub cumulative_contributions: Money,
    pub balance: Money,
    pub cumulative_growth: Money,
}

impl RetirementAccountParameters {
    pub fn validate(&self) -> CalcResult<()> {
        if self.target_age <= self.current_age {
            return Err(CalcError::invalid(
                "target_age",
                "Target age must be greater than current age",
            ));
        }
        if self.target_age > MAX_TARGET_AGE {
            return Err(CalcError::invalid(
                "target_age",
                format!("Target age cannot exceed {MAX_TARGET_AGE}"),
            ));
        }
        for (field, value) in [
            ("annual_return_percent", self.annual_return_percent),
            ("annual_contribution_growth_percent", self.annual_contribution_growth_percent),
            ("inflation_percent", self.inflation_percent),
        ] {
            if value > MAX_ANNUAL_PERCENT {
                return Err(CalcError::invalid(
                    field,
                    format!("Cannot exceed {MAX_ANNUAL_PERCENT}%"),
                ));
            }
        }
        if self.current_balance < Decimal::ZERO {
            return Err(CalcError::invalid(
                "current_balance",
                "Current balance cannot be negative",
            ));
        }
        if self.annual_contribution < Decimal::ZERO {
            return Err(CalcError::invalid(
                "annual_contribution",
                "Annual contribution cannot be negative",
            ));
        }
        if self.annual_contribution_growth_percent <= dec!(-100) {
            return Err(CalcError::invalid(
                "annual_contribution_growth_percent",
                "Contribution growth must be greater than -100%",
            ));
        }
        if self.management_fee_percent < Decimal::ZERO {
            return Err(CalcError::invalid(
                "management_fee_percent",
                "Management fee cannot be negative",
            ));
        }
        if self.effective_rate_percent() <= dec!(-100) {
            return Err(CalcError::invalid(
                "annual_return_percent",
                "Return net of fees must be greater than -100%",
            ));
        }
        if self.inflation_percent <= dec!(-100) {
            return Err(CalcError::invalid(
                "inflation_percent",
                "Inflation must be greater than -100%",
            ));
        }
        if !matches!(self.compounding_periods_per_year, 1 | 2 | 4 | 12) {
            return Err(CalcError::invalid(
                "compounding_periods_per_year",
                "Compounding must be 1, 2, 4 or 12 times per year",
            ));
        }
        Ok(())
    }

    pub fn years(&self) -> u32 {
        self.target_age.saturating_sub(self.current_age)
    }

    /// Return net of the management fee, in percent.
    pub fn effective_rate_percent(&self) -> Decimal {
        self.annual_return_percent - self.management_fee_percent
    }

    pub fn effective_annual_rate(&self) -> Rate {
        percent_to_rate(self.effective_rate_percent())
    }
}

// ---------------------------------------------------------------------------
// Core functions
// ---------------------------------------------------------------------------

/// Year-by-year projection under the built-in IRA contribution limits.
pub fn compute_retirement_projection(
    params: &RetirementAccountParameters,
) -> CalcResult<Vec<YearlyProjectionEntry>> {
    project_with_limits(params, &ContributionLimits::default())
}

/// Year-by-year projection with contributions capped by `limits`.
///
/// Each year's contribution is spread evenly over the compounding periods
/// and compounds with the balance.
pub fn project_with_limits(
    params: &RetirementAccountParameters,
    limits: &ContributionLimits,
) -> CalcResult<Vec<YearlyProjectionEntry>> {
    params.validate()?;
    limits.validate()?;

    let years = params.years();
    let periods = params.compounding_periods_per_year;
    let periods_dec = Decimal::from(periods);
    let periodic_rate = params.effective_annual_rate() / periods_dec;
    let growth = Decimal::ONE + percent_to_rate(params.annual_contribution_growth_percent);
    let first_year = match params.start_year {
        Some(year) => year,
        None => limits.latest_year()?,
    };

    let mut entries = Vec::with_capacity(years as usize);
    let mut yearly_contribution = params.annual_contribution;
    let mut balance = params.current_balance;
    let mut cumulative_contributions = Decimal::ZERO;

    for year in 0..years {
        let age = params.current_age + year;
        let calendar_year = first_year
            .checked_add(year as i32)
            .ok_or_else(|| CalcError::invalid("start_year", "Calendar year out of range"))?;
        let limit = limits.for_year(calendar_year)?;
        let catch_up = limits.catch_up_for(limit, age, params.catch_up_enabled);
        let cap = checked(limit.base.checked_add(catch_up), "limits")?;

        let requested = checked(yearly_contribution.checked_add(catch_up), "annual_contribution")?;
        let contribution = requested.min(cap);
        let capped = requested > cap;
        if capped {
            warn!("age {age}: contribution {requested} capped at {cap} for {calendar_year}");
        }

        let per_period = contribution / periods_dec;
        for _ in 0..periods {
            balance = checked(
                balance
                    .checked_mul(Decimal::ONE + periodic_rate)
                    .and_then(|grown| grown.checked_add(per_period)),
                "annual_return_percent",
            )?;
        }

        cumulative_contributions = checked(
            cumulative_contributions.checked_add(contribution),
            "annual_contribution",
        )?;
        entries.push(YearlyProjectionEntry {
            year: year + 1,
            age,
            calendar_year,
            contribution,
            contribution_capped: capped,
            cumulative_contributions,
            balance,
            cumulative_growth: balance - cumulative_contributions - params.current_balance,
        });

        yearly_contribution = checked(
            yearly_contribution.checked_mul(growth),
            "annual_contribution_growth_percent",
        )?;
    }

    debug!(
        "retirement projection: {years} years, final balance {}",
        balance.round_dp(2)
    );

    Ok(entries)
}

fn checked(value: Option<Decimal>, field: &str) -> CalcResult<Decimal> {
    value.ok_or_else(|| CalcError::overflow(field, "projected balance"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time_value::future_value;
    use rust_decimal_macros::dec;

    fn params() -> RetirementAccountParameters {
        RetirementAccountParameters {
            current_age: 30,
            target_age: 65,
            current_balance: dec!(10_000),
            annual_contribution: dec!(6_000),
            annual_contribution_growth_percent: Decimal::ZERO,
            catch_up_enabled: false,
            annual_return_percent: dec!(7),
            management_fee_percent: Decimal::ZERO,
            compounding_periods_per_year: 1,
            inflation_percent: Decimal::ZERO,
            start_year: Some(2025),
        }
    }

    #[test]
    fn test_annual_compounding_matches_closed_form() {
        let p = params();
        let entries = compute_retirement_projection(&p).unwrap();
        assert_eq!(entries.len(), 35);
        let expected = future_value(dec!(10_000), dec!(0.07), 35, dec!(6_000)).unwrap();
        let last = entries.last().unwrap();
        assert!((last.balance - expected).abs() < dec!(0.000001), "got {}", last.balance);
        assert_eq!(last.cumulative_contributions, dec!(210_000));
    }

    #[test]
    fn test_monthly_compounding_matches_closed_form() {
        let mut p = params();
        p.compounding_periods_per_year = 12;
        let entries = compute_retirement_projection(&p).unwrap();
        let rate = dec!(0.07) / dec!(12);
        let expected = future_value(dec!(10_000), rate, 35 * 12, dec!(500)).unwrap();
        assert!((entries.last().unwrap().balance - expected).abs() < dec!(0.0001));
    }

    #[test]
    fn test_growth_identity_holds_each_year() {
        let entries = compute_retirement_projection(&params()).unwrap();
        for e in &entries {
            assert_eq!(e.cumulative_growth, e.balance - e.cumulative_contributions - dec!(10_000));
        }
        assert_eq!(entries[0].age, 30);
        assert_eq!(entries[0].calendar_year, 2025);
    }

    #[test]
    fn test_fee_reduces_effective_rate() {
        let mut p = params();
        p.management_fee_percent = dec!(1);
        let entries = compute_retirement_projection(&p).unwrap();
        let expected = future_value(dec!(10_000), dec!(0.06), 35, dec!(6_000)).unwrap();
        assert!((entries.last().unwrap().balance - expected).abs() < dec!(0.000001));
    }

    #[test]
    fn test_contribution_growth_is_capped_every_year() {
        let mut p = params();
        p.annual_contribution_growth_percent = dec!(10);
        p.start_year = Some(2023);
        let entries = compute_retirement_projection(&p).unwrap();
        // 6000 grows past the 2025 limit of 7000 in year 3 (6000 * 1.1^2 = 7260).
        assert!(!entries[1].contribution_capped);
        assert_eq!(entries[1].contribution, dec!(6600));
        assert!(entries[2].contribution_capped);
        assert!(entries[2..].iter().all(|e| e.contribution <= dec!(7500)));
    }

    #[test]
    fn test_catch_up_starts_at_fifty() {
        let mut p = params();
        p.current_age = 48;
        p.target_age = 52;
        p.annual_contribution = dec!(7_000);
        p.catch_up_enabled = true;
        p.start_year = Some(2024);
        let limits = ContributionLimits::default();
        let entries = project_with_limits(&p, &limits).unwrap();
        let contributions: Vec<Money> = entries.iter().map(|e| e.contribution).collect();
        // Ages 48, 49, 50, 51 in 2024..2027.
        assert_eq!(contributions, vec![dec!(7000), dec!(7000), dec!(8100), dec!(8100)]);
    }

    #[test]
    fn test_target_age_must_exceed_current_age() {
        let mut p = params();
        p.target_age = 30;
        let err = compute_retirement_projection(&p).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "target_age"));
    }

    #[test]
    fn test_rejects_unsupported_compounding() {
        let mut p = params();
        p.compounding_periods_per_year = 3;
        assert!(compute_retirement_projection(&p).is_err());
    }

    #[test]
    fn test_rejects_out_of_range_rates_and_ages() {
        let mut p = params();
        p.annual_return_percent = dec!(500);
        let err = compute_retirement_projection(&p).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "annual_return_percent"));

        let mut p = params();
        p.target_age = MAX_TARGET_AGE + 1;
        let err = compute_retirement_projection(&p).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "target_age"));
    }

    #[test]
    fn test_balance_overflow_is_an_error() {
        let mut p = params();
        p.current_age = 20;
        p.target_age = 120;
        p.annual_return_percent = MAX_ANNUAL_PERCENT;
        p.compounding_periods_per_year = 12;
        let err = compute_retirement_projection(&p).unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { ref field, .. } if field == "annual_return_percent"));
    }
}
