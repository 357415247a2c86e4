use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::limits::ContributionLimits;
use super::projection::{project_with_limits, RetirementAccountParameters, YearlyProjectionEntry};
use crate::error::CalcError;
use crate::summary::{summarize_projection, RetirementSummary};
use crate::types::{percent_to_rate, with_metadata, ComputationOutput, Money};
use crate::CalcResult;

/// Input for the Roth IRA calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RothIraInput {
    pub account: RetirementAccountParameters,
    /// Marginal tax rate the growth would otherwise be taxed at.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marginal_tax_rate_percent: Option<Decimal>,
    /// Overrides the built-in contribution limits table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limits: Option<ContributionLimits>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RothIraOutput {
    pub summary: RetirementSummary,
    pub first_year_monthly_contribution: Money,
    pub years_contribution_capped: u32,
    pub catch_up_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_tax_savings: Option<Money>,
    pub year_by_year: Vec<YearlyProjectionEntry>,
}

/// Project a Roth IRA to the target age and summarise tax-free growth.
pub fn plan_roth_ira(input: &RothIraInput) -> CalcResult<ComputationOutput<RothIraOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if let Some(rate) = input.marginal_tax_rate_percent {
        if rate < Decimal::ZERO || rate > dec!(100) {
            return Err(CalcError::invalid(
                "marginal_tax_rate_percent",
                "Tax rate must be between 0 and 100",
            ));
        }
    }

    let default_limits;
    let limits = match &input.limits {
        Some(custom) => custom,
        None => {
            default_limits = ContributionLimits::default();
            &default_limits
        }
    };

    let account = &input.account;
    let year_by_year = project_with_limits(account, limits)?;
    let summary = summarize_projection(&year_by_year, account)?;

    let years_contribution_capped =
        year_by_year.iter().filter(|e| e.contribution_capped).count() as u32;
    if years_contribution_capped > 0 {
        warnings.push(format!(
            "Contributions were limited to the annual maximum in {years_contribution_capped} of {} years",
            year_by_year.len()
        ));
    }

    let catch_up_years = if account.catch_up_enabled {
        year_by_year
            .iter()
            .filter(|e| e.age >= limits.catch_up_age)
            .count() as u32
    } else {
        0
    };
    if account.catch_up_enabled && catch_up_years == 0 {
        warnings.push(format!(
            "Catch-up contributions are enabled but no projected year reaches age {}",
            limits.catch_up_age
        ));
    }

    if account.effective_rate_percent() < Decimal::ZERO {
        warnings.push("Management fee exceeds the expected return; balance shrinks in real terms".into());
    }

    let estimated_tax_savings = input
        .marginal_tax_rate_percent
        .map(|rate| summary.investment_growth.max(Decimal::ZERO) * percent_to_rate(rate));

    let first_year_monthly_contribution = year_by_year
        .first()
        .map_or(Decimal::ZERO, |e| e.contribution / dec!(12));

    let output = RothIraOutput {
        summary,
        first_year_monthly_contribution,
        years_contribution_capped,
        catch_up_years,
        estimated_tax_savings,
        year_by_year,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Roth IRA projection (periodic compounding, capped contributions, fee drag)",
        &serde_json::json!({
            "current_age": account.current_age,
            "target_age": account.target_age,
            "annual_return_percent": account.annual_return_percent.to_string(),
            "management_fee_percent": account.management_fee_percent.to_string(),
            "compounding_periods_per_year": account.compounding_periods_per_year,
            "inflation_percent": account.inflation_percent.to_string(),
            "catch_up_age": limits.catch_up_age,
        }),
        warnings,
        elapsed,
        output,
    ))
}
