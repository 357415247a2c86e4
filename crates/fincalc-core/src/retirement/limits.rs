use std::collections::BTreeMap;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::types::Money;
use crate::CalcResult;

/// Age at which catch-up contributions become available.
pub const DEFAULT_CATCH_UP_AGE: u32 = 50;

/// Contribution ceiling for one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualLimit {
    pub base: Money,
    #[serde(default)]
    pub catch_up: Money,
}

/// Year-keyed contribution limits. Years outside the table clamp to the
/// nearest configured year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionLimits {
    #[serde(default = "default_catch_up_age")]
    pub catch_up_age: u32,
    pub limits: BTreeMap<i32, AnnualLimit>,
}

fn default_catch_up_age() -> u32 {
    DEFAULT_CATCH_UP_AGE
}

impl Default for ContributionLimits {
    /// IRA contribution limits (Roth and traditional share the ceiling).
    fn default() -> Self {
        let table = [
            (2019, dec!(6000), dec!(1000)),
            (2020, dec!(6000), dec!(1000)),
            (2021, dec!(6000), dec!(1000)),
            (2022, dec!(6000), dec!(1000)),
            (2023, dec!(6500), dec!(1000)),
            (2024, dec!(7000), dec!(1000)),
            (2025, dec!(7000), dec!(1000)),
            (2026, dec!(7500), dec!(1100)),
        ];
        Self {
            catch_up_age: DEFAULT_CATCH_UP_AGE,
            limits: table
                .into_iter()
                .map(|(year, base, catch_up)| (year, AnnualLimit { base, catch_up }))
                .collect(),
        }
    }
}

impl ContributionLimits {
    /// Parse a limits table from JSON.
    pub fn from_json(json: &str) -> CalcResult<Self> {
        let limits: Self = serde_json::from_str(json)?;
        limits.validate()?;
        Ok(limits)
    }

    pub fn validate(&self) -> CalcResult<()> {
        if self.limits.is_empty() {
            return Err(CalcError::ConfigError(
                "contribution limits table must contain at least one year".into(),
            ));
        }
        if self.catch_up_age == 0 {
            return Err(CalcError::ConfigError("catch_up_age must be positive".into()));
        }
        for (year, limit) in &self.limits {
            if limit.base < Decimal::ZERO || limit.catch_up < Decimal::ZERO {
                return Err(CalcError::ConfigError(format!(
                    "contribution limits for {year} cannot be negative"
                )));
            }
        }
        Ok(())
    }

    pub fn latest_year(&self) -> CalcResult<i32> {
        self.limits
            .keys()
            .next_back()
            .copied()
            .ok_or_else(|| CalcError::ConfigError("contribution limits table is empty".into()))
    }

    /// Limit in force for `year`, clamped to the table's range.
    pub fn for_year(&self, year: i32) -> CalcResult<&AnnualLimit> {
        self.limits
            .range(..=year)
            .next_back()
            .or_else(|| self.limits.iter().next())
            .map(|(_, limit)| limit)
            .ok_or_else(|| CalcError::ConfigError("contribution limits table is empty".into()))
    }

    /// Ceiling for a contributor of `age` in `year`.
    pub fn cap_for(&self, year: i32, age: u32, catch_up_enabled: bool) -> CalcResult<Money> {
        let limit = self.for_year(year)?;
        Ok(limit.base + self.catch_up_for(limit, age, catch_up_enabled))
    }

    pub fn catch_up_for(&self, limit: &AnnualLimit, age: u32, catch_up_enabled: bool) -> Money {
        if catch_up_enabled && age >= self.catch_up_age {
            limit.catch_up
        } else {
            Decimal::ZERO
        }
    }
}
