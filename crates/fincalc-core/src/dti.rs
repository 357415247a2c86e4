use std::time::Instant;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::CalcError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::CalcResult;

/// Front-end ratio lenders commonly treat as the housing ceiling.
const FRONT_END_GUIDELINE: Rate = dec!(0.28);
/// Back-end ratio lenders commonly treat as the total-debt ceiling.
const BACK_END_GUIDELINE: Rate = dec!(0.36);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtPayment {
    pub label: String,
    pub monthly_payment: Money,
}

/// Input for the debt-to-income calculator. All amounts are monthly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DtiInput {
    pub gross_monthly_income: Money,
    /// Rent, or mortgage payment including taxes, insurance and HOA.
    pub housing_payment: Money,
    #[serde(default)]
    pub other_debts: Vec<DebtPayment>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtiBand {
    Healthy,
    Manageable,
    Stretched,
    Excessive,
}

impl DtiBand {
    pub fn from_ratio(back_end: Rate) -> Self {
        if back_end <= BACK_END_GUIDELINE {
            DtiBand::Healthy
        } else if back_end <= dec!(0.43) {
            DtiBand::Manageable
        } else if back_end <= dec!(0.50) {
            DtiBand::Stretched
        } else {
            DtiBand::Excessive
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DtiOutput {
    pub total_monthly_debt: Money,
    pub front_end_ratio: Rate,
    pub back_end_ratio: Rate,
    pub band: DtiBand,
    pub residual_income: Money,
    pub max_housing_payment: Money,
    pub max_total_debt_payment: Money,
}

// ---------------------------------------------------------------------------
// Core function
// ---------------------------------------------------------------------------

/// Front-end (housing) and back-end (all debt) debt-to-income ratios.
pub fn calculate_dti(input: &DtiInput) -> CalcResult<ComputationOutput<DtiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.gross_monthly_income <= Decimal::ZERO {
        return Err(CalcError::invalid(
            "gross_monthly_income",
            "Gross monthly income must be positive",
        ));
    }
    if input.housing_payment < Decimal::ZERO {
        return Err(CalcError::invalid(
            "housing_payment",
            "Housing payment cannot be negative",
        ));
    }
    if let Some(debt) = input.other_debts.iter().find(|d| d.monthly_payment < Decimal::ZERO) {
        return Err(CalcError::invalid(
            "other_debts",
            format!("Payment for '{}' cannot be negative", debt.label),
        ));
    }

    let income = input.gross_monthly_income;
    let other: Money = input.other_debts.iter().map(|d| d.monthly_payment).sum();
    let total_monthly_debt = input.housing_payment + other;

    let front_end_ratio = input.housing_payment / income;
    let back_end_ratio = total_monthly_debt / income;

    if front_end_ratio > FRONT_END_GUIDELINE {
        warnings.push(format!(
            "Housing costs are {}% of income, above the 28% guideline",
            (front_end_ratio * dec!(100)).round_dp(1)
        ));
    }
    if total_monthly_debt > income {
        warnings.push("Monthly debt payments exceed gross income".into());
    }

    let output = DtiOutput {
        total_monthly_debt,
        front_end_ratio,
        back_end_ratio,
        band: DtiBand::from_ratio(back_end_ratio),
        residual_income: income - total_monthly_debt,
        max_housing_payment: income * FRONT_END_GUIDELINE,
        max_total_debt_payment: income * BACK_END_GUIDELINE,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Debt-to-income (front-end housing and back-end total debt ratios)",
        &serde_json::json!({
            "front_end_guideline": FRONT_END_GUIDELINE.to_string(),
            "back_end_guideline": BACK_END_GUIDELINE.to_string(),
            "debts": input.other_debts.len(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
