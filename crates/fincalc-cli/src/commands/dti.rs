use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::dti::{self, DebtPayment, DtiInput};

use crate::input;

/// Arguments for debt-to-income ratios
#[derive(Args)]
pub struct DtiArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Gross monthly income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Monthly rent or mortgage payment
    #[arg(long, default_value = "0")]
    pub housing: Decimal,

    /// Other monthly debt payments (comma-separated, e.g. "400,250,75")
    #[arg(long, value_delimiter = ',')]
    pub debts: Option<Vec<Decimal>>,
}

pub fn run_dti(args: DtiArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let dti_input: DtiInput = if let Some(request) = input::read_input(args.input.as_deref())? {
        request
    } else {
        let income = args
            .income
            .ok_or("--income is required (or provide --input)")?;
        let other_debts = args
            .debts
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(i, monthly_payment)| DebtPayment {
                label: format!("debt {}", i + 1),
                monthly_payment,
            })
            .collect();

        DtiInput {
            gross_monthly_income: income,
            housing_payment: args.housing,
            other_debts,
        }
    };

    let result = dti::calculate_dti(&dti_input)?;
    Ok(serde_json::to_value(result)?)
}
