use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::retirement::limits::ContributionLimits;
use fincalc_core::retirement::projection::{self, RetirementAccountParameters};
use fincalc_core::retirement::roth::{self, RothIraInput};

use crate::input;

/// Account parameters shared by the retirement subcommands
#[derive(Args)]
pub struct AccountArgs {
    /// Current age
    #[arg(long)]
    pub current_age: Option<u32>,

    /// Age the projection runs to
    #[arg(long, default_value = "65")]
    pub target_age: u32,

    /// Current account balance
    #[arg(long, default_value = "0")]
    pub balance: Decimal,

    /// Annual contribution
    #[arg(long)]
    pub contribution: Option<Decimal>,

    /// Annual contribution growth in percent
    #[arg(long, default_value = "0")]
    pub contribution_growth: Decimal,

    /// Add catch-up contributions from the catch-up age
    #[arg(long)]
    pub catch_up: bool,

    /// Expected annual return in percent
    #[arg(long)]
    pub return_rate: Option<Decimal>,

    /// Annual management fee in percent
    #[arg(long, default_value = "0")]
    pub fee: Decimal,

    /// Compounding periods per year: 1, 2, 4 or 12
    #[arg(long, default_value = "12")]
    pub compounding: u32,

    /// Expected inflation in percent
    #[arg(long, default_value = "0")]
    pub inflation: Decimal,

    /// Calendar year of the first projected year
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Contribution limits table (JSON or YAML)
    #[arg(long)]
    pub limits: Option<String>,
}

/// Arguments for the year-by-year growth projection
#[derive(Args)]
pub struct RetirementArgs {
    /// Path to JSON input file with the account parameters (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub account: AccountArgs,
}

/// Arguments for the Roth IRA calculator
#[derive(Args)]
pub struct RothIraArgs {
    /// Path to JSON input file (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub account: AccountArgs,

    /// Marginal tax rate in percent, for estimated tax savings
    #[arg(long)]
    pub tax_rate: Option<Decimal>,
}

impl AccountArgs {
    fn to_params(&self) -> Result<RetirementAccountParameters, Box<dyn std::error::Error>> {
        Ok(RetirementAccountParameters {
            current_age: self
                .current_age
                .ok_or("--current-age is required (or provide --input)")?,
            target_age: self.target_age,
            current_balance: self.balance,
            annual_contribution: self
                .contribution
                .ok_or("--contribution is required (or provide --input)")?,
            annual_contribution_growth_percent: self.contribution_growth,
            catch_up_enabled: self.catch_up,
            annual_return_percent: self
                .return_rate
                .ok_or("--return-rate is required (or provide --input)")?,
            management_fee_percent: self.fee,
            compounding_periods_per_year: self.compounding,
            inflation_percent: self.inflation,
            start_year: self.start_year,
        })
    }

    fn load_limits(&self) -> Result<Option<ContributionLimits>, Box<dyn std::error::Error>> {
        match &self.limits {
            Some(path) => {
                let limits: ContributionLimits = input::file::read_config(path)?;
                limits.validate()?;
                log::debug!("loaded {} contribution-limit years from {path}", limits.limits.len());
                Ok(Some(limits))
            }
            None => Ok(None),
        }
    }
}

pub fn run_retirement(args: RetirementArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let params: RetirementAccountParameters = match input::read_input(args.input.as_deref())? {
        Some(params) => params,
        None => args.account.to_params()?,
    };
    let limits = args.account.load_limits()?.unwrap_or_default();
    let entries = projection::project_with_limits(&params, &limits)?;
    Ok(serde_json::to_value(entries)?)
}

pub fn run_roth_ira(args: RothIraArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut roth_input: RothIraInput = match input::read_input(args.input.as_deref())? {
        Some(request) => request,
        None => RothIraInput {
            account: args.account.to_params()?,
            marginal_tax_rate_percent: args.tax_rate,
            limits: None,
        },
    };
    if let Some(limits) = args.account.load_limits()? {
        roth_input.limits = Some(limits);
    }
    let result = roth::plan_roth_ira(&roth_input)?;
    Ok(serde_json::to_value(result)?)
}
