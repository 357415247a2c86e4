use chrono::{Local, NaiveDate};
use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use fincalc_core::mortgage::amortization;
use fincalc_core::mortgage::loan::{
    ExtraPaymentPolicy, InterestAccrual, LoanParameters, OneTimePayment, PaymentFrequency,
};
use fincalc_core::mortgage::payoff::{self, PayoffInput};

use crate::input;

/// Loan terms shared by the mortgage subcommands
#[derive(Args)]
pub struct LoanArgs {
    /// Loan principal
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 6.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Date of the first payment (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,

    /// Payment frequency: monthly, biweekly, weekly
    #[arg(long, default_value = "monthly")]
    pub frequency: String,

    /// Charge interest per payment period instead of the full monthly rate
    #[arg(long)]
    pub per_period_accrual: bool,
}

/// Extra-payment policy flags
#[derive(Args)]
pub struct ExtraArgs {
    /// Extra principal paid with every payment
    #[arg(long)]
    pub extra: Option<Decimal>,

    /// One-time lump sum amount
    #[arg(long, requires = "one_time_date")]
    pub one_time_amount: Option<Decimal>,

    /// Month of the lump sum (YYYY-MM-DD)
    #[arg(long, requires = "one_time_amount")]
    pub one_time_date: Option<NaiveDate>,

    /// Round each payment up to this increment (e.g. 100)
    #[arg(long)]
    pub round_up: Option<Decimal>,
}

/// Arguments for a full amortization schedule
#[derive(Args)]
pub struct AmortizeArgs {
    /// Path to JSON input file with `loan` and `extra` (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub extra: ExtraArgs,
}

/// Arguments for the no-extra baseline schedule
#[derive(Args)]
pub struct BaselineArgs {
    /// Path to JSON input file with `loan` (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,
}

/// Arguments for the payoff comparison
#[derive(Args)]
pub struct PayoffArgs {
    /// Path to JSON input file (overrides flags)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub loan: LoanArgs,

    #[command(flatten)]
    pub extra: ExtraArgs,

    /// Omit the payment-by-payment schedules from the output
    #[arg(long)]
    pub no_schedule: bool,
}

fn parse_frequency(frequency: &str) -> Result<PaymentFrequency, Box<dyn std::error::Error>> {
    match frequency.to_lowercase().as_str() {
        "monthly" => Ok(PaymentFrequency::Monthly),
        "biweekly" | "bi-weekly" | "fortnightly" => Ok(PaymentFrequency::Biweekly),
        "weekly" => Ok(PaymentFrequency::Weekly),
        _ => Err(format!(
            "Unknown frequency '{}'. Use: monthly, biweekly, weekly",
            frequency
        )
        .into()),
    }
}

impl LoanArgs {
    fn to_loan(&self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        let principal = self
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let rate = self.rate.ok_or("--rate is required (or provide --input)")?;
        let term_years = self
            .term_years
            .ok_or("--term-years is required (or provide --input)")?;

        Ok(LoanParameters {
            principal,
            annual_rate_percent: rate,
            term_years,
            start_date: self
                .start_date
                .unwrap_or_else(|| Local::now().date_naive()),
            payment_frequency: parse_frequency(&self.frequency)?,
            interest_accrual: if self.per_period_accrual {
                InterestAccrual::PerPeriod
            } else {
                InterestAccrual::MonthlyRate
            },
        })
    }
}

impl ExtraArgs {
    fn to_policy(&self) -> ExtraPaymentPolicy {
        ExtraPaymentPolicy {
            recurring_extra: self.extra.unwrap_or(Decimal::ZERO),
            one_time: self
                .one_time_amount
                .zip(self.one_time_date)
                .map(|(amount, date)| OneTimePayment { amount, date }),
            round_up_enabled: self.round_up.is_some(),
            round_up_increment: self.round_up.unwrap_or(Decimal::ZERO),
        }
    }
}

/// Read a payoff-shaped request from `--input`, stdin, or the flags.
fn read_request(
    path: Option<&str>,
    loan: &LoanArgs,
    extra: Option<&ExtraArgs>,
) -> Result<PayoffInput, Box<dyn std::error::Error>> {
    if let Some(request) = input::read_input(path)? {
        return Ok(request);
    }
    Ok(PayoffInput {
        loan: loan.to_loan()?,
        extra: extra.map(ExtraArgs::to_policy).unwrap_or_default(),
        include_schedule: true,
    })
}

pub fn run_amortize(args: AmortizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = read_request(args.input.as_deref(), &args.loan, Some(&args.extra))?;
    let schedule = amortization::compute_amortization_schedule(&request.loan, &request.extra)?;
    Ok(serde_json::to_value(schedule)?)
}

pub fn run_baseline(args: BaselineArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = read_request(args.input.as_deref(), &args.loan, None)?;
    let schedule = amortization::compute_baseline_schedule(&request.loan)?;
    Ok(serde_json::to_value(schedule)?)
}

pub fn run_payoff(args: PayoffArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request = read_request(args.input.as_deref(), &args.loan, Some(&args.extra))?;
    if args.no_schedule {
        request.include_schedule = false;
    }
    let result = payoff::analyze_payoff(&request)?;
    Ok(serde_json::to_value(result)?)
}
