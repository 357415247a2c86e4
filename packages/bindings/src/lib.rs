use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use fincalc_core::mortgage::loan::{
    ExtraPaymentPolicy, LoanParameters, PaymentFrequency, PaymentScheduleEntry,
};
use fincalc_core::retirement::projection::{RetirementAccountParameters, YearlyProjectionEntry};
use fincalc_core::summary::{self, Projection};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ScheduleRequest {
    loan: LoanParameters,
    #[serde(default)]
    extra: ExtraPaymentPolicy,
}

#[napi]
pub fn compute_amortization_schedule(input_json: String) -> NapiResult<String> {
    let input: ScheduleRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule =
        fincalc_core::mortgage::amortization::compute_amortization_schedule(&input.loan, &input.extra)
            .map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[napi]
pub fn compute_baseline_schedule(input_json: String) -> NapiResult<String> {
    let loan: LoanParameters = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let schedule = fincalc_core::mortgage::amortization::compute_baseline_schedule(&loan)
        .map_err(to_napi_error)?;
    serde_json::to_string(&schedule).map_err(to_napi_error)
}

#[napi]
pub fn analyze_payoff(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::mortgage::payoff::PayoffInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output =
        fincalc_core::mortgage::payoff::analyze_payoff(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Retirement
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_retirement_projection(input_json: String) -> NapiResult<String> {
    let params: RetirementAccountParameters =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let entries = fincalc_core::retirement::projection::compute_retirement_projection(&params)
        .map_err(to_napi_error)?;
    serde_json::to_string(&entries).map_err(to_napi_error)
}

#[napi]
pub fn plan_roth_ira(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::retirement::roth::RothIraInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::retirement::roth::plan_roth_ira(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct LoanSummaryRequest {
    schedule: Vec<PaymentScheduleEntry>,
    #[serde(default)]
    baseline: Option<Vec<PaymentScheduleEntry>>,
    #[serde(default)]
    frequency: PaymentFrequency,
}

#[derive(Deserialize)]
struct RetirementSummaryRequest {
    entries: Vec<YearlyProjectionEntry>,
    params: RetirementAccountParameters,
}

/// Summary metrics for a schedule, or a comparison when `baseline` is given.
#[napi]
pub fn summarize_loan(input_json: String) -> NapiResult<String> {
    let input: LoanSummaryRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let metrics = summary::summarize(Projection::Loan {
        schedule: &input.schedule,
        baseline: input.baseline.as_deref(),
        frequency: input.frequency,
    })
    .map_err(to_napi_error)?;
    serde_json::to_string(&metrics).map_err(to_napi_error)
}

#[napi]
pub fn summarize_retirement(input_json: String) -> NapiResult<String> {
    let input: RetirementSummaryRequest =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let metrics = summary::summarize(Projection::Retirement {
        entries: &input.entries,
        params: &input.params,
    })
    .map_err(to_napi_error)?;
    serde_json::to_string(&metrics).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Debt-to-income
// ---------------------------------------------------------------------------

#[napi]
pub fn calculate_dti(input_json: String) -> NapiResult<String> {
    let input: fincalc_core::dti::DtiInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = fincalc_core::dti::calculate_dti(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
