use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;

use loan_calc_core::LoanPolicy;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse<T: DeserializeOwned>(input_json: &str) -> NapiResult<T> {
    serde_json::from_str(input_json).map_err(to_napi_error)
}

/// Built-in policy unless a JSON override is passed.
fn policy(policy_json: Option<String>) -> NapiResult<LoanPolicy> {
    match policy_json {
        Some(json) => LoanPolicy::from_json(&json).map_err(to_napi_error),
        None => Ok(LoanPolicy::default()),
    }
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn mortgage_payment(input_json: String) -> NapiResult<String> {
    let input: loan_calc_core::mortgage::payment::MortgagePaymentInput = parse(&input_json)?;
    let output = loan_calc_core::mortgage::payment::calculate_mortgage_payment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn mortgage_period(input_json: String) -> NapiResult<String> {
    let input: loan_calc_core::mortgage::period::PeriodInput = parse(&input_json)?;
    let output =
        loan_calc_core::mortgage::period::calculate_period(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn payment_bounds(input_json: String) -> NapiResult<String> {
    let input: loan_calc_core::mortgage::payment::PaymentBoundsInput = parse(&input_json)?;
    let output = loan_calc_core::mortgage::payment::calculate_payment_bounds(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn down_payment(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: loan_calc_core::mortgage::ltv::DownPaymentInput = parse(&input_json)?;
    let policy = policy(policy_json)?;
    let output = loan_calc_core::mortgage::ltv::calculate_down_payment(&input, &policy.ltv)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

/// Called on every edit of the period or payment field.
#[napi]
pub fn recompute(input_json: String) -> NapiResult<String> {
    let input: loan_calc_core::mortgage::recompute::RecomputeInput = parse(&input_json)?;
    let output =
        loan_calc_core::mortgage::recompute::run_recompute(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Credit
// ---------------------------------------------------------------------------

#[napi]
pub fn credit_payment(input_json: String) -> NapiResult<String> {
    let input: loan_calc_core::credit::annuity::CreditPaymentInput = parse(&input_json)?;
    let output = loan_calc_core::credit::annuity::calculate_credit_payment(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn remaining_amount(input_json: String) -> NapiResult<String> {
    let input: loan_calc_core::credit::annuity::RemainingAmountInput = parse(&input_json)?;
    let output = loan_calc_core::credit::annuity::calculate_remaining_amount(&input)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Eligibility
// ---------------------------------------------------------------------------

#[napi]
pub fn assess_eligibility(input_json: String, policy_json: Option<String>) -> NapiResult<String> {
    let input: loan_calc_core::eligibility::EligibilityInput = parse(&input_json)?;
    let policy = policy(policy_json)?;
    let output = loan_calc_core::eligibility::assess_eligibility(&input, &policy)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn assess_credit_eligibility(
    input_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let input: loan_calc_core::eligibility::CreditEligibilityInput = parse(&input_json)?;
    let policy = policy(policy_json)?;
    let output = loan_calc_core::eligibility::assess_credit_eligibility(&input, &policy)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Form validation
// ---------------------------------------------------------------------------

/// `values_json` is an object of raw field strings; the report is returned
/// even when the step is invalid.
#[napi]
pub fn validate_step(
    step: String,
    values_json: String,
    policy_json: Option<String>,
) -> NapiResult<String> {
    let step: loan_calc_core::validation::FormStep = step.parse().map_err(to_napi_error)?;
    let values: loan_calc_core::validation::FormValues = parse(&values_json)?;
    let policy = policy(policy_json)?;
    let report = loan_calc_core::validation::validate_step(step, &values, &policy);
    serde_json::to_string(&report).map_err(to_napi_error)
}

#[napi]
pub fn default_policy() -> NapiResult<String> {
    serde_json::to_string(&LoanPolicy::default()).map_err(to_napi_error)
}
