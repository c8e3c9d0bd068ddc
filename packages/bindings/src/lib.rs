use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use mortgage_engine_core::affordability::{calculate_affordability, AffordabilityInput};
use mortgage_engine_core::amortization::{calculate_amortization, LoanParameters};
use mortgage_engine_core::arm::{simulate_arm, ArmInput};
use mortgage_engine_core::fees::fha::{calculate_fha, FhaInput};
use mortgage_engine_core::fees::pmi::{calculate_pmi, PmiInput};
use mortgage_engine_core::fees::va::{calculate_va, VaInput};
use mortgage_engine_core::housing_cost::{calculate_piti, PitiInput};
use mortgage_engine_core::prepayment::{evaluate_strategies, PrepaymentInput};
use mortgage_engine_core::rent_vs_buy::{calculate_rent_vs_buy, RentVsBuyInput};
use mortgage_engine_core::{ComputationOutput, MortgageResult, ToReport};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the input record, run the calculator, return the JSON envelope.
fn call<I, T>(
    input_json: &str,
    calculate: fn(&I) -> MortgageResult<ComputationOutput<T>>,
) -> NapiResult<ComputationOutput<T>>
where
    I: DeserializeOwned,
    T: Serialize,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    calculate(&input).map_err(to_napi_error)
}

fn envelope<I, T>(
    input_json: &str,
    calculate: fn(&I) -> MortgageResult<ComputationOutput<T>>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    T: Serialize,
{
    let output = call(input_json, calculate)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

fn report<I, T>(
    input_json: &str,
    calculate: fn(&I) -> MortgageResult<ComputationOutput<T>>,
) -> NapiResult<String>
where
    I: DeserializeOwned,
    T: Serialize + ToReport,
{
    let output = call(input_json, calculate)?;
    let report = output.to_report().map_err(to_napi_error)?;
    serde_json::to_string(&report).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn amortization_schedule(input_json: String) -> NapiResult<String> {
    envelope::<LoanParameters, _>(&input_json, calculate_amortization)
}

#[napi]
pub fn amortization_schedule_report(input_json: String) -> NapiResult<String> {
    report::<LoanParameters, _>(&input_json, calculate_amortization)
}

#[napi]
pub fn arm_schedule(input_json: String) -> NapiResult<String> {
    envelope::<ArmInput, _>(&input_json, simulate_arm)
}

#[napi]
pub fn arm_schedule_report(input_json: String) -> NapiResult<String> {
    report::<ArmInput, _>(&input_json, simulate_arm)
}

// ---------------------------------------------------------------------------
// Housing cost and fees
// ---------------------------------------------------------------------------

#[napi]
pub fn piti_payment(input_json: String) -> NapiResult<String> {
    envelope::<PitiInput, _>(&input_json, calculate_piti)
}

#[napi]
pub fn piti_payment_report(input_json: String) -> NapiResult<String> {
    report::<PitiInput, _>(&input_json, calculate_piti)
}

#[napi]
pub fn pmi_estimate(input_json: String) -> NapiResult<String> {
    envelope::<PmiInput, _>(&input_json, calculate_pmi)
}

#[napi]
pub fn pmi_estimate_report(input_json: String) -> NapiResult<String> {
    report::<PmiInput, _>(&input_json, calculate_pmi)
}

#[napi]
pub fn fha_loan(input_json: String) -> NapiResult<String> {
    envelope::<FhaInput, _>(&input_json, calculate_fha)
}

#[napi]
pub fn fha_loan_report(input_json: String) -> NapiResult<String> {
    report::<FhaInput, _>(&input_json, calculate_fha)
}

#[napi]
pub fn va_loan(input_json: String) -> NapiResult<String> {
    envelope::<VaInput, _>(&input_json, calculate_va)
}

#[napi]
pub fn va_loan_report(input_json: String) -> NapiResult<String> {
    report::<VaInput, _>(&input_json, calculate_va)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[napi]
pub fn prepayment_strategies(input_json: String) -> NapiResult<String> {
    envelope::<PrepaymentInput, _>(&input_json, evaluate_strategies)
}

#[napi]
pub fn prepayment_strategies_report(input_json: String) -> NapiResult<String> {
    report::<PrepaymentInput, _>(&input_json, evaluate_strategies)
}

#[napi]
pub fn affordability(input_json: String) -> NapiResult<String> {
    envelope::<AffordabilityInput, _>(&input_json, calculate_affordability)
}

#[napi]
pub fn affordability_report(input_json: String) -> NapiResult<String> {
    report::<AffordabilityInput, _>(&input_json, calculate_affordability)
}

#[napi]
pub fn rent_vs_buy(input_json: String) -> NapiResult<String> {
    envelope::<RentVsBuyInput, _>(&input_json, calculate_rent_vs_buy)
}

#[napi]
pub fn rent_vs_buy_report(input_json: String) -> NapiResult<String> {
    report::<RentVsBuyInput, _>(&input_json, calculate_rent_vs_buy)
}
