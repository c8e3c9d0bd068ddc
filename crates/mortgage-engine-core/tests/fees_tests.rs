use mortgage_engine_core::fees::fha::{calculate_fha, FhaInput, MipDuration};
use mortgage_engine_core::fees::pmi::{calculate_pmi, PmiInput};
use mortgage_engine_core::fees::va::{calculate_va, ServiceType, VaInput, VaUsage};
use mortgage_engine_core::MortgageError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// VA funding fee
// ===========================================================================

fn va_zero_down() -> VaInput {
    VaInput {
        home_price: dec!(350_000),
        down_payment: Decimal::ZERO,
        annual_rate_pct: dec!(6.25),
        term_years: 30,
        usage: VaUsage::FirstTime,
        service: ServiceType::Regular,
        disability_exempt: false,
        finance_funding_fee: true,
    }
}

#[test]
fn test_case_c_va_first_use_zero_down() {
    let out = calculate_va(&va_zero_down()).unwrap().result;
    assert_eq!(out.funding_fee_rate_pct, dec!(2.15));
    assert_eq!(out.funding_fee, dec!(7525));
    assert_eq!(out.total_loan_amount, dec!(357_525));
}

#[test]
fn test_va_subsequent_use_costs_more() {
    let mut input = va_zero_down();
    input.usage = VaUsage::Subsequent;
    let out = calculate_va(&input).unwrap().result;
    assert_eq!(out.funding_fee_rate_pct, dec!(3.30));
}

#[test]
fn test_va_ten_percent_down() {
    let mut input = va_zero_down();
    input.down_payment = dec!(35_000);
    let out = calculate_va(&input).unwrap().result;
    assert_eq!(out.funding_fee_rate_pct, dec!(1.25));
}

#[test]
fn test_va_exempt_pays_nothing() {
    let mut input = va_zero_down();
    input.disability_exempt = true;
    let out = calculate_va(&input).unwrap().result;
    assert!(out.funding_fee.is_zero());
    assert_eq!(out.total_loan_amount, dec!(350_000));
}

// ===========================================================================
// FHA MIP
// ===========================================================================

fn fha_minimum_down() -> FhaInput {
    FhaInput {
        home_price: dec!(300_000),
        down_payment: dec!(10_500),
        annual_rate_pct: dec!(6.5),
        term_years: 30,
        credit_score: 640,
        finance_upfront_mip: true,
    }
}

#[test]
fn test_fha_minimum_down_life_of_loan_mip() {
    let out = calculate_fha(&fha_minimum_down()).unwrap().result;
    assert_eq!(out.upfront_mip, dec!(5066.25));
    assert_eq!(out.total_loan_amount, dec!(294_566.25));
    assert_eq!(out.annual_mip_rate_pct, dec!(0.55));
    assert_eq!(out.mip_duration, MipDuration::LifeOfLoan);
    assert_eq!(out.mip_months, 360);
    // First year MIP is charged on a balance a little under the opening amount.
    assert!(out.first_year_monthly_mip < dec!(294_566.25) * dec!(0.0055) / dec!(12));
    assert!(out.first_year_monthly_mip > dec!(130));
}

#[test]
fn test_fha_ten_percent_down_eleven_years() {
    let mut input = fha_minimum_down();
    input.down_payment = dec!(30_000);
    let out = calculate_fha(&input).unwrap().result;
    assert_eq!(out.mip_duration, MipDuration::Years(11));
    assert_eq!(out.mip_months, 132);
}

#[test]
fn test_fha_score_below_floor_rejected() {
    let mut input = fha_minimum_down();
    input.credit_score = 480;
    let err = calculate_fha(&input).unwrap_err();
    assert!(matches!(err, MortgageError::InvalidInput { .. }));
}

#[test]
fn test_fha_low_score_needs_ten_percent() {
    let mut input = fha_minimum_down();
    input.credit_score = 550;
    let out = calculate_fha(&input).unwrap();
    assert_eq!(out.result.minimum_down_payment_pct, dec!(10));
    assert!(!out.warnings.is_empty());
}

// ===========================================================================
// PMI
// ===========================================================================

fn pmi_five_percent_down() -> PmiInput {
    PmiInput {
        home_price: dec!(400_000),
        down_payment: dec!(20_000),
        annual_rate_pct: dec!(6.5),
        term_years: 30,
        credit_score: 740,
    }
}

#[test]
fn test_pmi_rate_from_table() {
    let out = calculate_pmi(&pmi_five_percent_down()).unwrap().result;
    assert!(out.pmi_required);
    assert_eq!(out.ltv_pct, dec!(95));
    assert_eq!(out.annual_pmi_rate_pct, dec!(0.48));
    assert_eq!(out.monthly_pmi, dec!(152));
}

#[test]
fn test_pmi_drops_before_automatic_termination() {
    let out = calculate_pmi(&pmi_five_percent_down()).unwrap().result;
    let request = out.cancellation_request_month.unwrap();
    let automatic = out.automatic_termination_month.unwrap();
    assert!(request < automatic);
    assert_eq!(out.months_charged, automatic);
    assert_eq!(out.total_pmi_paid, dec!(152) * Decimal::from(automatic));
}

#[test]
fn test_twenty_percent_down_has_no_pmi() {
    let mut input = pmi_five_percent_down();
    input.down_payment = dec!(80_000);
    let out = calculate_pmi(&input).unwrap().result;
    assert!(!out.pmi_required);
    assert!(out.monthly_pmi.is_zero());
    assert_eq!(out.total_pmi_paid, Decimal::ZERO);
}

#[test]
fn test_pmi_score_below_table_is_clamped_with_warning() {
    let mut input = pmi_five_percent_down();
    input.credit_score = 580;
    let out = calculate_pmi(&input).unwrap();
    assert_eq!(out.result.annual_pmi_rate_pct, dec!(1.30));
    assert!(out.warnings.iter().any(|w| w.contains("580")));
}

#[test]
fn test_terms_past_fifty_years_rejected() {
    let mut pmi = pmi_five_percent_down();
    pmi.term_years = u32::MAX;
    let mut fha = fha_minimum_down();
    fha.term_years = 80;
    let mut va = va_zero_down();
    va.term_years = 51;
    for err in [
        calculate_pmi(&pmi).unwrap_err(),
        calculate_fha(&fha).unwrap_err(),
        calculate_va(&va).unwrap_err(),
    ] {
        assert!(matches!(err, MortgageError::InvalidInput { ref field, .. } if field == "term_years"));
    }
}
