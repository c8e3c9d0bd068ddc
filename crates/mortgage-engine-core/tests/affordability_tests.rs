use mortgage_engine_core::affordability::{
    calculate_affordability, AffordabilityInput, DtiBand,
};
use mortgage_engine_core::MortgageError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn household(annual_income: Decimal) -> AffordabilityInput {
    serde_json::from_value(serde_json::json!({
        "annual_income": annual_income.to_string(),
        "monthly_debts": "400",
        "down_payment": "50000",
        "annual_rate_pct": "6.75",
        "term_years": 30,
        "property_tax_rate_pct": "1.2",
        "annual_insurance": "1800",
        "credit_score": 720
    }))
    .unwrap()
}

#[test]
fn test_default_bands_deserialize() {
    let input = household(dec!(100_000));
    let dti: Vec<Decimal> = input.bands.iter().map(|b| b.dti_pct).collect();
    assert_eq!(dti, vec![dec!(28), dec!(36), dec!(43)]);
}

#[test]
fn test_implied_dti_never_exceeds_threshold() {
    for income in [dec!(60_000), dec!(100_000), dec!(250_000)] {
        let out = calculate_affordability(&household(income)).unwrap().result;
        for band in &out.bands {
            assert!(
                band.implied_dti_pct <= band.dti_threshold_pct + dec!(0.0001),
                "{}: implied {} over {}",
                band.label,
                band.implied_dti_pct,
                band.dti_threshold_pct
            );
        }
    }
}

#[test]
fn test_more_income_never_lowers_max_price() {
    let mut previous: Option<Vec<Decimal>> = None;
    for income in [dec!(60_000), dec!(80_000), dec!(100_000), dec!(150_000), dec!(250_000)] {
        let out = calculate_affordability(&household(income)).unwrap().result;
        let prices: Vec<Decimal> = out.bands.iter().map(|b| b.max_price).collect();
        if let Some(prev) = &previous {
            for (lower, higher) in prev.iter().zip(&prices) {
                assert!(higher >= lower);
            }
        }
        previous = Some(prices);
    }
}

#[test]
fn test_max_price_includes_down_payment() {
    let out = calculate_affordability(&household(dec!(100_000))).unwrap().result;
    for band in &out.bands {
        assert!((band.max_price - band.loan_amount - dec!(50_000)).abs() < dec!(0.000001));
    }
}

#[test]
fn test_custom_band() {
    let mut input = household(dec!(100_000));
    input.bands = vec![DtiBand::new("Lender max", dec!(50))];
    let out = calculate_affordability(&input).unwrap().result;
    assert_eq!(out.bands.len(), 1);
    assert_eq!(out.bands[0].label, "Lender max");
}

#[test]
fn test_zero_income_rejected() {
    let mut input = household(dec!(100_000));
    input.annual_income = Decimal::ZERO;
    let err = calculate_affordability(&input).unwrap_err();
    assert!(matches!(err, MortgageError::InvalidInput { .. }));
}
