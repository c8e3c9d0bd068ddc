use mortgage_engine_core::amortization::{
    amortize, calculate_amortization, ExtraPayments, LoanParameters, LoanTerms, RegularPayments,
};
use mortgage_engine_core::MortgageError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Reference loans
// ===========================================================================

fn case_a() -> LoanParameters {
    LoanParameters::new(dec!(360_000), dec!(6.75), 30)
}

fn approx_eq(a: Decimal, b: Decimal, tol: Decimal) -> bool {
    (a - b).abs() <= tol
}

fn terms(principal: Decimal, rate_pct: Decimal, years: u32) -> LoanTerms {
    LoanTerms {
        principal,
        annual_rate: rate_pct / dec!(100),
        term_months: years * 12,
        start_date: None,
    }
}

#[test]
fn test_case_a_standard_loan() {
    let out = calculate_amortization(&case_a()).unwrap().result;

    // 360k at 6.75% over 360 months: about $2,335 a month
    assert!(approx_eq(out.monthly_payment, dec!(2335.67), dec!(1)));
    assert!(approx_eq(out.total_interest, dec!(480_600), dec!(500)));
    assert_eq!(out.payoff_months, 360);
    assert_eq!(out.schedule.len(), 360);
    assert!(out.baseline.is_none());
}

#[test]
fn test_case_b_extra_monthly_payment() {
    let mut params = case_a();
    params.extra_monthly = dec!(200);
    let out = calculate_amortization(&params).unwrap().result;

    // Roughly 23 to 24 years instead of 30
    assert!(out.payoff_months > 22 * 12 && out.payoff_months < 25 * 12);

    let baseline = out.baseline.expect("extras produce a baseline comparison");
    assert!(baseline.interest_saved > dec!(90_000));
    assert_eq!(baseline.payoff_months, 360);
    assert_eq!(baseline.months_saved, 360 - out.payoff_months);
}

// ===========================================================================
// Schedule properties
// ===========================================================================

#[test]
fn test_principal_sums_to_loan_amount() {
    for (principal, rate, years) in [
        (dec!(360_000), dec!(6.75), 30),
        (dec!(85_000), dec!(3.1), 15),
        (dec!(1_250_000), dec!(8.25), 20),
        (dec!(50_000), dec!(0), 5),
    ] {
        let schedule = amortize(&terms(principal, rate, years), RegularPayments).unwrap();
        let repaid: Decimal = schedule.rows.iter().map(|r| r.principal + r.extra).sum();
        let tolerance = dec!(0.01) * Decimal::from(schedule.rows.len() as u32);
        assert!(
            approx_eq(repaid, principal, tolerance),
            "{principal} at {rate}%: repaid {repaid}"
        );
        assert!(schedule.final_balance().is_zero());
    }
}

#[test]
fn test_zero_rate_payment_is_exact() {
    let out = calculate_amortization(&LoanParameters::new(dec!(120_000), dec!(0), 10))
        .unwrap()
        .result;
    assert_eq!(out.monthly_payment, dec!(1000));
    assert_eq!(out.total_interest, Decimal::ZERO);
    assert_eq!(out.payoff_months, 120);
}

#[test]
fn test_extras_never_increase_interest_or_term() {
    let baseline = calculate_amortization(&case_a()).unwrap().result;
    for extra in [dec!(1), dec!(50), dec!(500), dec!(5000)] {
        let mut params = case_a();
        params.extra_monthly = extra;
        let out = calculate_amortization(&params).unwrap().result;
        assert!(out.total_interest <= baseline.total_interest);
        assert!(out.payoff_months <= baseline.payoff_months);
    }
}

#[test]
fn test_larger_extra_pays_off_sooner() {
    let run = |extra: Decimal| {
        amortize(
            &terms(dec!(300_000), dec!(7), 30),
            ExtraPayments {
                monthly: extra,
                ..Default::default()
            },
        )
        .unwrap()
    };
    let small = run(dec!(100));
    let large = run(dec!(400));
    assert!(large.payoff_months < small.payoff_months);
    assert!(large.total_interest < small.total_interest);
}

#[test]
fn test_lump_sum_in_year_five() {
    let mut params = case_a();
    params.lump_sum = dec!(25_000);
    params.lump_sum_year = Some(5);
    let out = calculate_amortization(&params).unwrap().result;
    let row = &out.schedule[59];
    assert_eq!(row.month, 60);
    assert_eq!(row.extra, dec!(25_000));
    assert!(out.payoff_months < 360);
}

#[test]
fn test_huge_extra_clamped_to_balance() {
    let mut params = LoanParameters::new(dec!(10_000), dec!(5), 10);
    params.extra_monthly = dec!(1_000_000);
    let out = calculate_amortization(&params).unwrap().result;
    assert_eq!(out.payoff_months, 1);
    assert_eq!(out.total_principal + out.total_extra, dec!(10_000));
}

#[test]
fn test_dates_label_rows_from_start() {
    let mut params = case_a();
    params.start_date = chrono::NaiveDate::from_ymd_opt(2025, 1, 1);
    let out = calculate_amortization(&params).unwrap().result;
    assert_eq!(out.schedule[0].date_label, "Jan 2025");
    assert_eq!(out.schedule[12].date_label, "Jan 2026");
}

// ===========================================================================
// Validation
// ===========================================================================

#[test]
fn test_rejects_non_positive_principal() {
    let err = calculate_amortization(&LoanParameters::new(dec!(0), dec!(6), 30)).unwrap_err();
    assert!(matches!(err, MortgageError::InvalidInput { .. }));
}

#[test]
fn test_rejects_zero_term() {
    let err = calculate_amortization(&LoanParameters::new(dec!(100_000), dec!(6), 0)).unwrap_err();
    assert!(matches!(err, MortgageError::InvalidInput { .. }));
}

#[test]
fn test_rejects_negative_extra() {
    let mut params = case_a();
    params.extra_monthly = dec!(-5);
    assert!(calculate_amortization(&params).is_err());
}

#[test]
fn test_partial_json_input_uses_defaults() {
    let params: LoanParameters = serde_json::from_str(
        r#"{"principal": "360000", "annual_rate_pct": "6.75", "term_years": 30}"#,
    )
    .unwrap();
    assert_eq!(params.extra_monthly, Decimal::ZERO);
    assert!(params.lump_sum_year.is_none());
}
