use mortgage_engine_core::rent_vs_buy::{
    calculate_rent_vs_buy, AppreciationScenario, RentVsBuyInput,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn base_input() -> RentVsBuyInput {
    serde_json::from_value(serde_json::json!({
        "home_price": "450000",
        "down_payment": "90000",
        "annual_rate_pct": "6.5",
        "term_years": 30,
        "monthly_rent": "2500",
        "years": 20,
        "property_tax_rate_pct": "1.0",
        "annual_insurance": "1600"
    }))
    .unwrap()
}

fn crossover_rank(year: Option<u32>) -> u32 {
    year.unwrap_or(u32::MAX)
}

#[test]
fn test_defaults_applied() {
    let input = base_input();
    assert_eq!(input.scenario_offset_pct, dec!(2));
    assert_eq!(input.home_appreciation_pct, dec!(3));
    assert_eq!(input.investment_return_pct, dec!(7));
}

#[test]
fn test_crossover_ordering_across_rents() {
    for rent in [dec!(1200), dec!(1800), dec!(2500), dec!(3200), dec!(4000)] {
        let mut input = base_input();
        input.monthly_rent = rent;
        let out = calculate_rent_vs_buy(&input).unwrap().result;
        let year = |s| {
            crossover_rank(out.scenario(s).and_then(|p| p.crossover_year))
        };
        let (best, base, worst) = (
            year(AppreciationScenario::Best),
            year(AppreciationScenario::Base),
            year(AppreciationScenario::Worst),
        );
        assert!(best <= base && base <= worst, "rent {rent}: {best} {base} {worst}");
    }
}

#[test]
fn test_higher_appreciation_higher_buy_net_worth() {
    let out = calculate_rent_vs_buy(&base_input()).unwrap().result;
    let best = out.scenario(AppreciationScenario::Best).unwrap();
    let worst = out.scenario(AppreciationScenario::Worst).unwrap();
    for (b, w) in best.years.iter().zip(&worst.years) {
        assert!(b.buy_net_worth > w.buy_net_worth);
        assert_eq!(b.rent_net_worth, w.rent_net_worth);
    }
}

#[test]
fn test_rent_grows_with_inflation() {
    let out = calculate_rent_vs_buy(&base_input()).unwrap().result;
    let years = &out.scenarios[1].years;
    assert_eq!(years[0].annual_rent, dec!(30_000));
    assert_eq!(years[1].annual_rent, dec!(30_900));
}

#[test]
fn test_never_when_renting_is_cheap() {
    let mut input = base_input();
    input.monthly_rent = dec!(600);
    input.home_appreciation_pct = Decimal::ZERO;
    input.scenario_offset_pct = dec!(1);
    input.years = 8;
    let out = calculate_rent_vs_buy(&input).unwrap().result;
    assert!(out.scenarios.iter().all(|s| s.crossover_year.is_none()));
}

#[test]
fn test_one_row_per_year() {
    let out = calculate_rent_vs_buy(&base_input()).unwrap().result;
    for s in &out.scenarios {
        assert_eq!(s.years.len(), 20);
        assert_eq!(s.years.last().unwrap().year, 20);
    }
}
