use mortgage_engine_core::amortization::LoanParameters;
use mortgage_engine_core::prepayment::{evaluate_strategies, PrepaymentInput, StrategyKind};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn input() -> PrepaymentInput {
    let mut loan = LoanParameters::new(dec!(360_000), dec!(6.75), 30);
    loan.extra_monthly = dec!(200);
    loan.lump_sum = dec!(20_000);
    loan.lump_sum_year = Some(3);
    PrepaymentInput {
        loan,
        recast_fee: dec!(250),
        investment_return_pct: dec!(7),
        include_biweekly: true,
    }
}

#[test]
fn test_every_prepayment_strategy_beats_baseline_interest() {
    let out = evaluate_strategies(&input()).unwrap().result;
    let baseline = out
        .scenarios
        .iter()
        .find(|s| s.strategy == StrategyKind::Baseline)
        .unwrap();
    let prepaying = out
        .scenarios
        .iter()
        .filter(|s| s.strategy != StrategyKind::Baseline);
    for s in prepaying {
        assert!(s.total_interest < baseline.total_interest, "{}", s.label);
        assert!(s.interest_saved > Decimal::ZERO);
    }
}

#[test]
fn test_ranking_sorted_by_interest() {
    let out = evaluate_strategies(&input()).unwrap().result;
    let interest: Vec<Decimal> = out
        .ranking
        .iter()
        .map(|k| {
            out.scenarios
                .iter()
                .find(|s| s.strategy == *k)
                .unwrap()
                .total_interest
        })
        .collect();
    assert!(interest.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(out.ranking[0], out.best);
}

#[test]
fn test_recast_lowers_payment_and_keeps_term() {
    let out = evaluate_strategies(&input()).unwrap().result;
    let recast = out
        .scenarios
        .iter()
        .find(|s| s.strategy == StrategyKind::LumpSumRecast)
        .unwrap();
    assert!(recast.final_payment < recast.monthly_payment);
    assert_eq!(recast.payoff_months, 360);
    assert_eq!(recast.fees, dec!(250));
    assert!(out.recast_payment.is_some());
}

#[test]
fn test_lump_sum_without_recast_finishes_early() {
    let out = evaluate_strategies(&input()).unwrap().result;
    let lump = out
        .scenarios
        .iter()
        .find(|s| s.strategy == StrategyKind::LumpSum)
        .unwrap();
    assert!(lump.payoff_months < 360);
    assert_eq!(lump.final_payment, lump.monthly_payment);
}

#[test]
fn test_invest_difference_reported() {
    let out = evaluate_strategies(&input()).unwrap().result;
    let inv = out.investment.expect("extras present");
    assert!(inv.portfolio_value > inv.total_contributed);
}
