pub mod invest;
pub mod strategies;

pub use invest::{invest_difference, InvestmentComparison};
pub use strategies::{
    evaluate_strategies, rank_scenarios, PrepaymentInput, PrepaymentOutput, ScenarioResult,
    StrategyKind,
};
