//! Prepayment and recast strategy evaluator.
//!
//! Every strategy runs the shared amortization loop against the same loan;
//! they differ only in the payment policy handed to it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::invest::{invest_difference, InvestmentComparison};
use crate::amortization::policies::biweekly_equivalent_extra;
use crate::amortization::{
    amortize, ExtraPayments, LoanParameters, LumpSumRecast, PaymentPolicy, RegularPayments, Schedule,
};
use crate::error::MortgageError;
use crate::types::{with_metadata, ComputationOutput, Money, Percent};
use crate::MortgageResult;

fn default_investment_return_pct() -> Percent {
    dec!(7)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentInput {
    #[serde(flatten)]
    pub loan: LoanParameters,
    /// One-time servicer fee charged when the loan is recast.
    #[serde(default)]
    pub recast_fee: Money,
    /// Assumed annual market return for the invest-the-difference comparison.
    #[serde(default = "default_investment_return_pct")]
    pub investment_return_pct: Percent,
    #[serde(default)]
    pub include_biweekly: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Baseline,
    ExtraPayments,
    LumpSum,
    LumpSumRecast,
    Biweekly,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            StrategyKind::Baseline => "Regular payments",
            StrategyKind::ExtraPayments => "Extra monthly/annual payments",
            StrategyKind::LumpSum => "Lump sum, payment unchanged",
            StrategyKind::LumpSumRecast => "Lump sum with recast",
            StrategyKind::Biweekly => "Biweekly payments",
        }
    }
}

/// Outcome of one strategy against the shared loan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub strategy: StrategyKind,
    pub label: String,
    pub monthly_payment: Money,
    /// Scheduled payment at payoff time (differs after a recast).
    pub final_payment: Money,
    pub total_interest: Money,
    /// Interest, principal and fees.
    pub total_paid: Money,
    pub fees: Money,
    pub payoff_months: u32,
    pub interest_saved: Money,
    pub months_saved: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrepaymentOutput {
    pub scenarios: Vec<ScenarioResult>,
    /// Lowest total interest first; ties go to the shorter payoff.
    pub ranking: Vec<StrategyKind>,
    pub best: StrategyKind,
    pub recast_payment: Option<Money>,
    pub investment: Option<InvestmentComparison>,
}

/// Order strategies by total interest, then payoff time.
pub fn rank_scenarios(scenarios: &[ScenarioResult]) -> Vec<StrategyKind> {
    let mut ordered: Vec<&ScenarioResult> = scenarios.iter().collect();
    ordered.sort_by(|a, b| {
        a.total_interest
            .cmp(&b.total_interest)
            .then_with(|| a.payoff_months.cmp(&b.payoff_months))
    });
    ordered.into_iter().map(|s| s.strategy).collect()
}

fn run<P: PaymentPolicy>(loan: &LoanParameters, policy: P) -> MortgageResult<Schedule> {
    amortize(&loan.terms()?, policy)
}

fn scenario(
    strategy: StrategyKind,
    schedule: &Schedule,
    baseline: &Schedule,
    final_payment: Money,
    fees: Money,
) -> ScenarioResult {
    ScenarioResult {
        strategy,
        label: strategy.label().to_string(),
        monthly_payment: schedule.initial_payment,
        final_payment,
        total_interest: schedule.total_interest,
        total_paid: schedule.total_paid + fees,
        fees,
        payoff_months: schedule.payoff_months,
        interest_saved: baseline.total_interest - schedule.total_interest,
        months_saved: baseline.payoff_months.saturating_sub(schedule.payoff_months),
    }
}

/// Run each applicable strategy against the same loan and rank them.
pub fn evaluate_strategies(
    input: &PrepaymentInput,
) -> MortgageResult<ComputationOutput<PrepaymentOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_prepayment(input)?;

    let loan = &input.loan;
    let all_extras = loan.extra_payments()?;
    let lump = all_extras.lump_sum;

    let baseline = run(loan, RegularPayments)?;
    let mut scenarios = vec![scenario(
        StrategyKind::Baseline,
        &baseline,
        &baseline,
        baseline.initial_payment,
        Decimal::ZERO,
    )];

    if loan.extra_monthly > Decimal::ZERO || loan.extra_annual > Decimal::ZERO {
        let policy = ExtraPayments {
            lump_sum: None,
            ..all_extras.clone()
        };
        let s = run(loan, policy)?;
        scenarios.push(scenario(
            StrategyKind::ExtraPayments,
            &s,
            &baseline,
            s.initial_payment,
            Decimal::ZERO,
        ));
    }

    let mut recast_payment = None;
    if let Some(lump) = lump {
        let s = run(
            loan,
            ExtraPayments {
                lump_sum: Some(lump),
                ..Default::default()
            },
        )?;
        scenarios.push(scenario(
            StrategyKind::LumpSum,
            &s,
            &baseline,
            s.initial_payment,
            Decimal::ZERO,
        ));

        let mut recast = LumpSumRecast::new(lump, input.recast_fee);
        let s = run(loan, &mut recast)?;
        if recast.paid_off_by_lump_sum {
            warnings.push(format!(
                "Lump sum covers the remaining balance in month {}; the loan is paid off instead of recast",
                lump.month
            ));
        }
        recast_payment = recast.recast_payment;
        let recast_fee = if recast_payment.is_some() {
            input.recast_fee
        } else {
            Decimal::ZERO
        };
        scenarios.push(scenario(
            StrategyKind::LumpSumRecast,
            &s,
            &baseline,
            recast_payment.unwrap_or(s.initial_payment),
            recast_fee,
        ));
    }

    if input.include_biweekly {
        let s = run(
            loan,
            ExtraPayments {
                monthly: biweekly_equivalent_extra(baseline.initial_payment),
                ..Default::default()
            },
        )?;
        scenarios.push(scenario(
            StrategyKind::Biweekly,
            &s,
            &baseline,
            s.initial_payment,
            Decimal::ZERO,
        ));
    }

    let investment = if all_extras.is_empty() {
        None
    } else {
        let prepaid = run(loan, all_extras.clone())?;
        Some(invest_difference(
            &all_extras,
            baseline.payoff_months,
            input.investment_return_pct,
            baseline.total_interest - prepaid.total_interest,
        )?)
    };

    if scenarios.len() == 1 {
        warnings.push("No extra payment, lump sum or biweekly option supplied; only the baseline was run".into());
    }

    let ranking = rank_scenarios(&scenarios);
    let best = ranking.first().copied().unwrap_or(StrategyKind::Baseline);
    log::debug!("prepayment strategies ranked: {:?}", ranking);

    let output = PrepaymentOutput {
        scenarios,
        ranking,
        best,
        recast_payment,
        investment,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Prepayment, recast and invest-the-difference comparison",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_prepayment(input: &PrepaymentInput) -> MortgageResult<()> {
    input.loan.terms()?;
    if input.recast_fee < Decimal::ZERO {
        return Err(MortgageError::invalid("recast_fee", "Recast fee cannot be negative"));
    }
    if input.investment_return_pct < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "investment_return_pct",
            "Investment return cannot be negative",
        ));
    }
    Ok(())
}
