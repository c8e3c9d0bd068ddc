use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use mortgage_engine_core::prepayment::{evaluate_strategies, PrepaymentInput};

use super::amortize::LoanFlags;
use super::{render, resolve_input, CommandResult};

#[derive(Args)]
pub struct PrepaymentArgs {
    #[command(flatten)]
    pub loan: LoanFlags,

    /// Lender fee charged for a recast
    #[arg(long)]
    pub recast_fee: Option<Decimal>,

    /// Annual return assumed when investing instead of prepaying, percent
    #[arg(long)]
    pub investment_return: Option<Decimal>,

    /// Include the biweekly payment strategy
    #[arg(long)]
    pub biweekly: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_prepayment(args: PrepaymentArgs, report: bool) -> CommandResult {
    let pp_input: PrepaymentInput = resolve_input(args.input.as_deref(), || {
        Ok(PrepaymentInput {
            loan: args.loan.to_parameters()?,
            recast_fee: args.recast_fee.unwrap_or(Decimal::ZERO),
            investment_return_pct: args.investment_return.unwrap_or(dec!(7)),
            include_biweekly: args.biweekly,
        })
    })?;
    render(evaluate_strategies(&pp_input)?, report)
}
