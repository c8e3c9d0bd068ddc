use clap::Args;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use mortgage_engine_core::arm::{simulate_arm, ArmInput, RateCapPolicy};

use super::{render, required, resolve_input, CommandResult};

#[derive(Args)]
pub struct ArmArgs {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub years: u32,

    /// Introductory rate in percent
    #[arg(long)]
    pub initial_rate: Option<Decimal>,

    /// Years before the first adjustment (5 for a 5/1 ARM)
    #[arg(long, default_value = "5")]
    pub fixed_years: u32,

    /// Maximum increase per adjustment, percentage points
    #[arg(long)]
    pub periodic_cap: Option<Decimal>,

    /// Maximum increase over the initial rate, percentage points
    #[arg(long)]
    pub lifetime_cap: Option<Decimal>,

    /// Margin added to the index, percentage points
    #[arg(long)]
    pub margin: Option<Decimal>,

    /// Assumed index rate in percent
    #[arg(long)]
    pub index_rate: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_arm(args: ArmArgs, report: bool) -> CommandResult {
    let arm_input: ArmInput = resolve_input(args.input.as_deref(), || {
        Ok(ArmInput {
            principal: required(args.principal, "principal")?,
            term_years: args.years,
            caps: RateCapPolicy {
                initial_rate_pct: required(args.initial_rate, "initial-rate")?,
                fixed_period_years: args.fixed_years,
                periodic_cap_pct: args.periodic_cap.unwrap_or(dec!(2)),
                lifetime_cap_pct: args.lifetime_cap.unwrap_or(dec!(5)),
                margin_pct: args.margin.unwrap_or(dec!(2.75)),
                assumed_index_rate_pct: required(args.index_rate, "index-rate")?,
            },
            start_date: None,
        })
    })?;
    render(simulate_arm(&arm_input)?, report)
}
