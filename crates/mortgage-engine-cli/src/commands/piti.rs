use clap::Args;
use rust_decimal::Decimal;

use mortgage_engine_core::housing_cost::{calculate_piti, PitiInput};

use super::{render, required, resolve_input, CommandResult};

#[derive(Args)]
pub struct PitiArgs {
    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Down payment amount
    #[arg(long)]
    pub down: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub years: u32,

    /// Annual property tax as percent of price
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Annual homeowners insurance premium
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,

    /// Credit score; enables PMI above 80% LTV
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_piti(args: PitiArgs, report: bool) -> CommandResult {
    let piti_input: PitiInput = resolve_input(args.input.as_deref(), || {
        Ok(PitiInput {
            home_price: required(args.price, "price")?,
            down_payment: required(args.down, "down")?,
            annual_rate_pct: required(args.rate, "rate")?,
            term_years: args.years,
            property_tax_rate_pct: args.tax_rate.unwrap_or(Decimal::ZERO),
            annual_insurance: args.insurance.unwrap_or(Decimal::ZERO),
            monthly_hoa: args.hoa.unwrap_or(Decimal::ZERO),
            credit_score: args.credit_score,
        })
    })?;
    render(calculate_piti(&piti_input)?, report)
}
