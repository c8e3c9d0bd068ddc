use clap::Args;
use rust_decimal::Decimal;

use mortgage_engine_core::affordability::{
    calculate_affordability, AffordabilityInput, DtiBand,
};

use super::{render, required, resolve_input, CommandResult};

#[derive(Args)]
pub struct AffordabilityArgs {
    /// Gross annual household income
    #[arg(long)]
    pub income: Option<Decimal>,

    /// Existing monthly debt payments
    #[arg(long)]
    pub debts: Option<Decimal>,

    /// Cash available for the down payment
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

    /// DTI thresholds in percent, repeatable (default 28, 36, 43)
    #[arg(long = "dti")]
    pub dti: Vec<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_affordability(args: AffordabilityArgs, report: bool) -> CommandResult {
    let afford_input: AffordabilityInput = resolve_input(args.input.as_deref(), || {
        let mut input: AffordabilityInput = serde_json::from_value(serde_json::json!({
            "annual_income": required(args.income, "income")?,
            "down_payment": args.down.unwrap_or(Decimal::ZERO),
            "annual_rate_pct": required(args.rate, "rate")?,
            "term_years": args.years,
        }))?;
        input.monthly_debts = args.debts.unwrap_or(Decimal::ZERO);
        input.property_tax_rate_pct = args.tax_rate.unwrap_or(Decimal::ZERO);
        input.annual_insurance = args.insurance.unwrap_or(Decimal::ZERO);
        input.monthly_hoa = args.hoa.unwrap_or(Decimal::ZERO);
        input.credit_score = args.credit_score;
        if !args.dti.is_empty() {
            input.bands = args
                .dti
                .iter()
                .map(|dti| DtiBand::new(&format!("DTI {dti}%"), *dti))
                .collect();
        }
        Ok(input)
    })?;
    render(calculate_affordability(&afford_input)?, report)
}
