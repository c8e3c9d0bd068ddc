use clap::Args;
use rust_decimal::Decimal;

use mortgage_engine_core::rent_vs_buy::{calculate_rent_vs_buy, RentVsBuyInput};

use super::{render, required, resolve_input, CommandResult};

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct RentVsBuyArgs {
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

    /// Current monthly rent
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Analysis horizon in years
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Base-case annual home appreciation, percent (may be negative)
    #[arg(long)]
    pub appreciation: Option<Decimal>,

    /// Best/worst offset from the base appreciation, percentage points
    #[arg(long)]
    pub scenario_offset: Option<Decimal>,

    /// Annual growth of rent and ownership costs, percent
    #[arg(long)]
    pub inflation: Option<Decimal>,

    /// Annual return on invested savings, percent
    #[arg(long)]
    pub investment_return: Option<Decimal>,

    /// Annual property tax as percent of price
    #[arg(long)]
    pub tax_rate: Option<Decimal>,

    /// Annual homeowners insurance premium
    #[arg(long)]
    pub insurance: Option<Decimal>,

    /// Annual maintenance as percent of price
    #[arg(long)]
    pub maintenance: Option<Decimal>,

    /// Monthly HOA dues
    #[arg(long)]
    pub hoa: Option<Decimal>,

    /// Buying closing costs, percent of price
    #[arg(long)]
    pub closing_cost: Option<Decimal>,

    /// Selling costs at the horizon, percent of home value
    #[arg(long)]
    pub selling_cost: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_rent_vs_buy(args: RentVsBuyArgs, report: bool) -> CommandResult {
    let rvb_input: RentVsBuyInput = resolve_input(args.input.as_deref(), || {
        // Start from the serde defaults, then apply any flags given.
        let mut input: RentVsBuyInput = serde_json::from_value(serde_json::json!({
            "home_price": required(args.price, "price")?,
            "down_payment": required(args.down, "down")?,
            "annual_rate_pct": required(args.rate, "rate")?,
            "term_years": args.years,
            "monthly_rent": required(args.rent, "rent")?,
        }))?;
        if let Some(v) = args.horizon {
            input.years = v;
        }
        if let Some(v) = args.appreciation {
            input.home_appreciation_pct = v;
        }
        if let Some(v) = args.scenario_offset {
            input.scenario_offset_pct = v;
        }
        if let Some(v) = args.inflation {
            input.inflation_pct = v;
        }
        if let Some(v) = args.investment_return {
            input.investment_return_pct = v;
        }
        if let Some(v) = args.tax_rate {
            input.property_tax_rate_pct = v;
        }
        if let Some(v) = args.insurance {
            input.annual_insurance = v;
        }
        if let Some(v) = args.maintenance {
            input.maintenance_pct = v;
        }
        if let Some(v) = args.hoa {
            input.monthly_hoa = v;
        }
        if let Some(v) = args.closing_cost {
            input.closing_cost_pct = v;
        }
        if let Some(v) = args.selling_cost {
            input.selling_cost_pct = v;
        }
        Ok(input)
    })?;
    render(calculate_rent_vs_buy(&rvb_input)?, report)
}
