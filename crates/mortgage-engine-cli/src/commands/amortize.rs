use clap::Args;
use rust_decimal::Decimal;

use mortgage_engine_core::amortization::{calculate_amortization, LoanParameters};

use super::{render, required, resolve_input, CommandResult};

/// Loan flags shared by `amortize` and `prepayment`.
#[derive(Args)]
pub struct LoanFlags {
    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (6.75 = 6.75%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub years: u32,

    /// Extra principal every month
    #[arg(long)]
    pub extra_monthly: Option<Decimal>,

    /// Extra principal on each loan anniversary
    #[arg(long)]
    pub extra_annual: Option<Decimal>,

    /// One-time lump sum
    #[arg(long)]
    pub lump_sum: Option<Decimal>,

    /// Loan year whose last month receives the lump sum
    #[arg(long)]
    pub lump_sum_year: Option<u32>,
}

impl LoanFlags {
    pub fn to_parameters(&self) -> Result<LoanParameters, Box<dyn std::error::Error>> {
        let mut params = LoanParameters::new(
            required(self.principal, "principal")?,
            required(self.rate, "rate")?,
            self.years,
        );
        params.extra_monthly = self.extra_monthly.unwrap_or(Decimal::ZERO);
        params.extra_annual = self.extra_annual.unwrap_or(Decimal::ZERO);
        params.lump_sum = self.lump_sum.unwrap_or(Decimal::ZERO);
        params.lump_sum_year = self.lump_sum_year;
        Ok(params)
    }
}

#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct AmortizeArgs {
    #[command(flatten)]
    pub loan: LoanFlags,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_amortize(args: AmortizeArgs, report: bool) -> CommandResult {
    let params: LoanParameters =
        resolve_input(args.input.as_deref(), || args.loan.to_parameters())?;
    render(calculate_amortization(&params)?, report)
}
