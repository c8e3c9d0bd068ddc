use clap::Args;
use rust_decimal::Decimal;

use mortgage_engine_core::fees::fha::{calculate_fha, FhaInput};
use mortgage_engine_core::fees::pmi::{calculate_pmi, PmiInput};
use mortgage_engine_core::fees::va::{calculate_va, ServiceType, VaInput, VaUsage};

use super::{render, required, resolve_input, CommandResult};

/// Purchase flags shared by the fee calculators.
#[derive(Args)]
pub struct PurchaseFlags {
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
}

#[derive(Args)]
pub struct PmiArgs {
    #[command(flatten)]
    pub purchase: PurchaseFlags,

    /// Borrower credit score
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct FhaArgs {
    #[command(flatten)]
    pub purchase: PurchaseFlags,

    /// Borrower credit score (500 minimum)
    #[arg(long)]
    pub credit_score: Option<u32>,

    /// Pay the upfront MIP in cash instead of financing it
    #[arg(long)]
    pub pay_mip_upfront: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

#[derive(Args)]
pub struct VaArgs {
    #[command(flatten)]
    pub purchase: PurchaseFlags,

    /// The VA benefit has been used before
    #[arg(long)]
    pub subsequent_use: bool,

    /// Reserve or National Guard service
    #[arg(long)]
    pub reserve: bool,

    /// Exempt from the funding fee (service-connected disability)
    #[arg(long)]
    pub exempt: bool,

    /// Pay the funding fee in cash instead of financing it
    #[arg(long)]
    pub pay_fee_upfront: bool,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_pmi(args: PmiArgs, report: bool) -> CommandResult {
    let pmi_input: PmiInput = resolve_input(args.input.as_deref(), || {
        let p = &args.purchase;
        Ok(PmiInput {
            home_price: required(p.price, "price")?,
            down_payment: required(p.down, "down")?,
            annual_rate_pct: required(p.rate, "rate")?,
            term_years: p.years,
            credit_score: required(args.credit_score, "credit-score")?,
        })
    })?;
    render(calculate_pmi(&pmi_input)?, report)
}

pub fn run_fha(args: FhaArgs, report: bool) -> CommandResult {
    let fha_input: FhaInput = resolve_input(args.input.as_deref(), || {
        let p = &args.purchase;
        Ok(FhaInput {
            home_price: required(p.price, "price")?,
            down_payment: required(p.down, "down")?,
            annual_rate_pct: required(p.rate, "rate")?,
            term_years: p.years,
            credit_score: required(args.credit_score, "credit-score")?,
            finance_upfront_mip: !args.pay_mip_upfront,
        })
    })?;
    render(calculate_fha(&fha_input)?, report)
}

pub fn run_va(args: VaArgs, report: bool) -> CommandResult {
    let va_input: VaInput = resolve_input(args.input.as_deref(), || {
        let p = &args.purchase;
        Ok(VaInput {
            home_price: required(p.price, "price")?,
            down_payment: p.down.unwrap_or(Decimal::ZERO),
            annual_rate_pct: required(p.rate, "rate")?,
            term_years: p.years,
            usage: if args.subsequent_use {
                VaUsage::Subsequent
            } else {
                VaUsage::FirstTime
            },
            service: if args.reserve {
                ServiceType::ReserveOrGuard
            } else {
                ServiceType::Regular
            },
            disability_exempt: args.exempt,
            finance_funding_fee: !args.pay_fee_upfront,
        })
    })?;
    render(calculate_va(&va_input)?, report)
}
