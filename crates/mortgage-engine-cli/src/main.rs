mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::affordability::AffordabilityArgs;
use commands::amortize::AmortizeArgs;
use commands::arm::ArmArgs;
use commands::fees::{FhaArgs, PmiArgs, VaArgs};
use commands::piti::PitiArgs;
use commands::prepayment::PrepaymentArgs;
use commands::rent_vs_buy::RentVsBuyArgs;

/// Mortgage amortization and scenario calculations
#[derive(Parser)]
#[command(
    name = "mcalc",
    version,
    about = "Mortgage amortization and scenario calculations",
    long_about = "Deterministic mortgage calculators with decimal precision: amortization \
                  schedules, ARM rate paths, PITI, PMI, FHA and VA fees, prepayment and \
                  recast strategies, affordability, and rent vs. buy projections."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Emit the summary/details/chart/insights report instead of the raw result
    #[arg(long, global = true)]
    report: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fixed-rate amortization schedule with optional extra payments
    Amortize(AmortizeArgs),
    /// Adjustable-rate mortgage simulation with capped resets
    Arm(ArmArgs),
    /// Monthly principal, interest, taxes, insurance, PMI and HOA
    Piti(PitiArgs),
    /// Private mortgage insurance cost and cancellation timing
    Pmi(PmiArgs),
    /// FHA loan with upfront and annual MIP
    Fha(FhaArgs),
    /// VA loan with funding fee
    Va(VaArgs),
    /// Compare extra payments, lump sums, recast, biweekly and investing
    Prepayment(PrepaymentArgs),
    /// Maximum affordable home price per DTI band
    Affordability(AffordabilityArgs),
    /// Rent vs. buy net worth projection
    RentVsBuy(RentVsBuyArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let report = cli.report;

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Amortize(args) => commands::amortize::run_amortize(args, report),
        Commands::Arm(args) => commands::arm::run_arm(args, report),
        Commands::Piti(args) => commands::piti::run_piti(args, report),
        Commands::Pmi(args) => commands::fees::run_pmi(args, report),
        Commands::Fha(args) => commands::fees::run_fha(args, report),
        Commands::Va(args) => commands::fees::run_va(args, report),
        Commands::Prepayment(args) => commands::prepayment::run_prepayment(args, report),
        Commands::Affordability(args) => commands::affordability::run_affordability(args, report),
        Commands::RentVsBuy(args) => commands::rent_vs_buy::run_rent_vs_buy(args, report),
        Commands::Version => {
            println!("mcalc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {:?}", e);
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
