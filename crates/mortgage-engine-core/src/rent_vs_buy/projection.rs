//! Year-by-year rent vs. buy net worth projection.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{amortize, year_totals, LoanTerms, RegularPayments, Schedule};
use crate::error::MortgageError;
use crate::time_value::{
    accrue, compound_factor, monthly_rate, term_months, MAX_TERM_YEARS, MONTHS_PER_YEAR,
};
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Money, Percent};
use crate::MortgageResult;

fn default_years() -> u32 {
    10
}
fn default_appreciation() -> Percent {
    dec!(3)
}
fn default_offset() -> Percent {
    dec!(2)
}
fn default_inflation() -> Percent {
    dec!(3)
}
fn default_return() -> Percent {
    dec!(7)
}
fn default_maintenance() -> Percent {
    dec!(1)
}
fn default_closing() -> Percent {
    dec!(3)
}
fn default_selling() -> Percent {
    dec!(6)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuyInput {
    pub home_price: Money,
    pub down_payment: Money,
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    pub monthly_rent: Money,
    #[serde(default = "default_years")]
    pub years: u32,
    /// Base-case annual home appreciation.
    #[serde(default = "default_appreciation")]
    pub home_appreciation_pct: Percent,
    /// Best and worst cases are base ± this offset.
    #[serde(default = "default_offset")]
    pub scenario_offset_pct: Percent,
    /// Annual growth of rent and of non-mortgage ownership costs.
    #[serde(default = "default_inflation")]
    pub inflation_pct: Percent,
    #[serde(default = "default_return")]
    pub investment_return_pct: Percent,
    #[serde(default)]
    pub property_tax_rate_pct: Percent,
    #[serde(default)]
    pub annual_insurance: Money,
    /// Annual maintenance as % of purchase price.
    #[serde(default = "default_maintenance")]
    pub maintenance_pct: Percent,
    #[serde(default)]
    pub monthly_hoa: Money,
    #[serde(default = "default_closing")]
    pub closing_cost_pct: Percent,
    #[serde(default = "default_selling")]
    pub selling_cost_pct: Percent,
}

impl RentVsBuyInput {
    pub fn loan_amount(&self) -> Money {
        self.home_price - self.down_payment
    }

    pub fn closing_costs(&self) -> Money {
        self.home_price * pct_to_rate(self.closing_cost_pct)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppreciationScenario {
    Best,
    Base,
    Worst,
}

impl AppreciationScenario {
    pub fn label(&self) -> &'static str {
        match self {
            AppreciationScenario::Best => "Best case",
            AppreciationScenario::Base => "Base case",
            AppreciationScenario::Worst => "Worst case",
        }
    }

    fn appreciation_pct(&self, base: Percent, offset: Percent) -> Percent {
        match self {
            AppreciationScenario::Best => base + offset,
            AppreciationScenario::Base => base,
            AppreciationScenario::Worst => base - offset,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,
    pub home_value: Money,
    pub loan_balance: Money,
    pub principal_paid: Money,
    /// `home_value - loan_balance`, before selling costs.
    pub equity: Money,
    /// Equity after selling costs plus the buyer's own invested savings.
    pub buy_net_worth: Money,
    pub rent_net_worth: Money,
    pub annual_rent: Money,
    pub annual_buy_cost: Money,
    pub buyer_portfolio: Money,
    pub renter_portfolio: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub scenario: AppreciationScenario,
    pub appreciation_pct: Percent,
    pub years: Vec<YearProjection>,
    /// First year buying is ahead; `None` means never within the horizon.
    pub crossover_year: Option<u32>,
    pub final_buy_net_worth: Money,
    pub final_rent_net_worth: Money,
    pub total_rent_paid: Money,
    pub total_buy_cost: Money,
}

impl ScenarioProjection {
    pub fn buying_wins(&self) -> bool {
        self.final_buy_net_worth > self.final_rent_net_worth
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentVsBuyOutput {
    pub loan_amount: Money,
    pub monthly_payment: Money,
    pub closing_costs: Money,
    pub scenarios: Vec<ScenarioProjection>,
}

impl RentVsBuyOutput {
    pub fn scenario(&self, which: AppreciationScenario) -> Option<&ScenarioProjection> {
        self.scenarios.iter().find(|s| s.scenario == which)
    }
}

/// Run one appreciation scenario against a precomputed loan schedule.
///
/// Only home value depends on the scenario; costs and both portfolios are
/// identical across scenarios, so higher appreciation can only move the
/// crossover earlier.
pub fn project_scenario(
    input: &RentVsBuyInput,
    schedule: &Schedule,
    scenario: AppreciationScenario,
) -> MortgageResult<ScenarioProjection> {
    let appreciation_pct =
        scenario.appreciation_pct(input.home_appreciation_pct, input.scenario_offset_pct);
    let appreciation = pct_to_rate(appreciation_pct);
    let inflation = pct_to_rate(input.inflation_pct);
    let invest_rate = monthly_rate(pct_to_rate(input.investment_return_pct));
    let selling = pct_to_rate(input.selling_cost_pct);
    let months = Decimal::from(MONTHS_PER_YEAR);

    let fixed_annual = input.home_price
        * (pct_to_rate(input.property_tax_rate_pct) + pct_to_rate(input.maintenance_pct))
        + input.annual_insurance
        + input.monthly_hoa * months;

    let mut renter_portfolio = input.down_payment + input.closing_costs();
    let mut buyer_portfolio = Decimal::ZERO;
    let mut total_rent = Decimal::ZERO;
    let mut total_buy = input.down_payment + input.closing_costs();
    let mut rows = Vec::with_capacity(input.years as usize);
    let mut crossover_year = None;

    for year in 1..=input.years {
        let inflation_factor = compound_factor(inflation, year - 1)?;
        let annual_rent = input.monthly_rent * months * inflation_factor;
        let (mortgage_paid, principal_paid) = year_totals(&schedule.rows, year)
            .map(|t| (t.total_payment, t.total_principal))
            .unwrap_or_default();
        let annual_buy_cost = mortgage_paid + fixed_annual * inflation_factor;

        let monthly_gap = (annual_buy_cost - annual_rent) / months;
        for _ in 0..MONTHS_PER_YEAR {
            renter_portfolio = accrue(
                renter_portfolio,
                invest_rate,
                monthly_gap.max(Decimal::ZERO),
                "investment_return_pct",
            )?;
            buyer_portfolio = accrue(
                buyer_portfolio,
                invest_rate,
                (-monthly_gap).max(Decimal::ZERO),
                "investment_return_pct",
            )?;
        }

        let home_value = input.home_price * compound_factor(appreciation, year)?;
        let loan_balance = schedule.balance_after(year * MONTHS_PER_YEAR, input.loan_amount());
        let equity = home_value - loan_balance;
        let buy_net_worth =
            home_value * (Decimal::ONE - selling) - loan_balance + buyer_portfolio;
        let rent_net_worth = renter_portfolio;

        if crossover_year.is_none() && buy_net_worth > rent_net_worth {
            crossover_year = Some(year);
        }
        total_rent += annual_rent;
        total_buy += annual_buy_cost;

        rows.push(YearProjection {
            year,
            home_value,
            loan_balance,
            principal_paid,
            equity,
            buy_net_worth,
            rent_net_worth,
            annual_rent,
            annual_buy_cost,
            buyer_portfolio,
            renter_portfolio,
        });
    }

    let (final_buy, final_rent) = rows
        .last()
        .map(|r| (r.buy_net_worth, r.rent_net_worth))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));

    Ok(ScenarioProjection {
        scenario,
        appreciation_pct,
        years: rows,
        crossover_year,
        final_buy_net_worth: final_buy,
        final_rent_net_worth: final_rent,
        total_rent_paid: total_rent,
        total_buy_cost: total_buy,
    })
}

/// Project best, base and worst appreciation scenarios from identical inputs.
pub fn calculate_rent_vs_buy(
    input: &RentVsBuyInput,
) -> MortgageResult<ComputationOutput<RentVsBuyOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_rent_vs_buy(input)?;

    let schedule = amortize(
        &LoanTerms {
            principal: input.loan_amount(),
            annual_rate: pct_to_rate(input.annual_rate_pct),
            term_months: term_months(input.term_years)?,
            start_date: None,
        },
        RegularPayments,
    )?;

    if input.years > input.term_years {
        warnings.push(format!(
            "Horizon of {} years runs past the {}-year loan term",
            input.years, input.term_years
        ));
    }
    if input.scenario_offset_pct.is_zero() {
        warnings.push("Scenario offset is zero; all scenarios are identical".into());
    }

    let scenarios = [
        AppreciationScenario::Best,
        AppreciationScenario::Base,
        AppreciationScenario::Worst,
    ]
    .iter()
    .map(|s| project_scenario(input, &schedule, *s))
    .collect::<MortgageResult<Vec<_>>>()?;

    log::debug!(
        "rent vs buy crossovers: {:?}",
        scenarios.iter().map(|s| s.crossover_year).collect::<Vec<_>>()
    );

    let output = RentVsBuyOutput {
        loan_amount: input.loan_amount(),
        monthly_payment: schedule.initial_payment,
        closing_costs: input.closing_costs(),
        scenarios,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rent vs. buy net worth projection (best/base/worst appreciation)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_rent_vs_buy(input: &RentVsBuyInput) -> MortgageResult<()> {
    if input.home_price <= Decimal::ZERO {
        return Err(MortgageError::invalid("home_price", "Home price must be positive"));
    }
    if input.down_payment < Decimal::ZERO || input.down_payment >= input.home_price {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment must be non-negative and below the home price",
        ));
    }
    if input.monthly_rent < Decimal::ZERO {
        return Err(MortgageError::invalid("monthly_rent", "Rent cannot be negative"));
    }
    if input.years == 0 || input.years > MAX_TERM_YEARS {
        return Err(MortgageError::invalid(
            "years",
            format!("Analysis horizon must be between 1 and {MAX_TERM_YEARS} years"),
        ));
    }
    if input.scenario_offset_pct < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "scenario_offset_pct",
            "Scenario offset cannot be negative",
        ));
    }
    if input.home_appreciation_pct - input.scenario_offset_pct <= dec!(-100) {
        return Err(MortgageError::invalid(
            "home_appreciation_pct",
            "Worst-case appreciation must be above -100%",
        ));
    }
    for (field, value) in [
        ("investment_return_pct", input.investment_return_pct),
        ("inflation_pct", input.inflation_pct),
    ] {
        if value <= dec!(-100) {
            return Err(MortgageError::invalid(field, "Rate must be above -100%"));
        }
    }
    for (field, value) in [
        ("property_tax_rate_pct", input.property_tax_rate_pct),
        ("annual_insurance", input.annual_insurance),
        ("maintenance_pct", input.maintenance_pct),
        ("monthly_hoa", input.monthly_hoa),
        ("closing_cost_pct", input.closing_cost_pct),
    ] {
        if value < Decimal::ZERO {
            return Err(MortgageError::invalid(field, "Value cannot be negative"));
        }
    }
    if input.selling_cost_pct < Decimal::ZERO || input.selling_cost_pct >= dec!(100) {
        return Err(MortgageError::invalid(
            "selling_cost_pct",
            "Selling cost must be within [0, 100)",
        ));
    }
    Ok(())
}
