//! VA funding fee.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{Bound, BracketTable};
use crate::amortization::{amortize, LoanTerms, RegularPayments};
use crate::error::MortgageError;
use crate::time_value::term_months;
use crate::types::{pct_to_rate, rate_to_pct, with_metadata, ComputationOutput, Money, Percent};
use crate::MortgageResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ServiceType {
    #[default]
    Regular,
    ReserveOrGuard,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaUsage {
    #[default]
    FirstTime,
    Subsequent,
}

const REGULAR_FIRST: BracketTable<Percent> = BracketTable::new(
    "VA down payment",
    Bound::AtLeast,
    &[(dec!(10), dec!(1.25)), (dec!(5), dec!(1.50)), (dec!(0), dec!(2.15))],
);

const REGULAR_SUBSEQUENT: BracketTable<Percent> = BracketTable::new(
    "VA down payment",
    Bound::AtLeast,
    &[(dec!(10), dec!(1.25)), (dec!(5), dec!(1.50)), (dec!(0), dec!(3.30))],
);

const RESERVE_FIRST: BracketTable<Percent> = BracketTable::new(
    "VA down payment",
    Bound::AtLeast,
    &[(dec!(10), dec!(1.50)), (dec!(5), dec!(1.75)), (dec!(0), dec!(2.40))],
);

const RESERVE_SUBSEQUENT: BracketTable<Percent> = BracketTable::new(
    "VA down payment",
    Bound::AtLeast,
    &[(dec!(10), dec!(1.50)), (dec!(5), dec!(1.75)), (dec!(0), dec!(3.30))],
);

/// Funding fee as a % of the base loan amount.
pub fn funding_fee_rate_pct(
    down_payment_pct: Percent,
    usage: VaUsage,
    service: ServiceType,
    disability_exempt: bool,
    warnings: &mut Vec<String>,
) -> MortgageResult<Percent> {
    if disability_exempt {
        return Ok(Decimal::ZERO);
    }
    let table = match (service, usage) {
        (ServiceType::Regular, VaUsage::FirstTime) => REGULAR_FIRST,
        (ServiceType::Regular, VaUsage::Subsequent) => REGULAR_SUBSEQUENT,
        (ServiceType::ReserveOrGuard, VaUsage::FirstTime) => RESERVE_FIRST,
        (ServiceType::ReserveOrGuard, VaUsage::Subsequent) => RESERVE_SUBSEQUENT,
    };
    table.lookup_or_warn(down_payment_pct, warnings)
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaInput {
    pub home_price: Money,
    #[serde(default)]
    pub down_payment: Money,
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub usage: VaUsage,
    #[serde(default)]
    pub service: ServiceType,
    #[serde(default)]
    pub disability_exempt: bool,
    #[serde(default = "default_true")]
    pub finance_funding_fee: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaOutput {
    pub base_loan_amount: Money,
    pub down_payment_pct: Percent,
    pub funding_fee_rate_pct: Percent,
    pub funding_fee: Money,
    pub total_loan_amount: Money,
    pub monthly_principal_interest: Money,
    pub total_interest: Money,
    pub cash_due_at_closing: Money,
}

/// VA loan with its one-time funding fee; VA loans carry no monthly mortgage insurance.
pub fn calculate_va(input: &VaInput) -> MortgageResult<ComputationOutput<VaOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_va(input)?;

    let base_loan_amount = input.home_price - input.down_payment;
    let down_payment_pct = rate_to_pct(input.down_payment / input.home_price);
    let rate_pct = funding_fee_rate_pct(
        down_payment_pct,
        input.usage,
        input.service,
        input.disability_exempt,
        &mut warnings,
    )?;
    let funding_fee = base_loan_amount * pct_to_rate(rate_pct);

    let (total_loan_amount, cash_due_at_closing) = if input.finance_funding_fee {
        (base_loan_amount + funding_fee, input.down_payment)
    } else {
        (base_loan_amount, input.down_payment + funding_fee)
    };

    let terms = LoanTerms {
        principal: total_loan_amount,
        annual_rate: pct_to_rate(input.annual_rate_pct),
        term_months: term_months(input.term_years)?,
        start_date: None,
    };
    let schedule = amortize(&terms, RegularPayments)?;

    let output = VaOutput {
        base_loan_amount,
        down_payment_pct,
        funding_fee_rate_pct: rate_pct,
        funding_fee,
        total_loan_amount,
        monthly_principal_interest: schedule.initial_payment,
        total_interest: schedule.total_interest,
        cash_due_at_closing,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "VA funding fee by down payment, usage and service type",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_va(input: &VaInput) -> MortgageResult<()> {
    if input.home_price <= Decimal::ZERO {
        return Err(MortgageError::invalid("home_price", "Home price must be positive"));
    }
    if input.down_payment < Decimal::ZERO || input.down_payment >= input.home_price {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment must be between zero and the home price",
        ));
    }
    term_months(input.term_years)?;
    Ok(())
}
