//! Full monthly housing cost (PITI + HOA + PMI).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::fees::pmi;
use crate::time_value::{
    annuity_payment, monthly_rate, ratio_or_zero, term_months, MONTHS_PER_YEAR,
};
use crate::types::{pct_to_rate, rate_to_pct, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::MortgageResult;

/// Assumptions that turn a home price and down payment into a monthly cost.
#[derive(Debug, Clone)]
pub struct CostModel {
    pub annual_rate: Rate,
    pub term_months: u32,
    /// Annual property tax as a fraction of price.
    pub property_tax_rate: Rate,
    pub annual_insurance: Money,
    pub monthly_hoa: Money,
    /// When set, PMI is added above 80% LTV using this score.
    pub pmi_credit_score: Option<u32>,
}

/// Itemized monthly housing cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HousingCostBreakdown {
    pub loan_amount: Money,
    pub ltv_pct: Percent,
    pub principal_interest: Money,
    pub property_tax: Money,
    pub insurance: Money,
    pub pmi: Money,
    pub hoa: Money,
    pub total_monthly: Money,
}

impl CostModel {
    /// Monthly cost of buying at `price` with `down_payment` down.
    pub fn monthly_cost(
        &self,
        price: Money,
        down_payment: Money,
        warnings: &mut Vec<String>,
    ) -> MortgageResult<HousingCostBreakdown> {
        let loan_amount = (price - down_payment).max(Decimal::ZERO);
        let ltv_pct = rate_to_pct(ratio_or_zero(loan_amount, price));
        let months = Decimal::from(MONTHS_PER_YEAR);

        let principal_interest =
            annuity_payment(loan_amount, monthly_rate(self.annual_rate), self.term_months)?;
        let property_tax = price * self.property_tax_rate / months;
        let insurance = self.annual_insurance / months;
        let pmi = match self.pmi_credit_score {
            Some(score) if loan_amount > Decimal::ZERO => {
                pmi::monthly_pmi(loan_amount, ltv_pct, score, warnings)?
            }
            _ => Decimal::ZERO,
        };

        Ok(HousingCostBreakdown {
            loan_amount,
            ltv_pct,
            principal_interest,
            property_tax,
            insurance,
            pmi,
            hoa: self.monthly_hoa,
            total_monthly: principal_interest + property_tax + insurance + pmi + self.monthly_hoa,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitiInput {
    pub home_price: Money,
    pub down_payment: Money,
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    /// Annual property tax as a % of price.
    #[serde(default)]
    pub property_tax_rate_pct: Percent,
    #[serde(default)]
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_hoa: Money,
    /// Enables PMI above 80% LTV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PitiOutput {
    pub breakdown: HousingCostBreakdown,
    pub down_payment_pct: Percent,
    pub annual_housing_cost: Money,
    /// Share of the monthly total that goes to principal and interest.
    pub principal_interest_share_pct: Percent,
}

/// Monthly payment calculator with taxes, insurance, HOA and PMI.
pub fn calculate_piti(input: &PitiInput) -> MortgageResult<ComputationOutput<PitiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_piti(input)?;

    let model = CostModel {
        annual_rate: pct_to_rate(input.annual_rate_pct),
        term_months: term_months(input.term_years)?,
        property_tax_rate: pct_to_rate(input.property_tax_rate_pct),
        annual_insurance: input.annual_insurance,
        monthly_hoa: input.monthly_hoa,
        pmi_credit_score: input.credit_score,
    };
    let breakdown = model.monthly_cost(input.home_price, input.down_payment, &mut warnings)?;

    if breakdown.ltv_pct > pmi::PMI_LTV_THRESHOLD_PCT && input.credit_score.is_none() {
        warnings.push("LTV above 80% but no credit score given; PMI not included".into());
    }
    if input.property_tax_rate_pct > dec!(5) {
        warnings.push(format!(
            "Property tax rate of {}% is unusually high",
            input.property_tax_rate_pct
        ));
    }

    let output = PitiOutput {
        down_payment_pct: rate_to_pct(input.down_payment / input.home_price),
        annual_housing_cost: breakdown.total_monthly * Decimal::from(MONTHS_PER_YEAR),
        principal_interest_share_pct: rate_to_pct(ratio_or_zero(
            breakdown.principal_interest,
            breakdown.total_monthly,
        )),
        breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "PITI: annuity P&I plus tax, insurance, HOA and PMI",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_piti(input: &PitiInput) -> MortgageResult<()> {
    if input.home_price <= Decimal::ZERO {
        return Err(MortgageError::invalid("home_price", "Home price must be positive"));
    }
    if input.down_payment < Decimal::ZERO || input.down_payment >= input.home_price {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment must be between zero and the home price",
        ));
    }
    if input.annual_rate_pct < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    term_months(input.term_years)?;
    for (field, value) in [
        ("property_tax_rate_pct", input.property_tax_rate_pct),
        ("annual_insurance", input.annual_insurance),
        ("monthly_hoa", input.monthly_hoa),
    ] {
        if value < Decimal::ZERO {
            return Err(MortgageError::invalid(field, "Value cannot be negative"));
        }
    }
    Ok(())
}
