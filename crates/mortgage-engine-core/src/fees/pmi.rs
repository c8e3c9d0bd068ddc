//! Private mortgage insurance for conventional loans.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{Bound, BracketTable};
use crate::amortization::{amortize, LoanTerms, RegularPayments, Schedule};
use crate::error::MortgageError;
use crate::time_value::{ratio_or_zero, term_months, MONTHS_PER_YEAR};
use crate::types::{pct_to_rate, rate_to_pct, with_metadata, ComputationOutput, Money, Percent};
use crate::MortgageResult;

/// PMI is not charged at or below this LTV.
pub const PMI_LTV_THRESHOLD_PCT: Percent = dec!(80);
/// LTV at which PMI terminates automatically.
pub const PMI_AUTO_TERMINATION_LTV_PCT: Percent = dec!(78);

const SCORES_LTV_85: &[(Decimal, Percent)] = &[
    (dec!(760), dec!(0.19)),
    (dec!(740), dec!(0.20)),
    (dec!(720), dec!(0.23)),
    (dec!(700), dec!(0.25)),
    (dec!(680), dec!(0.30)),
    (dec!(660), dec!(0.38)),
    (dec!(640), dec!(0.44)),
    (dec!(620), dec!(0.50)),
];

const SCORES_LTV_90: &[(Decimal, Percent)] = &[
    (dec!(760), dec!(0.28)),
    (dec!(740), dec!(0.34)),
    (dec!(720), dec!(0.41)),
    (dec!(700), dec!(0.46)),
    (dec!(680), dec!(0.55)),
    (dec!(660), dec!(0.69)),
    (dec!(640), dec!(0.79)),
    (dec!(620), dec!(0.89)),
];

const SCORES_LTV_95: &[(Decimal, Percent)] = &[
    (dec!(760), dec!(0.38)),
    (dec!(740), dec!(0.48)),
    (dec!(720), dec!(0.59)),
    (dec!(700), dec!(0.68)),
    (dec!(680), dec!(0.82)),
    (dec!(660), dec!(1.04)),
    (dec!(640), dec!(1.17)),
    (dec!(620), dec!(1.30)),
];

const SCORES_LTV_97: &[(Decimal, Percent)] = &[
    (dec!(760), dec!(0.55)),
    (dec!(740), dec!(0.66)),
    (dec!(720), dec!(0.78)),
    (dec!(700), dec!(0.90)),
    (dec!(680), dec!(1.10)),
    (dec!(660), dec!(1.35)),
    (dec!(640), dec!(1.52)),
    (dec!(620), dec!(1.67)),
];

/// Annual PMI rate (% of loan amount) by LTV, then by credit score.
pub const PMI_TABLE: BracketTable<BracketTable<Percent>> = BracketTable::new(
    "PMI loan-to-value",
    Bound::AtMost,
    &[
        (dec!(85), BracketTable::new("PMI credit score", Bound::AtLeast, SCORES_LTV_85)),
        (dec!(90), BracketTable::new("PMI credit score", Bound::AtLeast, SCORES_LTV_90)),
        (dec!(95), BracketTable::new("PMI credit score", Bound::AtLeast, SCORES_LTV_95)),
        (dec!(97), BracketTable::new("PMI credit score", Bound::AtLeast, SCORES_LTV_97)),
    ],
);

/// Annual PMI rate for an LTV and credit score; zero at or below 80% LTV.
pub fn pmi_annual_rate_pct(
    ltv_pct: Percent,
    credit_score: u32,
    warnings: &mut Vec<String>,
) -> MortgageResult<Percent> {
    if ltv_pct <= PMI_LTV_THRESHOLD_PCT {
        return Ok(Decimal::ZERO);
    }
    let by_score = PMI_TABLE.lookup_or_warn(ltv_pct, warnings)?;
    by_score.lookup_or_warn(Decimal::from(credit_score), warnings)
}

/// Monthly PMI premium for a loan amount at an LTV and credit score.
pub fn monthly_pmi(
    loan_amount: Money,
    ltv_pct: Percent,
    credit_score: u32,
    warnings: &mut Vec<String>,
) -> MortgageResult<Money> {
    let rate_pct = pmi_annual_rate_pct(ltv_pct, credit_score, warnings)?;
    Ok(loan_amount * pct_to_rate(rate_pct) / Decimal::from(MONTHS_PER_YEAR))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmiInput {
    pub home_price: Money,
    pub down_payment: Money,
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    pub credit_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PmiOutput {
    pub loan_amount: Money,
    pub ltv_pct: Percent,
    pub pmi_required: bool,
    pub annual_pmi_rate_pct: Percent,
    pub monthly_pmi: Money,
    pub monthly_principal_interest: Money,
    pub monthly_payment_with_pmi: Money,
    /// First month after which the balance is at or below 80% of the price.
    pub cancellation_request_month: Option<u32>,
    /// 78% LTV or the midpoint of the term, whichever comes first.
    pub automatic_termination_month: Option<u32>,
    pub months_charged: u32,
    pub total_pmi_paid: Money,
}

/// Estimate PMI and when it comes off a conventional loan.
pub fn calculate_pmi(input: &PmiInput) -> MortgageResult<ComputationOutput<PmiOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_pmi(input)?;

    let loan_amount = input.home_price - input.down_payment;
    let ltv_pct = rate_to_pct(loan_amount / input.home_price);
    let terms = LoanTerms {
        principal: loan_amount,
        annual_rate: pct_to_rate(input.annual_rate_pct),
        term_months: term_months(input.term_years)?,
        start_date: None,
    };
    let schedule = amortize(&terms, RegularPayments)?;

    let annual_pmi_rate_pct = pmi_annual_rate_pct(ltv_pct, input.credit_score, &mut warnings)?;
    let pmi_required = annual_pmi_rate_pct > Decimal::ZERO;
    let monthly = loan_amount * pct_to_rate(annual_pmi_rate_pct) / Decimal::from(MONTHS_PER_YEAR);

    let (cancellation_request_month, automatic_termination_month, months_charged) = if pmi_required
    {
        let request = first_month_at_ltv(&schedule, input.home_price, PMI_LTV_THRESHOLD_PCT);
        let midpoint = terms.term_months / 2;
        let auto = first_month_at_ltv(&schedule, input.home_price, PMI_AUTO_TERMINATION_LTV_PCT)
            .map_or(midpoint, |m| m.min(midpoint));
        (request, Some(auto), auto)
    } else {
        (None, None, 0)
    };

    if pmi_required && input.credit_score < 620 {
        warnings.push("Credit scores below 620 rarely qualify for conventional PMI".into());
    }

    let output = PmiOutput {
        loan_amount,
        ltv_pct,
        pmi_required,
        annual_pmi_rate_pct,
        monthly_pmi: monthly,
        monthly_principal_interest: schedule.initial_payment,
        monthly_payment_with_pmi: schedule.initial_payment + monthly,
        cancellation_request_month,
        automatic_termination_month,
        months_charged,
        total_pmi_paid: monthly * Decimal::from(months_charged),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Conventional PMI by LTV and credit score bracket",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// First month whose ending balance is at or below `ltv_pct` of `value`.
fn first_month_at_ltv(schedule: &Schedule, value: Money, ltv_pct: Percent) -> Option<u32> {
    schedule
        .rows
        .iter()
        .find(|r| rate_to_pct(ratio_or_zero(r.balance, value)) <= ltv_pct)
        .map(|r| r.month)
}

fn validate_pmi(input: &PmiInput) -> MortgageResult<()> {
    if input.home_price <= Decimal::ZERO {
        return Err(MortgageError::invalid("home_price", "Home price must be positive"));
    }
    if input.down_payment < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment cannot be negative",
        ));
    }
    if input.down_payment >= input.home_price {
        return Err(MortgageError::invalid(
            "down_payment",
            "Down payment must be less than the home price",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(down: Money, score: u32) -> PmiInput {
        PmiInput {
            home_price: dec!(400_000),
            down_payment: down,
            annual_rate_pct: dec!(6.5),
            term_years: 30,
            credit_score: score,
        }
    }

    #[test]
    fn test_no_pmi_at_80_ltv() {
        let mut w = Vec::new();
        assert_eq!(pmi_annual_rate_pct(dec!(80), 700, &mut w).unwrap(), Decimal::ZERO);
        let out = calculate_pmi(&input(dec!(80_000), 700)).unwrap().result;
        assert!(!out.pmi_required);
        assert_eq!(out.total_pmi_paid, Decimal::ZERO);
        assert!(out.automatic_termination_month.is_none());
    }

    #[test]
    fn test_ltv_boundaries_inclusive() {
        let mut w = Vec::new();
        assert_eq!(pmi_annual_rate_pct(dec!(85), 760, &mut w).unwrap(), dec!(0.19));
        assert_eq!(pmi_annual_rate_pct(dec!(85.01), 760, &mut w).unwrap(), dec!(0.28));
        assert_eq!(pmi_annual_rate_pct(dec!(95), 740, &mut w).unwrap(), dec!(0.48));
        assert!(w.is_empty());
    }

    #[test]
    fn test_score_boundaries_inclusive() {
        let mut w = Vec::new();
        assert_eq!(pmi_annual_rate_pct(dec!(90), 740, &mut w).unwrap(), dec!(0.34));
        assert_eq!(pmi_annual_rate_pct(dec!(90), 739, &mut w).unwrap(), dec!(0.41));
    }

    #[test]
    fn test_out_of_range_clamps_with_warning() {
        let mut w = Vec::new();
        assert_eq!(pmi_annual_rate_pct(dec!(99), 600, &mut w).unwrap(), dec!(1.67));
        assert_eq!(w.len(), 2);
    }

    #[test]
    fn test_lower_score_costs_more() {
        let mut w = Vec::new();
        let good = pmi_annual_rate_pct(dec!(95), 780, &mut w).unwrap();
        let fair = pmi_annual_rate_pct(dec!(95), 650, &mut w).unwrap();
        assert!(fair > good);
    }

    #[test]
    fn test_termination_after_request() {
        let out = calculate_pmi(&input(dec!(20_000), 720)).unwrap().result;
        assert!(out.pmi_required);
        let request = out.cancellation_request_month.unwrap();
        let auto = out.automatic_termination_month.unwrap();
        assert!(request < auto);
        assert!(auto <= 180);
        assert_eq!(out.total_pmi_paid, out.monthly_pmi * Decimal::from(auto));
    }

    #[test]
    fn test_monthly_pmi_amount() {
        let mut w = Vec::new();
        // 380k at 0.59%/yr => 186.83/month
        let m = monthly_pmi(dec!(380_000), dec!(95), 720, &mut w).unwrap();
        assert!((m - dec!(186.83)).abs() < dec!(0.01));
    }

    #[test]
    fn test_rejects_down_payment_over_price() {
        assert!(calculate_pmi(&input(dec!(400_000), 720)).is_err());
    }
}
