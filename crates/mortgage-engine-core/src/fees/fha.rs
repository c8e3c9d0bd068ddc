//! FHA mortgage insurance premium (upfront and annual MIP).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{Bound, BracketTable};
use crate::amortization::{amortize, LoanTerms, RegularPayments};
use crate::error::MortgageError;
use crate::time_value::{term_months, MONTHS_PER_YEAR};
use crate::types::{pct_to_rate, rate_to_pct, with_metadata, ComputationOutput, Money, Percent};
use crate::MortgageResult;

/// Upfront MIP, % of the base loan amount.
pub const UPFRONT_MIP_PCT: Percent = dec!(1.75);
/// Base loan amounts above this use the high-balance MIP schedule.
pub const HIGH_BALANCE_LIMIT: Money = dec!(726_200);
/// MIP duration when the original LTV is at or below 90%.
pub const SHORT_MIP_YEARS: u32 = 11;

/// How long annual MIP is charged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MipDuration {
    Years(u32),
    LifeOfLoan,
}

impl MipDuration {
    /// Months of MIP for a loan of `term_months`.
    pub fn months(self, term_months: u32) -> u32 {
        match self {
            MipDuration::Years(y) => (y * MONTHS_PER_YEAR).min(term_months),
            MipDuration::LifeOfLoan => term_months,
        }
    }
}

/// Annual MIP rate and duration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MipRule {
    pub annual_rate_pct: Percent,
    pub duration: MipDuration,
}

const fn rule(annual_rate_pct: Percent, duration: MipDuration) -> MipRule {
    MipRule {
        annual_rate_pct,
        duration,
    }
}

const ELEVEN_YEARS: MipDuration = MipDuration::Years(SHORT_MIP_YEARS);
const LIFE: MipDuration = MipDuration::LifeOfLoan;

const LONG_STANDARD: BracketTable<MipRule> = BracketTable::new(
    "FHA loan-to-value",
    Bound::AtMost,
    &[
        (dec!(90), rule(dec!(0.50), ELEVEN_YEARS)),
        (dec!(95), rule(dec!(0.50), LIFE)),
        (dec!(96.5), rule(dec!(0.55), LIFE)),
    ],
);

const LONG_HIGH_BALANCE: BracketTable<MipRule> = BracketTable::new(
    "FHA loan-to-value",
    Bound::AtMost,
    &[
        (dec!(90), rule(dec!(0.70), ELEVEN_YEARS)),
        (dec!(95), rule(dec!(0.70), LIFE)),
        (dec!(96.5), rule(dec!(0.75), LIFE)),
    ],
);

const SHORT_STANDARD: BracketTable<MipRule> = BracketTable::new(
    "FHA loan-to-value",
    Bound::AtMost,
    &[
        (dec!(90), rule(dec!(0.15), ELEVEN_YEARS)),
        (dec!(96.5), rule(dec!(0.40), LIFE)),
    ],
);

const SHORT_HIGH_BALANCE: BracketTable<MipRule> = BracketTable::new(
    "FHA loan-to-value",
    Bound::AtMost,
    &[
        (dec!(78), rule(dec!(0.15), ELEVEN_YEARS)),
        (dec!(90), rule(dec!(0.40), ELEVEN_YEARS)),
        (dec!(96.5), rule(dec!(0.65), LIFE)),
    ],
);

/// Loan-amount bracket: `(is_high_balance)`.
const LOAN_AMOUNT: BracketTable<bool> = BracketTable::new(
    "FHA base loan amount",
    Bound::AtMost,
    &[(HIGH_BALANCE_LIMIT, false), (Decimal::MAX, true)],
);

/// Term bracket: `(is_short_term)`; 15 years or less is short.
const TERM: BracketTable<bool> = BracketTable::new(
    "FHA term",
    Bound::AtMost,
    &[(dec!(15), true), (Decimal::MAX, false)],
);

/// Minimum down payment % by credit score. Scores below 500 are ineligible.
const MIN_DOWN_BY_SCORE: BracketTable<Percent> = BracketTable::new(
    "FHA credit score",
    Bound::AtLeast,
    &[(dec!(580), dec!(3.5)), (dec!(500), dec!(10))],
);

pub const MIN_CREDIT_SCORE: u32 = 500;

/// Annual MIP rule for an LTV, term and base loan amount.
pub fn annual_mip_rule(
    ltv_pct: Percent,
    term_years: u32,
    base_loan_amount: Money,
    warnings: &mut Vec<String>,
) -> MortgageResult<MipRule> {
    let short_term = TERM.lookup(Decimal::from(term_years))?.value;
    let high_balance = LOAN_AMOUNT.lookup(base_loan_amount)?.value;
    let table = match (short_term, high_balance) {
        (false, false) => LONG_STANDARD,
        (false, true) => LONG_HIGH_BALANCE,
        (true, false) => SHORT_STANDARD,
        (true, true) => SHORT_HIGH_BALANCE,
    };
    table.lookup_or_warn(ltv_pct, warnings)
}

/// Minimum FHA down payment % for a credit score.
pub fn minimum_down_payment_pct(credit_score: u32) -> MortgageResult<Percent> {
    if credit_score < MIN_CREDIT_SCORE {
        return Err(MortgageError::invalid(
            "credit_score",
            format!("FHA loans require a credit score of at least {MIN_CREDIT_SCORE}"),
        ));
    }
    Ok(MIN_DOWN_BY_SCORE.lookup(Decimal::from(credit_score))?.value)
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhaInput {
    pub home_price: Money,
    pub down_payment: Money,
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    pub credit_score: u32,
    /// Roll the upfront MIP into the loan (the usual case).
    #[serde(default = "default_true")]
    pub finance_upfront_mip: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FhaOutput {
    pub base_loan_amount: Money,
    pub down_payment_pct: Percent,
    pub minimum_down_payment_pct: Percent,
    pub ltv_pct: Percent,
    pub upfront_mip: Money,
    pub total_loan_amount: Money,
    pub annual_mip_rate_pct: Percent,
    pub mip_duration: MipDuration,
    pub mip_months: u32,
    pub monthly_principal_interest: Money,
    pub first_year_monthly_mip: Money,
    pub total_mip_paid: Money,
    pub total_interest: Money,
    pub cash_due_at_closing: Money,
}

/// FHA loan cost with upfront and annual MIP.
///
/// Annual MIP for each loan year is charged on the average of that year's
/// beginning-of-month balances.
pub fn calculate_fha(input: &FhaInput) -> MortgageResult<ComputationOutput<FhaOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_fha(input)?;

    let minimum_down_payment_pct = minimum_down_payment_pct(input.credit_score)?;
    let base_loan_amount = input.home_price - input.down_payment;
    let down_payment_pct = rate_to_pct(input.down_payment / input.home_price);
    let ltv_pct = rate_to_pct(base_loan_amount / input.home_price);

    if down_payment_pct < minimum_down_payment_pct {
        warnings.push(format!(
            "Down payment of {}% is below the FHA minimum of {}% for a {} credit score",
            down_payment_pct.round_dp(2),
            minimum_down_payment_pct,
            input.credit_score
        ));
    }

    let upfront_mip = base_loan_amount * pct_to_rate(UPFRONT_MIP_PCT);
    let total_loan_amount = if input.finance_upfront_mip {
        base_loan_amount + upfront_mip
    } else {
        base_loan_amount
    };

    let rule = annual_mip_rule(ltv_pct, input.term_years, base_loan_amount, &mut warnings)?;
    let terms = LoanTerms {
        principal: total_loan_amount,
        annual_rate: pct_to_rate(input.annual_rate_pct),
        term_months: term_months(input.term_years)?,
        start_date: None,
    };
    let schedule = amortize(&terms, RegularPayments)?;
    let mip_months = rule.duration.months(schedule.payoff_months);

    let mip_rate = pct_to_rate(rule.annual_rate_pct);
    let mut total_mip_paid = Decimal::ZERO;
    let mut first_year_monthly_mip = Decimal::ZERO;
    let mut opening = total_loan_amount;
    let mut year_balances = Decimal::ZERO;
    let mut months_in_year = 0u32;

    for row in schedule.rows.iter().take(mip_months as usize) {
        year_balances += opening;
        months_in_year += 1;
        opening = row.balance;

        if months_in_year == MONTHS_PER_YEAR || row.month == mip_months {
            let average = year_balances / Decimal::from(months_in_year);
            let monthly = average * mip_rate / Decimal::from(MONTHS_PER_YEAR);
            if row.month <= MONTHS_PER_YEAR {
                first_year_monthly_mip = monthly;
            }
            total_mip_paid += monthly * Decimal::from(months_in_year);
            year_balances = Decimal::ZERO;
            months_in_year = 0;
        }
    }

    let cash_due_at_closing = if input.finance_upfront_mip {
        input.down_payment
    } else {
        input.down_payment + upfront_mip
    };

    let output = FhaOutput {
        base_loan_amount,
        down_payment_pct,
        minimum_down_payment_pct,
        ltv_pct,
        upfront_mip,
        total_loan_amount,
        annual_mip_rate_pct: rule.annual_rate_pct,
        mip_duration: rule.duration,
        mip_months,
        monthly_principal_interest: schedule.initial_payment,
        first_year_monthly_mip,
        total_mip_paid,
        total_interest: schedule.total_interest,
        cash_due_at_closing,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "FHA upfront and annual MIP on average annual balance",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_fha(input: &FhaInput) -> MortgageResult<()> {
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

#[cfg(test)]
mod tests {
    use super::*;

    fn standard() -> FhaInput {
        FhaInput {
            home_price: dec!(300_000),
            down_payment: dec!(10_500),
            annual_rate_pct: dec!(6.25),
            term_years: 30,
            credit_score: 640,
            finance_upfront_mip: true,
        }
    }

    #[test]
    fn test_standard_30_year_mip() {
        let mut w = Vec::new();
        let rule = annual_mip_rule(dec!(96.5), 30, dec!(289_500), &mut w).unwrap();
        assert_eq!(rule.annual_rate_pct, dec!(0.55));
        assert_eq!(rule.duration, MipDuration::LifeOfLoan);
        let rule = annual_mip_rule(dec!(95), 30, dec!(285_000), &mut w).unwrap();
        assert_eq!(rule.annual_rate_pct, dec!(0.50));
        assert!(w.is_empty());
    }

    #[test]
    fn test_ltv_90_gets_eleven_years() {
        let mut w = Vec::new();
        let rule = annual_mip_rule(dec!(90), 30, dec!(270_000), &mut w).unwrap();
        assert_eq!(rule.duration, MipDuration::Years(11));
    }

    #[test]
    fn test_short_term_and_high_balance_tables() {
        let mut w = Vec::new();
        assert_eq!(
            annual_mip_rule(dec!(85), 15, dec!(400_000), &mut w).unwrap().annual_rate_pct,
            dec!(0.15)
        );
        assert_eq!(
            annual_mip_rule(dec!(85), 15, dec!(800_000), &mut w).unwrap().annual_rate_pct,
            dec!(0.40)
        );
        assert_eq!(
            annual_mip_rule(dec!(96), 30, dec!(726_200), &mut w).unwrap().annual_rate_pct,
            dec!(0.55)
        );
        assert_eq!(
            annual_mip_rule(dec!(96), 30, dec!(726_201), &mut w).unwrap().annual_rate_pct,
            dec!(0.75)
        );
    }

    #[test]
    fn test_ltv_above_fha_max_clamps() {
        let mut w = Vec::new();
        let rule = annual_mip_rule(dec!(99), 30, dec!(300_000), &mut w).unwrap();
        assert_eq!(rule.annual_rate_pct, dec!(0.55));
        assert_eq!(w.len(), 1);
    }

    #[test]
    fn test_minimum_down_by_score() {
        assert_eq!(minimum_down_payment_pct(580).unwrap(), dec!(3.5));
        assert_eq!(minimum_down_payment_pct(579).unwrap(), dec!(10));
        assert!(minimum_down_payment_pct(499).is_err());
    }

    #[test]
    fn test_upfront_mip_financed() {
        let out = calculate_fha(&standard()).unwrap().result;
        assert_eq!(out.base_loan_amount, dec!(289_500));
        assert_eq!(out.upfront_mip, dec!(5066.25));
        assert_eq!(out.total_loan_amount, dec!(294_566.25));
        assert_eq!(out.cash_due_at_closing, dec!(10_500));
        assert_eq!(out.mip_months, 360);
    }

    #[test]
    fn test_first_year_mip_close_to_simple_estimate() {
        let out = calculate_fha(&standard()).unwrap().result;
        let simple = out.total_loan_amount * dec!(0.0055) / dec!(12);
        assert!(out.first_year_monthly_mip < simple);
        assert!(simple - out.first_year_monthly_mip < dec!(5));
        assert!(out.total_mip_paid > Decimal::ZERO);
    }

    #[test]
    fn test_low_down_payment_warns() {
        let mut input = standard();
        input.credit_score = 560;
        let out = calculate_fha(&input).unwrap();
        assert_eq!(out.result.minimum_down_payment_pct, dec!(10));
        assert_eq!(out.warnings.len(), 1);
    }

    #[test]
    fn test_eleven_year_mip_stops() {
        let mut input = standard();
        input.down_payment = dec!(30_000);
        let out = calculate_fha(&input).unwrap().result;
        assert_eq!(out.mip_duration, MipDuration::Years(11));
        assert_eq!(out.mip_months, 132);
    }
}
