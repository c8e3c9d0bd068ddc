//! "Invest the difference": put would-be prepayments into a portfolio instead.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::amortization::ExtraPayments;
use crate::time_value::{accrue, monthly_rate};
use crate::types::{pct_to_rate, Money, Percent};
use crate::MortgageResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentComparison {
    /// Assumed annual market return used for the portfolio.
    pub assumed_return_pct: Percent,
    pub months_invested: u32,
    pub total_contributed: Money,
    pub portfolio_value: Money,
    pub investment_gain: Money,
    /// Interest the same amounts would have saved as prepayments.
    pub prepayment_interest_saved: Money,
    /// `investment_gain - prepayment_interest_saved`.
    pub advantage: Money,
    pub investing_wins: bool,
}

/// Contribute each month's would-be extra principal to a portfolio compounding
/// monthly at `return_pct`, for `months` months, and compare its gain with the
/// interest that prepaying would have saved.
pub fn invest_difference(
    extras: &ExtraPayments,
    months: u32,
    return_pct: Percent,
    prepayment_interest_saved: Money,
) -> MortgageResult<InvestmentComparison> {
    let r = monthly_rate(pct_to_rate(return_pct));
    let mut portfolio = Decimal::ZERO;
    let mut contributed = Decimal::ZERO;

    for month in 1..=months {
        let contribution = extras.amount_for_month(month);
        portfolio = accrue(portfolio, r, contribution, "investment_return_pct")?;
        contributed += contribution;
    }

    let gain = portfolio - contributed;
    let advantage = gain - prepayment_interest_saved;
    Ok(InvestmentComparison {
        assumed_return_pct: return_pct,
        months_invested: months,
        total_contributed: contributed,
        portfolio_value: portfolio,
        investment_gain: gain,
        prepayment_interest_saved,
        advantage,
        investing_wins: advantage > Decimal::ZERO,
    })
}
