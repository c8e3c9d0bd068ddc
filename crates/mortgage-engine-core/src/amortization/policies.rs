//! Payment policies plugged into [`amortize`](super::schedule::amortize).

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::schedule::{LoanState, PaymentPolicy, PaymentRow};
use crate::time_value::{annuity_payment, monthly_rate, MONTHS_PER_YEAR};
use crate::types::Money;
use crate::MortgageResult;

/// Scheduled payments only.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegularPayments;

impl PaymentPolicy for RegularPayments {}

/// A one-time principal payment posted in a given month.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LumpSum {
    pub month: u32,
    pub amount: Money,
}

impl LumpSum {
    /// Lump sum posted on the anniversary month closing loan year `year`.
    pub fn in_year(year: u32, amount: Money) -> Self {
        LumpSum {
            month: year * MONTHS_PER_YEAR,
            amount,
        }
    }
}

/// Extra principal on top of the scheduled payment; the payment itself never changes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtraPayments {
    /// Added every month.
    pub monthly: Money,
    /// Added on every loan anniversary month (12, 24, ...).
    pub annual: Money,
    pub lump_sum: Option<LumpSum>,
}

impl ExtraPayments {
    pub fn is_empty(&self) -> bool {
        self.monthly <= Decimal::ZERO
            && self.annual <= Decimal::ZERO
            && self.lump_sum.map_or(true, |l| l.amount <= Decimal::ZERO)
    }

    /// Extra principal requested for `month`, before clamping.
    pub fn amount_for_month(&self, month: u32) -> Money {
        let mut extra = self.monthly;
        if month % MONTHS_PER_YEAR == 0 {
            extra += self.annual;
        }
        if let Some(lump) = self.lump_sum {
            if lump.month == month {
                extra += lump.amount;
            }
        }
        extra
    }
}

impl PaymentPolicy for ExtraPayments {
    fn extra_principal(&mut self, state: &LoanState) -> Money {
        self.amount_for_month(state.month)
    }
}

/// Lump-sum prepayment followed by a recast: the remaining balance is
/// re-amortized over the remaining term at the unchanged rate.
#[derive(Debug, Clone)]
pub struct LumpSumRecast {
    pub lump_sum: LumpSum,
    /// One-time servicer fee; reported alongside, never applied to principal.
    pub fee: Money,
    /// Payment after the recast, once it has happened.
    pub recast_payment: Option<Money>,
    /// The lump sum covered the whole remaining balance.
    pub paid_off_by_lump_sum: bool,
}

impl LumpSumRecast {
    pub fn new(lump_sum: LumpSum, fee: Money) -> Self {
        LumpSumRecast {
            lump_sum,
            fee,
            recast_payment: None,
            paid_off_by_lump_sum: false,
        }
    }
}

impl PaymentPolicy for LumpSumRecast {
    fn extra_principal(&mut self, state: &LoanState) -> Money {
        if state.month == self.lump_sum.month {
            self.lump_sum.amount
        } else {
            Decimal::ZERO
        }
    }

    fn end_month(&mut self, state: &mut LoanState, row: &PaymentRow) -> MortgageResult<()> {
        if state.month != self.lump_sum.month || row.extra <= Decimal::ZERO {
            return Ok(());
        }
        if state.balance.is_zero() {
            self.paid_off_by_lump_sum = true;
            return Ok(());
        }

        let remaining_after = state.remaining_months.saturating_sub(1);
        if remaining_after == 0 {
            return Ok(());
        }
        let payment = annuity_payment(
            state.balance,
            monthly_rate(state.annual_rate),
            remaining_after,
        )?;
        log::debug!(
            "recast in month {}: payment {} -> {}",
            state.month,
            state.payment.round_dp(2),
            payment.round_dp(2)
        );
        state.payment = payment;
        self.recast_payment = Some(payment);
        Ok(())
    }
}

/// Extra monthly amount equivalent to biweekly half-payments
/// (26 half-payments = 13 full payments a year).
pub fn biweekly_equivalent_extra(monthly_payment: Money) -> Money {
    monthly_payment / dec!(12)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::schedule::{amortize, LoanTerms};

    fn loan() -> LoanTerms {
        LoanTerms {
            principal: dec!(300_000),
            annual_rate: dec!(0.06),
            term_months: 360,
            start_date: None,
        }
    }

    #[test]
    fn test_annual_extra_posts_on_anniversaries() {
        let extra = ExtraPayments {
            annual: dec!(1000),
            ..Default::default()
        };
        assert_eq!(extra.amount_for_month(11), Decimal::ZERO);
        assert_eq!(extra.amount_for_month(12), dec!(1000));
        assert_eq!(extra.amount_for_month(24), dec!(1000));
    }

    #[test]
    fn test_lump_sum_in_year() {
        assert_eq!(LumpSum::in_year(5, dec!(10)).month, 60);
    }

    #[test]
    fn test_recast_lowers_payment_keeps_term() {
        let mut recast = LumpSumRecast::new(LumpSum::in_year(5, dec!(50_000)), dec!(250));
        let s = amortize(&loan(), &mut recast).unwrap();
        let new_payment = recast.recast_payment.unwrap();
        assert!(new_payment < s.initial_payment);
        assert_eq!(s.payoff_months, 360);
        assert!(!recast.paid_off_by_lump_sum);
        // Month after the recast uses the new payment.
        let next = &s.rows[60];
        assert!((next.interest + next.principal - new_payment).abs() < dec!(0.000001));
    }

    #[test]
    fn test_recast_lump_larger_than_balance_pays_off() {
        let mut recast = LumpSumRecast::new(LumpSum::in_year(2, dec!(1_000_000)), Decimal::ZERO);
        let s = amortize(&loan(), &mut recast).unwrap();
        assert_eq!(s.payoff_months, 24);
        assert!(recast.paid_off_by_lump_sum);
        assert!(recast.recast_payment.is_none());
        assert_eq!(s.final_balance(), Decimal::ZERO);
    }

    #[test]
    fn test_biweekly_equivalent() {
        assert_eq!(biweekly_equivalent_extra(dec!(1200)), dec!(100));
    }
}
