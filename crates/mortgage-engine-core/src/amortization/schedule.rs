//! Month-by-month amortization primitive.
//!
//! Every calculator in the crate drives this single loop. Variations between
//! strategies (extra principal, recasts, rate resets) are expressed through a
//! [`PaymentPolicy`], so the final-payment clamp and balance tracking are
//! identical everywhere. Values are kept at full `Decimal` precision; rounding
//! is left to the report layer.

use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::MortgageError;
use crate::time_value::{annuity_payment, monthly_rate};
use crate::types::{rate_to_pct, Money, Percent, Rate};
use crate::MortgageResult;

/// Remaining balance below this is treated as drift and swept into principal.
pub const BALANCE_EPSILON: Decimal = dec!(0.000001);

/// One posted monthly payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRow {
    /// 1-based month index.
    pub month: u32,
    /// "Jan 2026" when a start date is known, otherwise "Month N".
    pub date_label: String,
    /// Annual rate in effect for this month, as a percentage.
    pub rate_pct: Percent,
    pub interest: Money,
    /// Scheduled principal portion.
    pub principal: Money,
    /// Additional principal on top of the scheduled payment.
    pub extra: Money,
    /// interest + principal + extra.
    pub total_payment: Money,
    /// Balance after this payment.
    pub balance: Money,
    pub cumulative_interest: Money,
    /// Scheduled plus extra principal to date.
    pub cumulative_principal: Money,
}

/// Immutable inputs to a single amortization run, rates as decimals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Loan state visible to a [`PaymentPolicy`] while a month is being posted.
#[derive(Debug, Clone)]
pub struct LoanState {
    /// Month being posted (1-based).
    pub month: u32,
    /// Balance before this month's payment (after it, in `end_month`).
    pub balance: Money,
    pub annual_rate: Rate,
    /// Scheduled principal-and-interest payment.
    pub payment: Money,
    /// Months left on the original term, counting the current one.
    pub remaining_months: u32,
}

/// Per-month hooks that adjust the standard amortization.
pub trait PaymentPolicy {
    /// Runs before interest accrues. May change the rate or the payment.
    fn begin_month(&mut self, _state: &mut LoanState) -> MortgageResult<()> {
        Ok(())
    }

    /// Additional principal requested for this month. Clamped by the caller.
    fn extra_principal(&mut self, _state: &LoanState) -> Money {
        Decimal::ZERO
    }

    /// Runs after the month is posted, with `state.balance` already reduced.
    fn end_month(&mut self, _state: &mut LoanState, _row: &PaymentRow) -> MortgageResult<()> {
        Ok(())
    }
}

impl<P: PaymentPolicy + ?Sized> PaymentPolicy for &mut P {
    fn begin_month(&mut self, state: &mut LoanState) -> MortgageResult<()> {
        (**self).begin_month(state)
    }

    fn extra_principal(&mut self, state: &LoanState) -> Money {
        (**self).extra_principal(state)
    }

    fn end_month(&mut self, state: &mut LoanState, row: &PaymentRow) -> MortgageResult<()> {
        (**self).end_month(state, row)
    }
}

/// Result of one amortization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Payment derived at origination.
    pub initial_payment: Money,
    pub rows: Vec<PaymentRow>,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_extra: Money,
    pub total_paid: Money,
    pub payoff_months: u32,
}

impl Schedule {
    /// Balance after the last posted row.
    pub fn final_balance(&self) -> Money {
        self.rows.last().map(|r| r.balance).unwrap_or(Decimal::ZERO)
    }

    /// Balance at the end of `month`, or the opening principal before month 1.
    pub fn balance_after(&self, month: u32, principal: Money) -> Money {
        if month == 0 {
            return principal;
        }
        self.rows
            .iter()
            .take_while(|r| r.month <= month)
            .last()
            .map(|r| r.balance)
            .unwrap_or(principal)
    }
}

pub(crate) fn validate_terms(terms: &LoanTerms) -> MortgageResult<()> {
    if terms.principal <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "principal",
            "Loan principal must be positive",
        ));
    }
    if terms.annual_rate < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    if terms.term_months == 0 {
        return Err(MortgageError::invalid(
            "term_years",
            "Loan term must be greater than zero",
        ));
    }
    Ok(())
}

/// Label for a month relative to the loan start date.
pub fn month_label(start_date: Option<NaiveDate>, month: u32) -> String {
    start_date
        .and_then(|d| d.checked_add_months(Months::new(month.saturating_sub(1))))
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|| format!("Month {month}"))
}

/// Amortize `terms` month by month under `policy`.
///
/// The loop ends when the balance reaches zero or after `term_months`
/// iterations, whichever comes first. The last scheduled month always retires
/// whatever balance is left.
pub fn amortize<P: PaymentPolicy>(terms: &LoanTerms, mut policy: P) -> MortgageResult<Schedule> {
    validate_terms(terms)?;

    let initial_payment = annuity_payment(
        terms.principal,
        monthly_rate(terms.annual_rate),
        terms.term_months,
    )?;

    let mut state = LoanState {
        month: 0,
        balance: terms.principal,
        annual_rate: terms.annual_rate,
        payment: initial_payment,
        remaining_months: terms.term_months,
    };

    let mut rows = Vec::with_capacity(terms.term_months as usize);
    let mut total_interest = Decimal::ZERO;
    let mut total_principal = Decimal::ZERO;
    let mut total_extra = Decimal::ZERO;

    for month in 1..=terms.term_months {
        state.month = month;
        state.remaining_months = terms.term_months - month + 1;
        policy.begin_month(&mut state)?;

        let interest = state.balance * monthly_rate(state.annual_rate);
        let mut principal = (state.payment - interest).max(Decimal::ZERO);
        if principal > state.balance || month == terms.term_months {
            principal = state.balance;
        }

        let requested = policy.extra_principal(&state).max(Decimal::ZERO);
        let extra = requested.min(state.balance - principal);

        let remainder = state.balance - principal - extra;
        if remainder > Decimal::ZERO && remainder < BALANCE_EPSILON {
            principal += remainder;
        }

        state.balance -= principal + extra;
        if state.balance < Decimal::ZERO {
            state.balance = Decimal::ZERO;
        }

        total_interest += interest;
        total_principal += principal;
        total_extra += extra;

        let row = PaymentRow {
            month,
            date_label: month_label(terms.start_date, month),
            rate_pct: rate_to_pct(state.annual_rate),
            interest,
            principal,
            extra,
            total_payment: interest + principal + extra,
            balance: state.balance,
            cumulative_interest: total_interest,
            cumulative_principal: total_principal + total_extra,
        };

        policy.end_month(&mut state, &row)?;
        rows.push(row);

        if state.balance.is_zero() {
            break;
        }
    }

    let payoff_months = rows.len() as u32;
    log::debug!(
        "amortized {} over {} of {} months, interest {}",
        terms.principal,
        payoff_months,
        terms.term_months,
        total_interest.round_dp(2)
    );

    Ok(Schedule {
        initial_payment,
        rows,
        total_interest,
        total_principal,
        total_extra,
        total_paid: total_interest + total_principal + total_extra,
        payoff_months,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::policies::{ExtraPayments, RegularPayments};

    const DRIFT: Decimal = dec!(0.0000001);

    fn terms(principal: Money, rate: Rate, years: u32) -> LoanTerms {
        LoanTerms {
            principal,
            annual_rate: rate,
            term_months: years * 12,
            start_date: None,
        }
    }

    #[test]
    fn test_row_identity_holds_every_month() {
        let s = amortize(&terms(dec!(250_000), dec!(0.055), 30), RegularPayments).unwrap();
        let mut prev = dec!(250_000);
        for r in &s.rows {
            assert_eq!(r.interest + r.principal + r.extra, r.total_payment);
            assert!((r.balance - (prev - r.principal - r.extra)).abs() < DRIFT);
            prev = r.balance;
        }
    }

    #[test]
    fn test_full_term_retires_balance() {
        let s = amortize(&terms(dec!(250_000), dec!(0.055), 30), RegularPayments).unwrap();
        assert_eq!(s.payoff_months, 360);
        assert_eq!(s.final_balance(), Decimal::ZERO);
        assert!((s.total_principal + s.total_extra - dec!(250_000)).abs() < DRIFT);
    }

    #[test]
    fn test_zero_rate_has_no_interest() {
        let s = amortize(&terms(dec!(36_000), Decimal::ZERO, 3), RegularPayments).unwrap();
        assert_eq!(s.initial_payment, dec!(1000));
        assert_eq!(s.total_interest, Decimal::ZERO);
        assert_eq!(s.payoff_months, 36);
    }

    #[test]
    fn test_extra_never_overdraws_balance() {
        let policy = ExtraPayments {
            monthly: dec!(50_000),
            ..Default::default()
        };
        let s = amortize(&terms(dec!(100_000), dec!(0.06), 30), policy).unwrap();
        assert_eq!(s.payoff_months, 2);
        assert_eq!(s.final_balance(), Decimal::ZERO);
        assert!(s.rows.iter().all(|r| r.balance >= Decimal::ZERO));
    }

    #[test]
    fn test_month_labels() {
        let start = NaiveDate::from_ymd_opt(2026, 11, 1);
        assert_eq!(month_label(start, 1), "Nov 2026");
        assert_eq!(month_label(start, 3), "Jan 2027");
        assert_eq!(month_label(None, 7), "Month 7");
    }

    #[test]
    fn test_rejects_non_positive_principal() {
        let err = amortize(&terms(Decimal::ZERO, dec!(0.05), 30), RegularPayments).unwrap_err();
        assert!(matches!(err, MortgageError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_negative_rate() {
        let err = amortize(&terms(dec!(1000), dec!(-0.01), 30), RegularPayments).unwrap_err();
        assert!(matches!(err, MortgageError::InvalidInput { .. }));
    }

    #[test]
    fn test_balance_after_lookup() {
        let s = amortize(&terms(dec!(10_000), dec!(0.06), 1), RegularPayments).unwrap();
        assert_eq!(s.balance_after(0, dec!(10_000)), dec!(10_000));
        assert_eq!(s.balance_after(12, dec!(10_000)), Decimal::ZERO);
        assert!(s.balance_after(6, dec!(10_000)) < dec!(10_000));
    }
}
