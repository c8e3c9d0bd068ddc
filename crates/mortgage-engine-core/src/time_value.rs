use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::MortgageError;
use crate::types::{Money, Rate};
use crate::MortgageResult;

pub const MONTHS_PER_YEAR: u32 = 12;
/// Longest loan term any calculator accepts.
pub const MAX_TERM_YEARS: u32 = 50;

/// Validated term in months: `term_years` must be within `1..=MAX_TERM_YEARS`.
pub fn term_months(term_years: u32) -> MortgageResult<u32> {
    if term_years == 0 || term_years > MAX_TERM_YEARS {
        return Err(MortgageError::invalid(
            "term_years",
            format!("Loan term must be between 1 and {MAX_TERM_YEARS} years"),
        ));
    }
    Ok(term_years * MONTHS_PER_YEAR)
}

/// Monthly periodic rate from an annual nominal rate.
pub fn monthly_rate(annual_rate: Rate) -> Rate {
    annual_rate / Decimal::from(MONTHS_PER_YEAR)
}

/// (1 + rate)^n by repeated multiplication.
///
/// Overflow is reported as `InvalidInput`: it is the decimal equivalent of a
/// non-finite result and means the rate/term combination is malformed.
pub fn compound_factor(rate: Rate, n: u32) -> MortgageResult<Decimal> {
    let base = Decimal::ONE + rate;
    let mut result = Decimal::ONE;
    for _ in 0..n {
        result = result.checked_mul(base).ok_or_else(|| {
            MortgageError::invalid(
                "rate",
                format!("compounding {rate} over {n} periods is not finite"),
            )
        })?;
    }
    Ok(result)
}

/// Level annuity payment `M = P·r·(1+r)^n / ((1+r)^n − 1)` for a periodic rate.
///
/// Falls back to `P / n` when the rate is zero.
pub fn annuity_payment(principal: Money, periodic_rate: Rate, n: u32) -> MortgageResult<Money> {
    if n == 0 {
        return Err(MortgageError::invalid(
            "term",
            "Number of payments must be > 0",
        ));
    }
    if principal < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "principal",
            "Principal cannot be negative",
        ));
    }
    if periodic_rate < Decimal::ZERO {
        return Err(MortgageError::invalid("rate", "Rate cannot be negative"));
    }
    if principal.is_zero() {
        return Ok(Decimal::ZERO);
    }
    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(n));
    }

    let factor = compound_factor(periodic_rate, n)?;
    let discount = Decimal::ONE - Decimal::ONE / factor;
    if discount.is_zero() {
        return Err(MortgageError::DivisionByZero {
            context: "annuity discount factor".into(),
        });
    }

    principal
        .checked_mul(periodic_rate)
        .map(|v| v / discount)
        .ok_or_else(|| MortgageError::invalid("principal", "payment is not finite"))
}

/// Future value of a single amount compounded monthly for `months` months.
pub fn grow_monthly(amount: Money, annual_rate: Rate, months: u32) -> MortgageResult<Money> {
    let factor = compound_factor(monthly_rate(annual_rate), months)?;
    amount
        .checked_mul(factor)
        .ok_or_else(|| MortgageError::invalid("amount", "future value is not finite"))
}

/// One month of growth on `balance` at `periodic_rate`, then `deposit`.
///
/// Overflow is reported as `InvalidInput` on `field`.
pub fn accrue(
    balance: Money,
    periodic_rate: Rate,
    deposit: Money,
    field: &str,
) -> MortgageResult<Money> {
    balance
        .checked_mul(Decimal::ONE + periodic_rate)
        .and_then(|grown| grown.checked_add(deposit))
        .ok_or_else(|| MortgageError::invalid(field, "portfolio value is not finite"))
}

/// Clamp `value` into `[lo, hi]`.
pub(crate) fn clamp(value: Decimal, lo: Decimal, hi: Decimal) -> Decimal {
    value.max(lo).min(hi)
}

/// Divide, returning zero when the denominator is zero.
pub(crate) fn ratio_or_zero(num: Decimal, den: Decimal) -> Decimal {
    if den.is_zero() {
        Decimal::ZERO
    } else {
        num / den
    }
}

pub(crate) const CENT: Decimal = dec!(0.01);
