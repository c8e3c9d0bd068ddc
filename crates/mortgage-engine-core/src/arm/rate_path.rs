//! Adjustable-rate mortgage simulation.
//!
//! The rate is fixed for `fixed_period_years`, then resets every twelve
//! months toward `index + margin`, limited by the periodic and lifetime caps.
//! At each reset the current balance is re-amortized over the remaining term.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::amortization::{
    amortize, summarize_by_year, LoanState, LoanTerms, PaymentPolicy, PaymentRow,
    RegularPayments, YearSummary,
};
use crate::error::MortgageError;
use crate::time_value::{
    annuity_payment, monthly_rate, term_months, MAX_TERM_YEARS, MONTHS_PER_YEAR,
};
use crate::types::{pct_to_rate, rate_to_pct, with_metadata, ComputationOutput, Money, Percent, Rate};
use crate::MortgageResult;

/// Rate caps and index assumptions, all as percentages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateCapPolicy {
    pub initial_rate_pct: Percent,
    pub fixed_period_years: u32,
    /// Maximum increase at any single reset.
    pub periodic_cap_pct: Percent,
    /// Maximum increase over the initial rate for the life of the loan.
    pub lifetime_cap_pct: Percent,
    pub margin_pct: Percent,
    pub assumed_index_rate_pct: Percent,
}

impl RateCapPolicy {
    /// `initial + lifetime cap`.
    pub fn ceiling_pct(&self) -> Percent {
        self.initial_rate_pct + self.lifetime_cap_pct
    }

    /// `index + margin`, before caps.
    pub fn fully_indexed_pct(&self) -> Percent {
        self.assumed_index_rate_pct + self.margin_pct
    }

    /// First month on the adjustable rate.
    pub fn first_reset_month(&self) -> u32 {
        self.fixed_period_years * MONTHS_PER_YEAR + 1
    }

    /// Rate after a reset from `current_pct`.
    pub fn next_rate_pct(&self, current_pct: Percent) -> Percent {
        self.fully_indexed_pct()
            .min(current_pct + self.periodic_cap_pct)
            .min(self.ceiling_pct())
            .max(Decimal::ZERO)
    }

    fn validate(&self) -> MortgageResult<()> {
        for (field, value) in [
            ("initial_rate_pct", self.initial_rate_pct),
            ("periodic_cap_pct", self.periodic_cap_pct),
            ("lifetime_cap_pct", self.lifetime_cap_pct),
            ("margin_pct", self.margin_pct),
            ("assumed_index_rate_pct", self.assumed_index_rate_pct),
        ] {
            if value < Decimal::ZERO {
                return Err(MortgageError::invalid(field, "Value cannot be negative"));
            }
        }
        if self.fixed_period_years > MAX_TERM_YEARS {
            return Err(MortgageError::invalid(
                "fixed_period_years",
                format!("Fixed period cannot exceed {MAX_TERM_YEARS} years"),
            ));
        }
        Ok(())
    }
}

/// A rate reset and the payment derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateReset {
    pub month: u32,
    pub previous_rate_pct: Percent,
    pub rate_pct: Percent,
    pub payment: Money,
    /// Balance carried into the reset month.
    pub balance: Money,
}

/// Payment policy that walks the capped rate path.
#[derive(Debug, Clone)]
pub struct RatePath {
    caps: RateCapPolicy,
    pub resets: Vec<RateReset>,
}

impl RatePath {
    pub fn new(caps: RateCapPolicy) -> Self {
        RatePath {
            caps,
            resets: Vec::new(),
        }
    }

    fn is_reset_month(&self, month: u32) -> bool {
        let first = self.caps.first_reset_month();
        month >= first && (month - first) % MONTHS_PER_YEAR == 0
    }
}

impl PaymentPolicy for RatePath {
    fn begin_month(&mut self, state: &mut LoanState) -> MortgageResult<()> {
        if !self.is_reset_month(state.month) {
            return Ok(());
        }
        let previous_rate_pct = rate_to_pct(state.annual_rate);
        let rate_pct = self.caps.next_rate_pct(previous_rate_pct);
        let new_rate: Rate = pct_to_rate(rate_pct);
        let payment = annuity_payment(
            state.balance,
            monthly_rate(new_rate),
            state.remaining_months,
        )?;

        log::debug!(
            "ARM reset month {}: {}% -> {}%, payment {}",
            state.month,
            previous_rate_pct,
            rate_pct,
            payment.round_dp(2)
        );

        state.annual_rate = new_rate;
        state.payment = payment;
        self.resets.push(RateReset {
            month: state.month,
            previous_rate_pct,
            rate_pct,
            payment,
            balance: state.balance,
        });
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmInput {
    pub principal: Money,
    pub term_years: u32,
    #[serde(flatten)]
    pub caps: RateCapPolicy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArmOutput {
    pub initial_payment: Money,
    pub fully_indexed_rate_pct: Percent,
    pub first_adjustment: Option<RateReset>,
    pub resets: Vec<RateReset>,
    pub max_rate_pct: Percent,
    pub max_payment: Money,
    /// `initial + lifetime cap` applied from month one.
    pub worst_case_rate_pct: Percent,
    pub worst_case_payment: Money,
    pub total_interest: Money,
    pub total_paid: Money,
    pub payoff_months: u32,
    /// Same loan held at the initial rate for the whole term.
    pub fixed_rate_total_interest: Money,
    pub interest_vs_fixed: Money,
    pub yearly_summary: Vec<YearSummary>,
    pub schedule: Vec<PaymentRow>,
}

/// Simulate the expected ARM rate path and its worst case.
pub fn simulate_arm(input: &ArmInput) -> MortgageResult<ComputationOutput<ArmOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    input.caps.validate()?;

    let terms = LoanTerms {
        principal: input.principal,
        annual_rate: pct_to_rate(input.caps.initial_rate_pct),
        term_months: term_months(input.term_years)?,
        start_date: input.start_date,
    };

    if input.caps.fixed_period_years >= input.term_years {
        warnings.push("Fixed period covers the whole term; the rate never adjusts".into());
    }
    if input.caps.fully_indexed_pct() > input.caps.ceiling_pct() {
        warnings.push(format!(
            "Fully indexed rate {}% exceeds the lifetime ceiling {}%",
            input.caps.fully_indexed_pct(),
            input.caps.ceiling_pct()
        ));
    }

    let mut path = RatePath::new(input.caps.clone());
    let schedule = amortize(&terms, &mut path)?;
    let fixed = amortize(&terms, RegularPayments)?;

    let worst_case_rate_pct = input.caps.ceiling_pct();
    let worst_case_payment = annuity_payment(
        input.principal,
        monthly_rate(pct_to_rate(worst_case_rate_pct)),
        terms.term_months,
    )?;

    let max_rate_pct = path
        .resets
        .iter()
        .map(|r| r.rate_pct)
        .fold(input.caps.initial_rate_pct, Decimal::max);
    let max_payment = path
        .resets
        .iter()
        .map(|r| r.payment)
        .fold(schedule.initial_payment, Decimal::max);

    if max_payment > schedule.initial_payment * dec!(1.25) {
        warnings.push(format!(
            "Payment rises more than 25% after adjustment (to {})",
            max_payment.round_dp(2)
        ));
    }

    let output = ArmOutput {
        initial_payment: schedule.initial_payment,
        fully_indexed_rate_pct: input.caps.fully_indexed_pct(),
        first_adjustment: path.resets.first().cloned(),
        max_rate_pct,
        max_payment,
        worst_case_rate_pct,
        worst_case_payment,
        total_interest: schedule.total_interest,
        total_paid: schedule.total_paid,
        payoff_months: schedule.payoff_months,
        fixed_rate_total_interest: fixed.total_interest,
        interest_vs_fixed: schedule.total_interest - fixed.total_interest,
        yearly_summary: summarize_by_year(&schedule.rows),
        resets: path.resets,
        schedule: schedule.rows,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Capped annual-reset ARM with re-amortization over remaining term",
        input,
        warnings,
        elapsed,
        output,
    ))
}
