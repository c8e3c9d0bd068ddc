use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::policies::{ExtraPayments, LumpSum, RegularPayments};
use super::schedule::{amortize, month_label, LoanTerms, PaymentRow};
use super::summary::{summarize_by_year, YearSummary};
use crate::error::MortgageError;
use crate::time_value::term_months;
use crate::types::{pct_to_rate, with_metadata, ComputationOutput, Money, Percent};
use crate::MortgageResult;

/// Loan inputs shared by the fixed-rate calculators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanParameters {
    /// Amount borrowed.
    pub principal: Money,
    /// Annual interest rate as a percentage (6.75 = 6.75%).
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub extra_monthly: Money,
    /// Posted on each loan anniversary month.
    #[serde(default)]
    pub extra_annual: Money,
    #[serde(default)]
    pub lump_sum: Money,
    /// Loan year whose final month receives the lump sum.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lump_sum_year: Option<u32>,
    /// First payment date, used only for row labels.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

impl LoanParameters {
    pub fn new(principal: Money, annual_rate_pct: Percent, term_years: u32) -> Self {
        LoanParameters {
            principal,
            annual_rate_pct,
            term_years,
            extra_monthly: Decimal::ZERO,
            extra_annual: Decimal::ZERO,
            lump_sum: Decimal::ZERO,
            lump_sum_year: None,
            start_date: None,
        }
    }

    /// Validated loan terms with the rate converted to a decimal.
    pub fn terms(&self) -> MortgageResult<LoanTerms> {
        if self.principal <= Decimal::ZERO {
            return Err(MortgageError::invalid(
                "principal",
                "Loan principal must be positive",
            ));
        }
        if self.annual_rate_pct < Decimal::ZERO {
            return Err(MortgageError::invalid(
                "annual_rate_pct",
                "Interest rate cannot be negative",
            ));
        }
        Ok(LoanTerms {
            principal: self.principal,
            annual_rate: pct_to_rate(self.annual_rate_pct),
            term_months: term_months(self.term_years)?,
            start_date: self.start_date,
        })
    }

    /// Validated extra-payment policy.
    pub fn extra_payments(&self) -> MortgageResult<ExtraPayments> {
        for (field, value) in [
            ("extra_monthly", self.extra_monthly),
            ("extra_annual", self.extra_annual),
            ("lump_sum", self.lump_sum),
        ] {
            if value < Decimal::ZERO {
                return Err(MortgageError::invalid(field, "Amount cannot be negative"));
            }
        }
        Ok(ExtraPayments {
            monthly: self.extra_monthly,
            annual: self.extra_annual,
            lump_sum: self.lump_sum_event()?,
        })
    }

    /// The lump sum, if one is configured.
    pub fn lump_sum_event(&self) -> MortgageResult<Option<LumpSum>> {
        if self.lump_sum <= Decimal::ZERO {
            return Ok(None);
        }
        match self.lump_sum_year {
            Some(year) if year >= 1 && year <= self.term_years => {
                Ok(Some(LumpSum::in_year(year, self.lump_sum)))
            }
            Some(_) => Err(MortgageError::invalid(
                "lump_sum_year",
                "Lump sum year must fall within the loan term",
            )),
            None => Err(MortgageError::invalid(
                "lump_sum_year",
                "A lump sum requires the year it is paid",
            )),
        }
    }
}

/// Savings relative to the same loan without any extra payments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaselineComparison {
    pub total_interest: Money,
    pub payoff_months: u32,
    pub interest_saved: Money,
    pub months_saved: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AmortizationOutput {
    /// Scheduled principal-and-interest payment.
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_principal: Money,
    pub total_extra: Money,
    pub total_paid: Money,
    pub payoff_months: u32,
    pub payoff_label: String,
    pub yearly_summary: Vec<YearSummary>,
    pub schedule: Vec<PaymentRow>,
    /// Present when extra payments were supplied.
    pub baseline: Option<BaselineComparison>,
}

/// Fixed-rate amortization schedule, with a no-extra baseline when any extra
/// payment is configured.
pub fn calculate_amortization(
    input: &LoanParameters,
) -> MortgageResult<ComputationOutput<AmortizationOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let terms = input.terms()?;
    let extra = input.extra_payments()?;

    if terms.annual_rate.is_zero() {
        warnings.push("Zero interest rate: payment is principal divided by number of payments".into());
    }

    let schedule = amortize(&terms, extra.clone())?;

    if extra.monthly > schedule.initial_payment {
        warnings.push(format!(
            "Extra monthly payment {} exceeds the scheduled payment {}",
            extra.monthly,
            schedule.initial_payment.round_dp(2)
        ));
    }

    let baseline = if extra.is_empty() {
        None
    } else {
        let base = amortize(&terms, RegularPayments)?;
        Some(BaselineComparison {
            total_interest: base.total_interest,
            payoff_months: base.payoff_months,
            interest_saved: base.total_interest - schedule.total_interest,
            months_saved: base.payoff_months.saturating_sub(schedule.payoff_months),
        })
    };

    if let Some(ref b) = baseline {
        if b.interest_saved < dec!(0) {
            warnings.push("Extra payments did not reduce total interest".into());
        }
    }

    let output = AmortizationOutput {
        monthly_payment: schedule.initial_payment,
        total_interest: schedule.total_interest,
        total_principal: schedule.total_principal,
        total_extra: schedule.total_extra,
        total_paid: schedule.total_paid,
        payoff_months: schedule.payoff_months,
        payoff_label: month_label(terms.start_date, schedule.payoff_months),
        yearly_summary: summarize_by_year(&schedule.rows),
        schedule: schedule.rows,
        baseline,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Fixed-rate level-payment amortization",
        input,
        warnings,
        elapsed,
        output,
    ))
}
