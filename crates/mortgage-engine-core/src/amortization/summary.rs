use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::schedule::PaymentRow;
use crate::time_value::MONTHS_PER_YEAR;
use crate::types::Money;

/// Per-loan-year aggregate of payment rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearSummary {
    pub year: u32,
    pub total_payment: Money,
    /// Scheduled plus extra principal.
    pub total_principal: Money,
    pub total_interest: Money,
    pub total_extra: Money,
    pub ending_balance: Money,
}

impl YearSummary {
    fn opening(year: u32) -> Self {
        YearSummary {
            year,
            total_payment: Decimal::ZERO,
            total_principal: Decimal::ZERO,
            total_interest: Decimal::ZERO,
            total_extra: Decimal::ZERO,
            ending_balance: Decimal::ZERO,
        }
    }

    fn add(&mut self, row: &PaymentRow) {
        self.total_payment += row.total_payment;
        self.total_principal += row.principal + row.extra;
        self.total_interest += row.interest;
        self.total_extra += row.extra;
        self.ending_balance = row.balance;
    }
}

fn loan_year(month: u32) -> u32 {
    month.saturating_sub(1) / MONTHS_PER_YEAR + 1
}

/// Group rows into loan years (months 1–12 are year 1). A trailing partial
/// year is kept.
pub fn summarize_by_year(rows: &[PaymentRow]) -> Vec<YearSummary> {
    let mut years: Vec<YearSummary> = Vec::new();
    for row in rows {
        let year = loan_year(row.month);
        match years.last_mut() {
            Some(current) if current.year == year => current.add(row),
            _ => {
                let mut summary = YearSummary::opening(year);
                summary.add(row);
                years.push(summary);
            }
        }
    }
    years
}

/// Totals for loan year `year` (1-based), or `None` if no payment fell in it.
pub fn year_totals(rows: &[PaymentRow], year: u32) -> Option<YearSummary> {
    if year == 0 {
        return None;
    }
    let mut totals: Option<YearSummary> = None;
    for row in rows.iter().filter(|r| loan_year(r.month) == year) {
        totals.get_or_insert_with(|| YearSummary::opening(year)).add(row);
    }
    totals
}
