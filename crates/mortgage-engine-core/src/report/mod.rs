//! Result packaging: every calculator output reduces to one presentation
//! contract, `{summary, details, chart_data?, insights}`.
//!
//! Money is rounded to cents and percentages to three places only here; the
//! calculators themselves carry full precision.

mod calculators;

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::{ComputationOutput, Money, Percent};
use crate::MortgageResult;

/// A single `details` entry: a number or a display string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetailValue {
    Number(#[serde(with = "rust_decimal::serde::float")] Decimal),
    Text(String),
}

impl From<Decimal> for DetailValue {
    fn from(v: Decimal) -> Self {
        DetailValue::Number(v)
    }
}

impl From<u32> for DetailValue {
    fn from(v: u32) -> Self {
        DetailValue::Number(Decimal::from(v))
    }
}

impl From<&str> for DetailValue {
    fn from(v: &str) -> Self {
        DetailValue::Text(v.to_string())
    }
}

impl From<String> for DetailValue {
    fn from(v: String) -> Self {
        DetailValue::Text(v)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculatorReport {
    pub summary: String,
    pub details: BTreeMap<String, DetailValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chart_data: Option<Vec<serde_json::Value>>,
    pub insights: Vec<String>,
}

/// Conversion of a calculator result into a [`CalculatorReport`].
pub trait ToReport {
    fn to_report(&self) -> MortgageResult<CalculatorReport>;
}

/// Warnings raised during the calculation are surfaced as trailing insights.
impl<T: ToReport + Serialize> ToReport for ComputationOutput<T> {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        let mut report = self.result.to_report()?;
        report.insights.extend(self.warnings.iter().cloned());
        Ok(report)
    }
}

/// Incremental construction of a report with consistent rounding.
pub struct ReportBuilder {
    report: CalculatorReport,
}

impl ReportBuilder {
    pub fn new(summary: impl Into<String>) -> Self {
        ReportBuilder {
            report: CalculatorReport {
                summary: summary.into(),
                details: BTreeMap::new(),
                chart_data: None,
                insights: Vec::new(),
            },
        }
    }

    pub fn money(mut self, key: &str, value: Money) -> Self {
        self.report
            .details
            .insert(key.to_string(), DetailValue::Number(value.round_dp(2)));
        self
    }

    pub fn percent(mut self, key: &str, value: Percent) -> Self {
        self.report
            .details
            .insert(key.to_string(), DetailValue::Number(value.round_dp(3)));
        self
    }

    pub fn count(mut self, key: &str, value: u32) -> Self {
        self.report.details.insert(key.to_string(), value.into());
        self
    }

    pub fn text(mut self, key: &str, value: impl Into<String>) -> Self {
        self.report
            .details
            .insert(key.to_string(), DetailValue::Text(value.into()));
        self
    }

    pub fn insight(mut self, line: impl Into<String>) -> Self {
        self.report.insights.push(line.into());
        self
    }

    pub fn insight_if(self, condition: bool, line: impl Into<String>) -> Self {
        if condition {
            self.insight(line)
        } else {
            self
        }
    }

    pub fn chart(mut self, rows: Vec<serde_json::Value>) -> Self {
        self.report.chart_data = Some(rows);
        self
    }

    pub fn build(self) -> CalculatorReport {
        self.report
    }
}

/// Chart cell for a monetary amount, as a JSON number rounded to cents.
pub(crate) fn chart_money(value: Money) -> serde_json::Value {
    serde_json::Value::from(value.round_dp(2).to_f64().unwrap_or_default())
}

/// Chart cell for a percentage, as a JSON number rounded to three places.
pub(crate) fn chart_pct(value: Percent) -> serde_json::Value {
    serde_json::Value::from(value.round_dp(3).to_f64().unwrap_or_default())
}

/// `$1,234,567.89`, with a leading minus for negatives.
pub fn format_money(value: Money) -> String {
    let rounded = value.round_dp(2).abs();
    let whole = rounded.trunc();
    let cents = ((rounded - whole) * Decimal::ONE_HUNDRED).round().to_u32().unwrap_or(0);
    let digits = whole.to_u128().unwrap_or(0).to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value.round_dp(2).is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents:02}")
}

/// `6.5%`, trimmed of trailing zeros.
pub fn format_pct(value: Percent) -> String {
    format!("{}%", value.round_dp(3).normalize())
}

/// `22 years 3 months` style duration.
pub fn format_months(months: u32) -> String {
    let (years, rest) = (months / 12, months % 12);
    match (years, rest) {
        (0, m) => format!("{m} months"),
        (y, 0) => format!("{y} years"),
        (y, m) => format!("{y} years {m} months"),
    }
}
