pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use crate::OutputFormat;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// The calculator payload: `result` of an envelope, or the value itself
/// (reports have no envelope).
pub fn payload(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Whether the value is a calculator report rather than a raw result.
pub fn is_report(value: &Value) -> bool {
    value.get("summary").is_some() && value.get("details").is_some()
}

/// Display form of a scalar. Decimal strings are rounded to cents.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => match Decimal::from_str(s) {
            Ok(d) => d.round_dp(2).normalize().to_string(),
            Err(_) => s.clone(),
        },
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// Raw form of a scalar for machine-readable output.
pub fn raw_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}

/// First array of row objects worth tabulating, by key preference.
pub fn primary_rows<'a>(result: &'a Value, keys: &[&str]) -> Option<(&'a str, &'a Vec<Value>)> {
    let map = result.as_object()?;
    keys.iter().find_map(|k| {
        map.get_key_value(*k).and_then(|(name, v)| match v {
            Value::Array(rows) if rows.first().map_or(false, Value::is_object) => {
                Some((name.as_str(), rows))
            }
            _ => None,
        })
    })
}
