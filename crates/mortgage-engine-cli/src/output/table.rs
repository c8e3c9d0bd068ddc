use colored::Colorize;
use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{display_value, is_report, payload};

/// Row arrays printed as their own tables; anything longer is summarized.
const NESTED_TABLES: &[&str] = &["yearly_summary", "scenarios", "bands", "resets", "chart_data"];
const MAX_ROWS: usize = 40;

/// Format output as tables using the tabled crate.
pub fn print_table(value: &Value) {
    if is_report(value) {
        print_report(value);
        return;
    }

    match payload(value) {
        Value::Object(result) => {
            print_fields(result);
            for key in NESTED_TABLES {
                if let Some(Value::Array(rows)) = result.get(*key) {
                    println!("\n{}", key.bold());
                    print_rows(rows);
                }
            }
            if let Some(Value::Array(rows)) = result.get("schedule") {
                println!(
                    "\n{} payment rows omitted; use --output csv for the full schedule",
                    rows.len()
                );
            }
        }
        other => println!("{}", display_value(other)),
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\n{}", "Warnings:".yellow().bold());
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_report(report: &Value) {
    if let Some(summary) = report.get("summary").and_then(Value::as_str) {
        println!("{}\n", summary.bold());
    }
    if let Some(Value::Object(details)) = report.get("details") {
        print_fields(details);
    }
    if let Some(Value::Array(rows)) = report.get("chart_data") {
        println!();
        print_rows(rows);
    }
    if let Some(Value::Array(insights)) = report.get("insights") {
        println!();
        for line in insights.iter().filter_map(Value::as_str) {
            println!("  * {}", line);
        }
    }
}

/// Scalar fields as a two-column table; nested objects are flattened one level.
fn print_fields(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        match val {
            Value::Array(_) => continue,
            Value::Object(inner) => {
                for (k, v) in inner {
                    if !v.is_array() && !v.is_object() {
                        builder.push_record([format!("{key}.{k}"), display_value(v)]);
                    }
                }
            }
            _ => builder.push_record([key.clone(), display_value(val)]),
        }
    }
    println!("{}", Table::from(builder));
}

fn print_rows(rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        println!("(empty)");
        return;
    };
    let headers: Vec<String> = first
        .iter()
        .filter(|(_, v)| !v.is_array() && !v.is_object())
        .map(|(k, _)| k.clone())
        .collect();

    let mut builder = Builder::default();
    builder.push_record(headers.clone());
    for item in rows.iter().take(MAX_ROWS) {
        if let Value::Object(map) = item {
            builder.push_record(
                headers
                    .iter()
                    .map(|h| map.get(h).map(display_value).unwrap_or_default()),
            );
        }
    }
    println!("{}", Table::from(builder));
    if rows.len() > MAX_ROWS {
        println!("... {} more rows", rows.len() - MAX_ROWS);
    }
}
