use serde_json::Value;
use std::io;

use super::{is_report, payload, primary_rows, raw_value};

/// Row arrays exported in preference to a field/value listing.
const ROW_KEYS: &[&str] = &["schedule", "chart_data", "bands", "scenarios"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let source = if is_report(value) { value } else { payload(value) };
    if let Some((_, rows)) = primary_rows(source, ROW_KEYS) {
        write_rows(&mut wtr, rows);
    } else if let Some(map) = source.as_object() {
        let _ = wtr.write_record(["field", "value"]);
        let fields = map
            .get("details")
            .and_then(Value::as_object)
            .unwrap_or(map);
        for (key, val) in fields {
            if !val.is_array() && !val.is_object() {
                let _ = wtr.write_record([key.as_str(), &raw_value(val)]);
            }
        }
    } else {
        let _ = wtr.write_record([&raw_value(source)]);
    }

    let _ = wtr.flush();
}

fn write_rows<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[Value]) {
    let Some(Value::Object(first)) = rows.first() else {
        return;
    };
    let headers: Vec<&str> = first
        .iter()
        .filter(|(_, v)| !v.is_array() && !v.is_object())
        .map(|(k, _)| k.as_str())
        .collect();
    let _ = wtr.write_record(&headers);

    for item in rows {
        if let Value::Object(map) = item {
            let row: Vec<String> = headers
                .iter()
                .map(|h| map.get(*h).map(raw_value).unwrap_or_default())
                .collect();
            let _ = wtr.write_record(&row);
        }
    }
}
