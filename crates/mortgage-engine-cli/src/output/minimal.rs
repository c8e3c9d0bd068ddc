use serde_json::Value;

use super::{display_value, is_report, payload};

/// Key answer per calculator, in priority order. Dotted keys reach one level down.
const PRIORITY_KEYS: &[&str] = &[
    "monthly_payment",
    "initial_payment",
    "breakdown.total_monthly",
    "monthly_payment_with_pmi",
    "first_year_monthly_mip",
    "funding_fee",
    "best",
];

/// Print just the headline figure.
pub fn print_minimal(value: &Value) {
    if is_report(value) {
        if let Some(summary) = value.get("summary").and_then(Value::as_str) {
            println!("{}", summary);
            return;
        }
    }

    let result = payload(value);

    // Affordability and rent vs. buy answer per band / scenario.
    if let Some(Value::Array(bands)) = result.get("bands") {
        for band in bands {
            println!(
                "{}: {}",
                band.get("label").map(display_value).unwrap_or_default(),
                band.get("max_price").map(display_value).unwrap_or_default()
            );
        }
        return;
    }
    if let Some(Value::Array(scenarios)) = result.get("scenarios") {
        if scenarios.iter().any(|s| s.get("crossover_year").is_some()) {
            for s in scenarios {
                let year = s
                    .get("crossover_year")
                    .filter(|v| !v.is_null())
                    .map(display_value)
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{}: {}",
                    s.get("scenario").map(display_value).unwrap_or_default(),
                    year
                );
            }
            return;
        }
    }

    for key in PRIORITY_KEYS {
        let found = key
            .split('.')
            .try_fold(result, |v, part| v.get(part))
            .filter(|v| !v.is_null());
        if let Some(val) = found {
            println!("{}", display_value(val));
            return;
        }
    }

    match result.as_object().and_then(|m| m.iter().next()) {
        Some((key, val)) => println!("{}: {}", key, display_value(val)),
        None => println!("{}", display_value(result)),
    }
}
