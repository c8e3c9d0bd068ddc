pub mod affordability;
pub mod amortize;
pub mod arm;
pub mod fees;
pub mod piti;
pub mod prepayment;
pub mod rent_vs_buy;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;

use mortgage_engine_core::{ComputationOutput, ToReport};

use crate::input;

pub type CommandResult = Result<Value, Box<dyn Error>>;

/// Input record from `--input`, else piped stdin, else built from flags.
pub fn resolve_input<T, F>(path: Option<&str>, from_flags: F) -> Result<T, Box<dyn Error>>
where
    T: DeserializeOwned,
    F: FnOnce() -> Result<T, Box<dyn Error>>,
{
    if let Some(path) = path {
        log::debug!("reading input from {}", path);
        input::file::read_json(path)
    } else if let Some(data) = input::stdin::read_stdin()? {
        log::debug!("reading input from stdin");
        Ok(serde_json::from_value(data)?)
    } else {
        from_flags()
    }
}

/// A flag that must be present when no input file or stdin is given.
pub fn required<T>(value: Option<T>, flag: &str) -> Result<T, Box<dyn Error>> {
    value.ok_or_else(|| format!("--{flag} is required (or provide --input)").into())
}

/// The full envelope, or its presentation report with `--report`.
pub fn render<T: Serialize + ToReport>(output: ComputationOutput<T>, report: bool) -> CommandResult {
    if report {
        Ok(serde_json::to_value(output.to_report()?)?)
    } else {
        Ok(serde_json::to_value(output)?)
    }
}
