pub mod amortization;
pub mod error;
pub mod fees;
pub mod housing_cost;
pub mod report;
pub mod time_value;
pub mod types;

#[cfg(feature = "arm")]
pub mod arm;

#[cfg(feature = "prepayment")]
pub mod prepayment;

#[cfg(feature = "affordability")]
pub mod affordability;

#[cfg(feature = "rent_vs_buy")]
pub mod rent_vs_buy;

pub use error::MortgageError;
pub use report::{CalculatorReport, DetailValue, ToReport};
pub use types::*;

/// Standard result type for all mortgage-engine operations
pub type MortgageResult<T> = Result<T, MortgageError>;
