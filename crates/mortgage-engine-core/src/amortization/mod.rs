pub mod loan;
pub mod policies;
pub mod schedule;
pub mod summary;

pub use loan::{calculate_amortization, AmortizationOutput, BaselineComparison, LoanParameters};
pub use policies::{ExtraPayments, LumpSum, LumpSumRecast, RegularPayments};
pub use schedule::{amortize, LoanState, LoanTerms, PaymentPolicy, PaymentRow, Schedule};
pub use summary::{summarize_by_year, year_totals, YearSummary};
