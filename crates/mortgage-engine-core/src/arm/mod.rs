pub mod rate_path;

pub use rate_path::{simulate_arm, ArmInput, ArmOutput, RateCapPolicy, RatePath, RateReset};
