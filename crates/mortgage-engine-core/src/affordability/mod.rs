pub mod solver;

pub use solver::{
    calculate_affordability, solve_max_price, AffordabilityBand, AffordabilityInput,
    AffordabilityOutput, DtiBand, PriceSearch,
};
