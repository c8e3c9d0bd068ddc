pub mod projection;

pub use projection::{
    calculate_rent_vs_buy, project_scenario, AppreciationScenario, RentVsBuyInput,
    RentVsBuyOutput, ScenarioProjection, YearProjection,
};
