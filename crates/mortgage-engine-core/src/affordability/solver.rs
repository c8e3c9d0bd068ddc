//! Maximum affordable home price per debt-to-income band.
//!
//! For each band the solver bisects on price until the bracket is narrower
//! than [`PRICE_TOLERANCE`]. Correctness depends on total monthly cost being
//! non-decreasing in price; a violation is reported as `DivergentSearch`.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::MortgageError;
use crate::housing_cost::{CostModel, HousingCostBreakdown};
use crate::time_value::{ratio_or_zero, term_months, MONTHS_PER_YEAR};
use crate::types::{pct_to_rate, rate_to_pct, with_metadata, ComputationOutput, Money, Percent};
use crate::MortgageResult;

/// Search stops once `hi - lo` is below this.
pub const PRICE_TOLERANCE: Money = dec!(100);
const MAX_BISECTION_ITER: u32 = 200;
const MAX_CEILING_DOUBLINGS: u32 = 40;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtiBand {
    pub label: String,
    pub dti_pct: Percent,
}

impl DtiBand {
    pub fn new(label: &str, dti_pct: Percent) -> Self {
        DtiBand {
            label: label.to_string(),
            dti_pct,
        }
    }
}

fn default_bands() -> Vec<DtiBand> {
    vec![
        DtiBand::new("Conservative", dec!(28)),
        DtiBand::new("Moderate", dec!(36)),
        DtiBand::new("Aggressive", dec!(43)),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityInput {
    pub annual_income: Money,
    /// Existing monthly debt payments (car, student loans, cards).
    #[serde(default)]
    pub monthly_debts: Money,
    pub down_payment: Money,
    pub annual_rate_pct: Percent,
    pub term_years: u32,
    #[serde(default)]
    pub property_tax_rate_pct: Percent,
    #[serde(default)]
    pub annual_insurance: Money,
    #[serde(default)]
    pub monthly_hoa: Money,
    /// Enables PMI above 80% LTV.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_score: Option<u32>,
    #[serde(default = "default_bands")]
    pub bands: Vec<DtiBand>,
    /// Upper end of the price search; derived from income when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_ceiling: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityBand {
    pub label: String,
    pub dti_threshold_pct: Percent,
    /// Monthly budget for housing: `income × DTI − debts`.
    pub monthly_budget: Money,
    pub max_price: Money,
    pub loan_amount: Money,
    /// Total monthly housing payment at `max_price`, HOA included.
    pub max_payment: Money,
    pub cost: HousingCostBreakdown,
    /// `(housing payment + debts) / gross monthly income`.
    pub implied_dti_pct: Percent,
    pub iterations: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AffordabilityOutput {
    pub monthly_income: Money,
    pub bands: Vec<AffordabilityBand>,
}

/// Result of one bisection.
#[derive(Debug, Clone)]
pub struct SolvedPrice {
    pub price: Money,
    pub cost: HousingCostBreakdown,
    pub iterations: u32,
}

/// Bracketing limits for the price bisection.
#[derive(Debug, Clone, Copy)]
pub struct PriceSearch {
    pub tolerance: Money,
    pub max_iterations: u32,
    pub max_doublings: u32,
}

impl Default for PriceSearch {
    fn default() -> Self {
        PriceSearch {
            tolerance: PRICE_TOLERANCE,
            max_iterations: MAX_BISECTION_ITER,
            max_doublings: MAX_CEILING_DOUBLINGS,
        }
    }
}

impl PriceSearch {
    /// Largest price in `[floor, ceiling]` (the ceiling doubles while it is
    /// still affordable) whose `cost` fits `budget`, with the iteration count.
    ///
    /// Returns `None` when even `floor` does not fit. `cost` must be
    /// non-decreasing in price.
    pub fn max_price<F>(
        &self,
        floor: Money,
        budget: Money,
        ceiling: Money,
        mut cost: F,
    ) -> MortgageResult<Option<(Money, u32)>>
    where
        F: FnMut(Money) -> MortgageResult<Money>,
    {
        let mut lo = floor;
        let mut cost_lo = cost(lo)?;
        if cost_lo > budget {
            return Ok(None);
        }

        let mut hi = ceiling.max(lo + self.tolerance);
        let mut cost_hi = cost(hi)?;
        let mut doublings = 0;
        while cost_hi <= budget {
            if doublings == self.max_doublings {
                return Err(MortgageError::DivergentSearch {
                    function: "solve_max_price".into(),
                    iterations: doublings,
                    reason: format!("no price up to {} exceeds the budget", hi.round_dp(0)),
                });
            }
            lo = hi;
            cost_lo = cost_hi;
            hi = hi.checked_mul(dec!(2)).ok_or_else(|| {
                MortgageError::invalid("price_ceiling", "search ceiling is not finite")
            })?;
            cost_hi = cost(hi)?;
            doublings += 1;
        }

        let mut iterations = 0;
        while hi - lo >= self.tolerance {
            if iterations == self.max_iterations {
                return Err(MortgageError::DivergentSearch {
                    function: "solve_max_price".into(),
                    iterations,
                    reason: format!("bracket still {} wide", (hi - lo).round_dp(2)),
                });
            }
            iterations += 1;

            let mid = (lo + hi) / dec!(2);
            let cost_mid = cost(mid)?;
            if cost_mid < cost_lo || cost_mid > cost_hi {
                return Err(MortgageError::DivergentSearch {
                    function: "solve_max_price".into(),
                    iterations,
                    reason: format!("monthly cost is not monotonic in price near {}", mid.round_dp(0)),
                });
            }
            if cost_mid <= budget {
                lo = mid;
                cost_lo = cost_mid;
            } else {
                hi = mid;
                cost_hi = cost_mid;
            }
        }

        log::debug!(
            "affordability search converged at {} after {} iterations",
            lo.round_dp(2),
            iterations
        );
        Ok(Some((lo, iterations)))
    }
}

/// Largest price in `[down_payment, ceiling]` whose monthly cost fits `budget`.
///
/// Returns `None` when even the floor price does not fit.
pub fn solve_max_price(
    model: &CostModel,
    down_payment: Money,
    budget: Money,
    ceiling: Money,
    warnings: &mut Vec<String>,
) -> MortgageResult<Option<SolvedPrice>> {
    let found = PriceSearch::default().max_price(down_payment, budget, ceiling, |price| {
        Ok(model.monthly_cost(price, down_payment, warnings)?.total_monthly)
    })?;
    match found {
        Some((price, iterations)) => Ok(Some(SolvedPrice {
            price,
            cost: model.monthly_cost(price, down_payment, warnings)?,
            iterations,
        })),
        None => Ok(None),
    }
}

/// Solve the maximum home price for every DTI band independently.
pub fn calculate_affordability(
    input: &AffordabilityInput,
) -> MortgageResult<ComputationOutput<AffordabilityOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    validate_affordability(input)?;

    let monthly_income = input.annual_income / Decimal::from(MONTHS_PER_YEAR);
    let model = CostModel {
        annual_rate: pct_to_rate(input.annual_rate_pct),
        term_months: term_months(input.term_years)?,
        property_tax_rate: pct_to_rate(input.property_tax_rate_pct),
        annual_insurance: input.annual_insurance,
        monthly_hoa: input.monthly_hoa,
        pmi_credit_score: input.credit_score,
    };
    let ceiling = input
        .price_ceiling
        .unwrap_or(input.down_payment + input.annual_income * dec!(10));

    let mut bands = Vec::with_capacity(input.bands.len());
    for band in &input.bands {
        let budget = monthly_income * pct_to_rate(band.dti_pct) - input.monthly_debts;
        let mut band_warnings = Vec::new();
        let solved =
            solve_max_price(&model, input.down_payment, budget, ceiling, &mut band_warnings)?;
        for w in band_warnings {
            if !warnings.contains(&w) {
                warnings.push(w);
            }
        }

        let result = match solved {
            Some(s) => s,
            None => {
                warnings.push(format!(
                    "{} band: existing debts and fixed costs exceed the {}% DTI budget",
                    band.label, band.dti_pct
                ));
                SolvedPrice {
                    price: Decimal::ZERO,
                    cost: HousingCostBreakdown {
                        loan_amount: Decimal::ZERO,
                        ltv_pct: Decimal::ZERO,
                        principal_interest: Decimal::ZERO,
                        property_tax: Decimal::ZERO,
                        insurance: Decimal::ZERO,
                        pmi: Decimal::ZERO,
                        hoa: Decimal::ZERO,
                        total_monthly: Decimal::ZERO,
                    },
                    iterations: 0,
                }
            }
        };

        let housing = result.cost.total_monthly;
        bands.push(AffordabilityBand {
            label: band.label.clone(),
            dti_threshold_pct: band.dti_pct,
            monthly_budget: budget,
            max_price: result.price,
            loan_amount: result.cost.loan_amount,
            max_payment: housing,
            implied_dti_pct: rate_to_pct(ratio_or_zero(
                housing + input.monthly_debts,
                monthly_income,
            )),
            cost: result.cost,
            iterations: result.iterations,
        });
    }

    let output = AffordabilityOutput {
        monthly_income,
        bands,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Bisection on home price against DTI housing budget",
        input,
        warnings,
        elapsed,
        output,
    ))
}

fn validate_affordability(input: &AffordabilityInput) -> MortgageResult<()> {
    if input.annual_income <= Decimal::ZERO {
        return Err(MortgageError::invalid(
            "annual_income",
            "Income must be positive",
        ));
    }
    term_months(input.term_years)?;
    if input.annual_rate_pct < Decimal::ZERO {
        return Err(MortgageError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    for (field, value) in [
        ("monthly_debts", input.monthly_debts),
        ("down_payment", input.down_payment),
        ("property_tax_rate_pct", input.property_tax_rate_pct),
        ("annual_insurance", input.annual_insurance),
        ("monthly_hoa", input.monthly_hoa),
    ] {
        if value < Decimal::ZERO {
            return Err(MortgageError::invalid(field, "Value cannot be negative"));
        }
    }
    if input.bands.is_empty() {
        return Err(MortgageError::invalid("bands", "At least one DTI band is required"));
    }
    for band in &input.bands {
        if band.dti_pct <= Decimal::ZERO || band.dti_pct > dec!(100) {
            return Err(MortgageError::invalid(
                "bands",
                format!("DTI for {} must be within (0, 100]", band.label),
            ));
        }
    }
    if let Some(ceiling) = input.price_ceiling {
        if ceiling <= input.down_payment {
            return Err(MortgageError::invalid(
                "price_ceiling",
                "Search ceiling must exceed the down payment",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> AffordabilityInput {
        AffordabilityInput {
            annual_income: dec!(120_000),
            monthly_debts: dec!(500),
            down_payment: dec!(60_000),
            annual_rate_pct: dec!(6.5),
            term_years: 30,
            property_tax_rate_pct: dec!(1.1),
            annual_insurance: dec!(1500),
            monthly_hoa: dec!(0),
            credit_score: Some(740),
            bands: default_bands(),
            price_ceiling: None,
        }
    }

    #[test]
    fn test_three_default_bands_ordered() {
        let out = calculate_affordability(&input()).unwrap().result;
        assert_eq!(out.bands.len(), 3);
        assert!(out.bands[0].max_price < out.bands[1].max_price);
        assert!(out.bands[1].max_price < out.bands[2].max_price);
    }

    #[test]
    fn test_implied_dti_within_threshold() {
        let out = calculate_affordability(&input()).unwrap().result;
        for band in &out.bands {
            assert!(band.implied_dti_pct <= band.dti_threshold_pct + dec!(0.0001));
            // Within one tolerance step of the budget.
            assert!(band.monthly_budget - band.max_payment < dec!(5));
        }
    }

    #[test]
    fn test_debts_exceeding_budget_give_zero() {
        let mut i = input();
        i.monthly_debts = dec!(4000);
        let out = calculate_affordability(&i).unwrap();
        assert_eq!(out.result.bands[0].max_price, Decimal::ZERO);
        assert!(!out.warnings.is_empty());
    }

    #[test]
    fn test_small_ceiling_expands() {
        let mut i = input();
        i.price_ceiling = Some(dec!(70_000));
        let capped = calculate_affordability(&i).unwrap().result;
        let free = calculate_affordability(&input()).unwrap().result;
        let diff = (capped.bands[1].max_price - free.bands[1].max_price).abs();
        assert!(diff < PRICE_TOLERANCE);
    }

    #[test]
    fn test_search_across_pmi_cliff() {
        // PMI starts above 80% LTV, i.e. prices over 250k here.
        let model = CostModel {
            annual_rate: dec!(0.065),
            term_months: 360,
            property_tax_rate: Decimal::ZERO,
            annual_insurance: Decimal::ZERO,
            monthly_hoa: Decimal::ZERO,
            pmi_credit_score: Some(700),
        };
        let mut w = Vec::new();
        let solved = solve_max_price(&model, dec!(50_000), dec!(1500), dec!(100_000), &mut w)
            .unwrap()
            .unwrap();
        assert!(solved.cost.total_monthly <= dec!(1500));
    }

    #[test]
    fn test_invalid_band_rejected() {
        let mut i = input();
        i.bands = vec![DtiBand::new("Broken", dec!(0))];
        assert!(calculate_affordability(&i).is_err());
    }

    fn linear_cost(price: Money) -> MortgageResult<Money> {
        Ok(price / dec!(100))
    }

    #[test]
    fn test_price_search_converges_on_linear_cost() {
        let (price, iterations) = PriceSearch::default()
            .max_price(Decimal::ZERO, dec!(2_000), dec!(1_000_000), linear_cost)
            .unwrap()
            .unwrap();
        assert!(dec!(200_000) - price < PRICE_TOLERANCE);
        assert!(price <= dec!(200_000));
        assert!(iterations > 0);
    }

    #[test]
    fn test_price_search_floor_over_budget() {
        let found = PriceSearch::default()
            .max_price(dec!(500_000), dec!(2_000), dec!(1_000_000), linear_cost)
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_price_search_unbounded_cost_diverges() {
        let search = PriceSearch {
            max_doublings: 3,
            ..PriceSearch::default()
        };
        let err = search
            .max_price(Decimal::ZERO, dec!(2_000), dec!(1_000), |_| Ok(Decimal::ZERO))
            .unwrap_err();
        match err {
            MortgageError::DivergentSearch { iterations, .. } => assert_eq!(iterations, 3),
            other => panic!("expected DivergentSearch, got {other:?}"),
        }
    }

    #[test]
    fn test_price_search_iteration_cap() {
        let search = PriceSearch {
            max_iterations: 2,
            ..PriceSearch::default()
        };
        let err = search
            .max_price(Decimal::ZERO, dec!(2_000), dec!(1_000_000), linear_cost)
            .unwrap_err();
        match err {
            MortgageError::DivergentSearch { iterations, .. } => assert_eq!(iterations, 2),
            other => panic!("expected DivergentSearch, got {other:?}"),
        }
    }

    #[test]
    fn test_price_search_rejects_non_monotonic_cost() {
        // Spike at the first midpoint: dearer than the ceiling price.
        let spiky = |price: Money| -> MortgageResult<Money> {
            if price == dec!(500_000) {
                Ok(dec!(20_000))
            } else {
                linear_cost(price)
            }
        };
        let err = PriceSearch::default()
            .max_price(Decimal::ZERO, dec!(8_000), dec!(1_000_000), spiky)
            .unwrap_err();
        match err {
            MortgageError::DivergentSearch { iterations, reason, .. } => {
                assert_eq!(iterations, 1);
                assert!(reason.contains("not monotonic"));
            }
            other => panic!("expected DivergentSearch, got {other:?}"),
        }
    }
}
