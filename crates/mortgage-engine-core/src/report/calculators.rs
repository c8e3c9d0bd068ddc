use rust_decimal::Decimal;
use serde_json::json;

use super::{
    chart_money, chart_pct, format_money, format_months, format_pct, CalculatorReport, ReportBuilder,
    ToReport,
};
use crate::amortization::{AmortizationOutput, YearSummary};
use crate::fees::fha::{FhaOutput, MipDuration};
use crate::fees::pmi::PmiOutput;
use crate::fees::va::VaOutput;
use crate::housing_cost::PitiOutput;
use crate::MortgageResult;

fn yearly_chart(years: &[YearSummary]) -> Vec<serde_json::Value> {
    years
        .iter()
        .map(|y| {
            json!({
                "year": y.year,
                "principal": chart_money(y.total_principal + y.total_extra),
                "interest": chart_money(y.total_interest),
                "balance": chart_money(y.ending_balance),
            })
        })
        .collect()
}

impl ToReport for AmortizationOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        let mut builder = ReportBuilder::new(format!(
            "Monthly payment of {} for {}",
            format_money(self.monthly_payment),
            format_months(self.payoff_months)
        ))
        .money("monthly_payment", self.monthly_payment)
        .money("total_interest", self.total_interest)
        .money("total_principal", self.total_principal)
        .money("total_extra", self.total_extra)
        .money("total_paid", self.total_paid)
        .count("payoff_months", self.payoff_months)
        .text("payoff_date", self.payoff_label.clone())
        .chart(yearly_chart(&self.yearly_summary));

        let interest_share = if self.total_paid.is_zero() {
            Decimal::ZERO
        } else {
            self.total_interest / self.total_paid * Decimal::ONE_HUNDRED
        };
        builder = builder.insight(format!(
            "Interest makes up {} of everything you pay",
            format_pct(interest_share.round_dp(1))
        ));

        if let Some(base) = &self.baseline {
            builder = builder
                .money("interest_saved", base.interest_saved)
                .count("months_saved", base.months_saved)
                .insight_if(
                    base.months_saved > 0,
                    format!(
                        "Extra payments save {} in interest and finish {} early",
                        format_money(base.interest_saved),
                        format_months(base.months_saved)
                    ),
                );
        }
        Ok(builder.build())
    }
}

impl ToReport for PitiOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        let b = &self.breakdown;
        let builder = ReportBuilder::new(format!(
            "Total monthly housing payment of {}",
            format_money(b.total_monthly)
        ))
        .money("loan_amount", b.loan_amount)
        .percent("ltv_pct", b.ltv_pct)
        .percent("down_payment_pct", self.down_payment_pct)
        .money("principal_interest", b.principal_interest)
        .money("property_tax", b.property_tax)
        .money("insurance", b.insurance)
        .money("pmi", b.pmi)
        .money("hoa", b.hoa)
        .money("total_monthly", b.total_monthly)
        .money("annual_housing_cost", self.annual_housing_cost)
        .chart(vec![
            json!({"component": "Principal & interest", "amount": chart_money(b.principal_interest)}),
            json!({"component": "Property tax", "amount": chart_money(b.property_tax)}),
            json!({"component": "Insurance", "amount": chart_money(b.insurance)}),
            json!({"component": "PMI", "amount": chart_money(b.pmi)}),
            json!({"component": "HOA", "amount": chart_money(b.hoa)}),
        ])
        .insight(format!(
            "Principal and interest is {} of the monthly payment",
            format_pct(self.principal_interest_share_pct.round_dp(1))
        ))
        .insight_if(
            b.pmi > Decimal::ZERO,
            "PMI applies until the loan falls to 80% of the purchase price",
        );
        Ok(builder.build())
    }
}

impl ToReport for PmiOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        if !self.pmi_required {
            return Ok(ReportBuilder::new("No PMI required at this down payment")
                .money("loan_amount", self.loan_amount)
                .percent("ltv_pct", self.ltv_pct)
                .money("monthly_principal_interest", self.monthly_principal_interest)
                .insight("Loan-to-value is at or below 80%")
                .build());
        }

        let mut builder = ReportBuilder::new(format!(
            "PMI of {} per month, {} in total",
            format_money(self.monthly_pmi),
            format_money(self.total_pmi_paid)
        ))
        .money("loan_amount", self.loan_amount)
        .percent("ltv_pct", self.ltv_pct)
        .percent("annual_pmi_rate_pct", self.annual_pmi_rate_pct)
        .money("monthly_pmi", self.monthly_pmi)
        .money("monthly_principal_interest", self.monthly_principal_interest)
        .money("monthly_payment_with_pmi", self.monthly_payment_with_pmi)
        .count("months_charged", self.months_charged)
        .money("total_pmi_paid", self.total_pmi_paid);

        if let Some(month) = self.cancellation_request_month {
            builder = builder.count("cancellation_request_month", month).insight(format!(
                "You can request cancellation after {} when LTV reaches 80%",
                format_months(month)
            ));
        }
        if let Some(month) = self.automatic_termination_month {
            builder = builder.count("automatic_termination_month", month).insight(format!(
                "PMI ends automatically after {}",
                format_months(month)
            ));
        }
        Ok(builder.build())
    }
}

impl ToReport for FhaOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        let duration = match self.mip_duration {
            MipDuration::Years(y) => format!("{y} years"),
            MipDuration::LifeOfLoan => "Life of loan".to_string(),
        };
        let builder = ReportBuilder::new(format!(
            "FHA payment of {} plus {} monthly MIP",
            format_money(self.monthly_principal_interest),
            format_money(self.first_year_monthly_mip)
        ))
        .money("base_loan_amount", self.base_loan_amount)
        .percent("down_payment_pct", self.down_payment_pct)
        .percent("minimum_down_payment_pct", self.minimum_down_payment_pct)
        .percent("ltv_pct", self.ltv_pct)
        .money("upfront_mip", self.upfront_mip)
        .money("total_loan_amount", self.total_loan_amount)
        .percent("annual_mip_rate_pct", self.annual_mip_rate_pct)
        .text("mip_duration", duration.clone())
        .count("mip_months", self.mip_months)
        .money("monthly_principal_interest", self.monthly_principal_interest)
        .money("first_year_monthly_mip", self.first_year_monthly_mip)
        .money("total_mip_paid", self.total_mip_paid)
        .money("total_interest", self.total_interest)
        .money("cash_due_at_closing", self.cash_due_at_closing)
        .insight(format!(
            "Upfront MIP of {} and annual MIP for {}",
            format_money(self.upfront_mip),
            duration.to_lowercase()
        ))
        .insight_if(
            self.mip_duration == MipDuration::LifeOfLoan,
            "Annual MIP only ends by refinancing into a conventional loan",
        );
        Ok(builder.build())
    }
}

impl ToReport for VaOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        let builder = ReportBuilder::new(format!(
            "VA funding fee of {} ({})",
            format_money(self.funding_fee),
            format_pct(self.funding_fee_rate_pct)
        ))
        .money("base_loan_amount", self.base_loan_amount)
        .percent("down_payment_pct", self.down_payment_pct)
        .percent("funding_fee_rate_pct", self.funding_fee_rate_pct)
        .money("funding_fee", self.funding_fee)
        .money("total_loan_amount", self.total_loan_amount)
        .money("monthly_principal_interest", self.monthly_principal_interest)
        .money("total_interest", self.total_interest)
        .money("cash_due_at_closing", self.cash_due_at_closing)
        .insight("VA loans carry no monthly mortgage insurance")
        .insight_if(
            self.funding_fee.is_zero(),
            "The funding fee is waived for this borrower",
        );
        Ok(builder.build())
    }
}

#[cfg(feature = "arm")]
impl ToReport for crate::arm::ArmOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        let mut builder = ReportBuilder::new(format!(
            "Initial payment of {}, up to {} at the lifetime cap",
            format_money(self.initial_payment),
            format_money(self.worst_case_payment)
        ))
        .money("initial_payment", self.initial_payment)
        .percent("fully_indexed_rate_pct", self.fully_indexed_rate_pct)
        .percent("max_rate_pct", self.max_rate_pct)
        .money("max_payment", self.max_payment)
        .percent("worst_case_rate_pct", self.worst_case_rate_pct)
        .money("worst_case_payment", self.worst_case_payment)
        .money("total_interest", self.total_interest)
        .money("total_paid", self.total_paid)
        .money("fixed_rate_total_interest", self.fixed_rate_total_interest)
        .money("interest_vs_fixed", self.interest_vs_fixed)
        .count("rate_resets", self.resets.len() as u32)
        .chart(
            self.yearly_summary
                .iter()
                .map(|y| {
                    let first_month = (y.year - 1) * 12 + 1;
                    let rate = self
                        .schedule
                        .iter()
                        .find(|r| r.month == first_month)
                        .map(|r| r.rate_pct)
                        .unwrap_or_default();
                    json!({
                        "year": y.year,
                        "rate_pct": chart_pct(rate),
                        "interest": chart_money(y.total_interest),
                        "balance": chart_money(y.ending_balance),
                    })
                })
                .collect(),
        );

        if let Some(first) = &self.first_adjustment {
            builder = builder.count("first_adjustment_month", first.month).insight(format!(
                "First adjustment in month {}: {} to {}, payment {}",
                first.month,
                format_pct(first.previous_rate_pct),
                format_pct(first.rate_pct),
                format_money(first.payment)
            ));
        }
        builder = builder.insight_if(
            self.interest_vs_fixed > Decimal::ZERO,
            format!(
                "Expected path costs {} more interest than staying at the initial rate",
                format_money(self.interest_vs_fixed)
            ),
        );
        Ok(builder.build())
    }
}

#[cfg(feature = "prepayment")]
impl ToReport for crate::prepayment::PrepaymentOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        let best = self.scenarios.iter().find(|s| s.strategy == self.best);
        let mut builder = ReportBuilder::new(match best {
            Some(s) => format!(
                "{} saves the most: {} in interest",
                s.label,
                format_money(s.interest_saved)
            ),
            None => "No prepayment strategy evaluated".to_string(),
        })
        .text("best_strategy", self.best.label())
        .chart(
            self.scenarios
                .iter()
                .map(|s| {
                    json!({
                        "strategy": s.label,
                        "total_interest": chart_money(s.total_interest),
                        "payoff_months": s.payoff_months,
                        "interest_saved": chart_money(s.interest_saved),
                    })
                })
                .collect(),
        );

        for s in &self.scenarios {
            let key = serde_json::to_value(s.strategy)?
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| s.label.clone());
            builder = builder
                .money(&format!("{key}_total_interest"), s.total_interest)
                .count(&format!("{key}_payoff_months"), s.payoff_months);
        }
        if let Some(payment) = self.recast_payment {
            builder = builder
                .money("recast_payment", payment)
                .insight(format!(
                    "Recasting lowers the payment to {}",
                    format_money(payment)
                ));
        }
        if let Some(inv) = &self.investment {
            builder = builder
                .money("investment_portfolio_value", inv.portfolio_value)
                .money("investment_advantage", inv.advantage)
                .insight(if inv.investing_wins {
                    format!(
                        "Investing at {} beats prepaying by {}",
                        format_pct(inv.assumed_return_pct),
                        format_money(inv.advantage)
                    )
                } else {
                    format!(
                        "Prepaying beats investing at {} by {}",
                        format_pct(inv.assumed_return_pct),
                        format_money(-inv.advantage)
                    )
                });
        }
        Ok(builder.build())
    }
}

#[cfg(feature = "affordability")]
impl ToReport for crate::affordability::AffordabilityOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        let headline = self
            .bands
            .iter()
            .max_by(|a, b| a.max_price.cmp(&b.max_price))
            .map(|b| format!("You can afford up to {}", format_money(b.max_price.round_dp(0))))
            .unwrap_or_else(|| "No DTI bands evaluated".to_string());

        let mut builder = ReportBuilder::new(headline)
            .money("monthly_income", self.monthly_income)
            .chart(
                self.bands
                    .iter()
                    .map(|b| {
                        json!({
                            "band": b.label,
                            "dti_pct": chart_pct(b.dti_threshold_pct),
                            "max_price": chart_money(b.max_price),
                            "monthly_payment": chart_money(b.max_payment),
                        })
                    })
                    .collect(),
            );
        for band in &self.bands {
            let key = band.label.to_lowercase().replace(' ', "_");
            builder = builder
                .money(&format!("{key}_max_price"), band.max_price)
                .money(&format!("{key}_monthly_payment"), band.max_payment)
                .percent(&format!("{key}_dti_pct"), band.implied_dti_pct)
                .insight(format!(
                    "{} ({}% DTI): up to {} at {} per month",
                    band.label,
                    band.dti_threshold_pct.normalize(),
                    format_money(band.max_price.round_dp(0)),
                    format_money(band.max_payment)
                ));
        }
        Ok(builder.build())
    }
}

#[cfg(feature = "rent_vs_buy")]
impl ToReport for crate::rent_vs_buy::RentVsBuyOutput {
    fn to_report(&self) -> MortgageResult<CalculatorReport> {
        use crate::rent_vs_buy::AppreciationScenario;

        let base = self.scenario(AppreciationScenario::Base);
        let summary = match base.and_then(|s| s.crossover_year) {
            Some(year) => format!("Buying pulls ahead of renting in year {year}"),
            None => "Renting stays ahead over the full horizon".to_string(),
        };
        let mut builder = ReportBuilder::new(summary)
            .money("loan_amount", self.loan_amount)
            .money("monthly_payment", self.monthly_payment)
            .money("closing_costs", self.closing_costs);

        for s in &self.scenarios {
            let key = serde_json::to_value(s.scenario)?
                .as_str()
                .map(str::to_string)
                .unwrap_or_default();
            builder = builder
                .text(
                    &format!("{key}_crossover_year"),
                    s.crossover_year
                        .map(|y| y.to_string())
                        .unwrap_or_else(|| "never".to_string()),
                )
                .money(&format!("{key}_buy_net_worth"), s.final_buy_net_worth)
                .money(&format!("{key}_rent_net_worth"), s.final_rent_net_worth)
                .insight(format!(
                    "{} ({} appreciation): {}",
                    s.scenario.label(),
                    format_pct(s.appreciation_pct),
                    match s.crossover_year {
                        Some(y) => format!("buying wins from year {y}"),
                        None => "buying never catches up".to_string(),
                    }
                ));
        }

        if let Some(base) = base {
            builder = builder.chart(
                base.years
                    .iter()
                    .map(|y| {
                        json!({
                            "year": y.year,
                            "home_value": chart_money(y.home_value),
                            "loan_balance": chart_money(y.loan_balance),
                            "equity": chart_money(y.equity),
                            "buy_net_worth": chart_money(y.buy_net_worth),
                            "rent_net_worth": chart_money(y.rent_net_worth),
                            "annual_rent": chart_money(y.annual_rent),
                            "annual_buy_cost": chart_money(y.annual_buy_cost),
                        })
                    })
                    .collect(),
            );
        }
        Ok(builder.build())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amortization::{calculate_amortization, LoanParameters};
    use crate::report::DetailValue;
    use rust_decimal_macros::dec;

    #[test]
    fn test_amortization_report_contract() {
        let params = LoanParameters::new(dec!(400_000), dec!(6.0), 30);
        let output = calculate_amortization(&params).unwrap();
        let report = output.to_report().unwrap();
        assert!(report.summary.contains("$2,398.20"));
        assert_eq!(
            report.details["payoff_months"],
            DetailValue::Number(dec!(360))
        );
        assert_eq!(report.chart_data.as_ref().map(Vec::len), Some(30));
        assert!(!report.insights.is_empty());
    }

    #[test]
    fn test_warnings_become_insights() {
        let params = LoanParameters::new(dec!(120_000), dec!(0), 10);
        let output = calculate_amortization(&params).unwrap();
        assert!(!output.warnings.is_empty());
        let report = output.to_report().unwrap();
        assert!(report
            .insights
            .iter()
            .any(|i| output.warnings.contains(i)));
    }

    #[cfg(feature = "arm")]
    #[test]
    fn test_arm_chart_keeps_rate_precision() {
        use crate::arm::{simulate_arm, ArmInput, RateCapPolicy};
        let input = ArmInput {
            principal: dec!(300_000),
            term_years: 30,
            caps: RateCapPolicy {
                initial_rate_pct: dec!(5.125),
                fixed_period_years: 5,
                periodic_cap_pct: dec!(2),
                lifetime_cap_pct: dec!(5),
                margin_pct: dec!(2.75),
                assumed_index_rate_pct: dec!(4),
            },
            start_date: None,
        };
        let report = simulate_arm(&input).unwrap().to_report().unwrap();
        let chart = report.chart_data.unwrap();
        assert_eq!(chart[0]["rate_pct"], json!(5.125));
    }
}
