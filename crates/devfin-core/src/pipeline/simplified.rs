use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::DevFinError;
use crate::schedule::engine::{
    build_project_schedule, default_tax_rate, ProjectScheduleInput, ProjectScheduleOutput,
};
use crate::schedule::period::{LandPayment, YearPeriod, MAX_TIMELINE_YEARS};
use crate::schedule::placement::RangePolicy;
use crate::schedule::presales::CollectionSchedules;
use crate::types::{ComputationOutput, Money, Rate, Year};
use crate::DevFinResult;

const ONE_HUNDRED: Decimal = dec!(100);

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Project pipeline parameters: totals plus percentage distributions keyed by
/// year strings ("2025": 30 means 30%).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifiedScheduleInput {
    pub total_debt: Money,
    pub total_construction_cost: Money,
    #[serde(default)]
    pub total_land_cost: Money,
    /// Deprecated single-year land payment; superseded by
    /// `land_payment_start_year` and `land_payment_years`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_payment_year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_payment_start_year: Option<Year>,
    #[serde(default = "default_land_payment_years")]
    pub land_payment_years: u32,
    /// Total sales value when no price escalation applies
    #[serde(default)]
    pub total_revenue: Money,
    #[serde(default)]
    pub interest_rate: Rate,
    #[serde(default)]
    pub sga_percentage: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_start_year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub construction_end_year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_start_year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sales_end_year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_repayment_start_year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debt_repayment_end_year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_booking_start_year: Option<Year>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_booking_end_year: Option<Year>,
    /// Share of sales (0-100) per sales year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presales_distribution: Option<BTreeMap<String, Decimal>>,
    /// Share of revenue (0-100) recognised per booking year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_distribution: Option<BTreeMap<String, Decimal>>,
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Rate,
    /// Annual average selling price escalation (0.05 = 5%)
    #[serde(default)]
    pub price_increment_factor: Rate,
    /// Average selling price in the first sales year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_asp: Option<Money>,
    /// Total net sellable area
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_nsa: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_collection_schedules: Option<CollectionSchedules>,
    #[serde(default)]
    pub range_policy: RangePolicy,
}

fn default_land_payment_years() -> u32 {
    1
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Derive a presales schedule from the pipeline parameters and run the
/// schedule engine with construction mapped onto debt disbursement.
pub fn build_simplified_schedule(
    input: &SimplifiedScheduleInput,
) -> DevFinResult<ComputationOutput<ProjectScheduleOutput>> {
    let (schedule_input, mut warnings) = derive_schedule_input(input)?;
    let mut output = build_project_schedule(&schedule_input)?;

    warnings.append(&mut output.warnings);
    output.warnings = warnings;
    output.methodology = format!("Simplified pipeline -> {}", output.methodology);
    output.assumptions = serde_json::json!({
        "simplified": input,
        "derived": schedule_input,
    });
    Ok(output)
}

/// Translate pipeline parameters into engine input. Returns adapter warnings
/// alongside.
pub fn derive_schedule_input(
    input: &SimplifiedScheduleInput,
) -> DevFinResult<(ProjectScheduleInput, Vec<String>)> {
    let mut warnings = Vec::new();

    let presales_schedule = derive_presales(input, &mut warnings)?;
    let revenue_distribution = input
        .revenue_distribution
        .as_ref()
        .filter(|d| !d.is_empty())
        .map(|d| percentages_to_shares("revenue_distribution", d))
        .transpose()?;

    let land_payment = match (input.land_payment_start_year, input.land_payment_year) {
        (Some(start_year), _) => Some(LandPayment {
            start_year,
            years: input.land_payment_years,
        }),
        (None, Some(year)) => {
            warnings.push(
                "land_payment_year is deprecated; use land_payment_start_year and land_payment_years"
                    .into(),
            );
            Some(LandPayment::single(year))
        }
        (None, None) => None,
    };

    let schedule_input = ProjectScheduleInput {
        total_debt: input.total_debt,
        total_construction_cost: input.total_construction_cost,
        total_land_cost: input.total_land_cost,
        presales_schedule,
        interest_rate: input.interest_rate,
        sga_percentage: input.sga_percentage,
        tax_rate: input.tax_rate,
        disbursement_period: YearPeriod::from_bounds(
            input.construction_start_year,
            input.construction_end_year,
        ),
        repayment_period: YearPeriod::from_bounds(
            input.debt_repayment_start_year,
            input.debt_repayment_end_year,
        ),
        revenue_booking_period: YearPeriod::from_bounds(
            input.revenue_booking_start_year,
            input.revenue_booking_end_year,
        ),
        land_payment,
        revenue_distribution,
        cash_collection_schedules: input.cash_collection_schedules.clone(),
        project_start_year: None,
        project_end_year: None,
        range_policy: input.range_policy,
    };

    Ok((schedule_input, warnings))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Presales per sales year. With escalation the i-th sales year sells its
/// share of NSA at `base_asp * (1 + increment)^i`; otherwise it sells its
/// share of total revenue. No distribution means no presales.
fn derive_presales(
    input: &SimplifiedScheduleInput,
    warnings: &mut Vec<String>,
) -> DevFinResult<BTreeMap<Year, Money>> {
    let mut schedule = BTreeMap::new();

    let Some(distribution) = input.presales_distribution.as_ref().filter(|d| !d.is_empty()) else {
        return Ok(schedule);
    };
    let shares = percentages_to_shares("presales_distribution", distribution)?;

    let Some(sales) = YearPeriod::from_bounds(input.sales_start_year, input.sales_end_year) else {
        warnings.push("presales_distribution ignored: sales_start_year and sales_end_year are required".into());
        return Ok(schedule);
    };
    if sales.len() > MAX_TIMELINE_YEARS {
        return Err(DevFinError::InvalidInput {
            field: "sales_end_year".into(),
            reason: format!(
                "Sales period {}-{} exceeds {MAX_TIMELINE_YEARS} years",
                sales.start, sales.end
            ),
        });
    }

    for year in shares.keys().filter(|y| !sales.contains(**y)) {
        warnings.push(format!(
            "Presales distribution entry for {year} lies outside the sales period {}-{} and was ignored",
            sales.start, sales.end
        ));
    }

    let escalation = match (input.base_asp, input.total_nsa) {
        (Some(base_asp), Some(total_nsa)) if input.price_increment_factor > Decimal::ZERO => {
            Some((base_asp, total_nsa))
        }
        _ => None,
    };

    let growth = Decimal::ONE + input.price_increment_factor;
    let mut asp_multiplier = Decimal::ONE;
    for year in sales.years() {
        let share = shares.get(&year).copied().unwrap_or(Decimal::ZERO);
        let amount = match escalation {
            Some((base_asp, total_nsa)) => total_nsa * share * base_asp * asp_multiplier,
            None => input.total_revenue * share,
        };
        schedule.insert(year, amount);
        asp_multiplier *= growth;
    }

    Ok(schedule)
}

/// `{"2025": 30}` -> `{2025: 0.3}`
fn percentages_to_shares(
    field: &str,
    percentages: &BTreeMap<String, Decimal>,
) -> DevFinResult<BTreeMap<Year, Rate>> {
    percentages
        .iter()
        .map(|(key, pct)| {
            let year = key.trim().parse::<Year>().map_err(|_| DevFinError::InvalidInput {
                field: field.into(),
                reason: format!("'{key}' is not a year"),
            })?;
            Ok((year, *pct / ONE_HUNDRED))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pipeline_input() -> SimplifiedScheduleInput {
        serde_json::from_value(serde_json::json!({
            "total_debt": 1_000_000_000,
            "total_construction_cost": 800_000_000,
            "total_land_cost": 300_000_000,
            "total_revenue": 1_500_000_000,
            "interest_rate": "0.08",
            "sga_percentage": "0.05",
            "construction_start_year": 2024,
            "construction_end_year": 2026,
            "sales_start_year": 2025,
            "sales_end_year": 2027,
            "debt_repayment_start_year": 2027,
            "debt_repayment_end_year": 2028,
            "revenue_booking_start_year": 2027,
            "revenue_booking_end_year": 2028,
            "presales_distribution": {"2025": 30, "2026": 50, "2027": 20}
        }))
        .unwrap()
    }

    #[test]
    fn test_presales_from_total_revenue() {
        let (derived, warnings) = derive_schedule_input(&pipeline_input()).unwrap();
        assert!(warnings.is_empty());
        assert_eq!(
            derived.presales_schedule,
            BTreeMap::from([
                (2025, dec!(450_000_000)),
                (2026, dec!(750_000_000)),
                (2027, dec!(300_000_000)),
            ])
        );
        assert_eq!(derived.disbursement_period, Some(YearPeriod::new(2024, 2026)));
        assert_eq!(derived.tax_rate, dec!(0.2));
    }

    #[test]
    fn test_price_escalation() {
        let mut input = pipeline_input();
        input.price_increment_factor = dec!(0.10);
        input.base_asp = Some(dec!(1000));
        input.total_nsa = Some(dec!(10_000));
        let (derived, _) = derive_schedule_input(&input).unwrap();
        // 3000 m2 @ 1000, 5000 m2 @ 1100, 2000 m2 @ 1210
        assert_eq!(derived.presales_schedule[&2025], dec!(3_000_000));
        assert_eq!(derived.presales_schedule[&2026], dec!(5_500_000));
        assert_eq!(derived.presales_schedule[&2027], dec!(2_420_000));
    }

    #[test]
    fn test_escalation_needs_asp_and_nsa() {
        let mut input = pipeline_input();
        input.price_increment_factor = dec!(0.10);
        input.base_asp = Some(dec!(1000));
        let (derived, _) = derive_schedule_input(&input).unwrap();
        assert_eq!(derived.presales_schedule[&2025], dec!(450_000_000));
    }

    #[test]
    fn test_no_distribution_no_presales() {
        let mut input = pipeline_input();
        input.presales_distribution = None;
        let (derived, _) = derive_schedule_input(&input).unwrap();
        assert!(derived.presales_schedule.is_empty());
    }

    #[test]
    fn test_sales_year_missing_from_distribution_books_zero() {
        let mut input = pipeline_input();
        input.presales_distribution = Some(BTreeMap::from([("2025".to_string(), dec!(100))]));
        let (derived, _) = derive_schedule_input(&input).unwrap();
        assert_eq!(derived.presales_schedule[&2026], Decimal::ZERO);
        assert_eq!(derived.presales_schedule.len(), 3);
    }

    #[test]
    fn test_revenue_distribution_converted_to_decimals() {
        let mut input = pipeline_input();
        input.revenue_distribution = Some(BTreeMap::from([
            ("2027".to_string(), dec!(40)),
            ("2028".to_string(), dec!(60)),
        ]));
        let (derived, _) = derive_schedule_input(&input).unwrap();
        assert_eq!(
            derived.revenue_distribution,
            Some(BTreeMap::from([(2027, dec!(0.4)), (2028, dec!(0.6))]))
        );
    }

    #[test]
    fn test_bad_year_key_rejected() {
        let mut input = pipeline_input();
        input.revenue_distribution = Some(BTreeMap::from([("FY27".to_string(), dec!(100))]));
        assert!(matches!(
            derive_schedule_input(&input).unwrap_err(),
            DevFinError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_overlong_sales_period_rejected() {
        let mut input = pipeline_input();
        input.sales_start_year = Some(Year::MIN);
        input.sales_end_year = Some(Year::MAX);
        assert!(matches!(
            derive_schedule_input(&input).unwrap_err(),
            DevFinError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_deprecated_land_year_translated() {
        let mut input = pipeline_input();
        input.land_payment_year = Some(2024);
        let (derived, warnings) = derive_schedule_input(&input).unwrap();
        assert_eq!(derived.land_payment, Some(LandPayment::single(2024)));
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("deprecated"));
    }

    #[test]
    fn test_multi_year_land_wins_over_deprecated_year() {
        let mut input = pipeline_input();
        input.land_payment_year = Some(2024);
        input.land_payment_start_year = Some(2025);
        input.land_payment_years = 2;
        let (derived, warnings) = derive_schedule_input(&input).unwrap();
        assert_eq!(
            derived.land_payment,
            Some(LandPayment {
                start_year: 2025,
                years: 2
            })
        );
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_distribution_outside_sales_period_warns() {
        let mut input = pipeline_input();
        input
            .presales_distribution
            .as_mut()
            .unwrap()
            .insert("2030".to_string(), dec!(5));
        let (_, warnings) = derive_schedule_input(&input).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("2030"));
    }

    #[test]
    fn test_full_pipeline_runs_engine() {
        let out = build_simplified_schedule(&pipeline_input()).unwrap();
        let r = &out.result;
        assert_eq!(r.timeline.start_year, 2024);
        assert_eq!(r.timeline.end_year, 2028);
        assert_eq!(r.summary.total_revenue, dec!(1_500_000_000));
        assert!(out.methodology.starts_with("Simplified pipeline"));
        assert!(out.assumptions.get("derived").is_some());
    }
}
