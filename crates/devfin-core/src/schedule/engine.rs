use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use super::accrual::{run_accrual, total_capitalized_interest, AccrualContext, YearFlows};
use super::distribution::{schedule_debt_and_construction, schedule_land};
use super::period::{
    resolve_timeline, LandPayment, Timeline, TimelineBounds, YearPeriod, MAX_TIMELINE_YEARS,
};
use super::placement::{Placement, RangePolicy};
use super::presales::{collection_schedule_gaps, schedule_presales, CollectionRule, CollectionSchedules};
use super::recognition::{distribution_gap, schedule_revenue};
use super::row::{ScheduleLine, ScheduleRow};
use super::summary::{reconciliation_warnings, summarise, ProjectSummary};
use crate::error::DevFinError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Year};
use crate::DevFinResult;

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Project-level totals, period boundaries and rates for the schedule engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectScheduleInput {
    /// Debt drawn over the disbursement period and repaid over the repayment period
    pub total_debt: Money,
    /// Construction spend, co-extensive with debt disbursement
    pub total_construction_cost: Money,
    /// Land purchase cost, paid over the land payment years
    #[serde(default)]
    pub total_land_cost: Money,
    /// Contracted sales by booking year
    #[serde(default)]
    pub presales_schedule: BTreeMap<Year, Money>,
    /// Annual rate on the average debt balance
    #[serde(default)]
    pub interest_rate: Rate,
    /// SG&A as a share of cash collected
    #[serde(default)]
    pub sga_percentage: Rate,
    /// Tax on positive profit before tax (default 20%)
    #[serde(default = "default_tax_rate")]
    pub tax_rate: Rate,
    /// Years over which debt is drawn and construction is spent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disbursement_period: Option<YearPeriod>,
    /// Years over which debt is repaid in equal instalments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repayment_period: Option<YearPeriod>,
    /// Years in which revenue and COGS are recognised
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_booking_period: Option<YearPeriod>,
    /// Defaults to a single payment in the project start year (or the
    /// disbursement start year when the project start is derived)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub land_payment: Option<LandPayment>,
    /// Share of total revenue recognised per year, as decimals (0.5 = 50%)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revenue_distribution: Option<BTreeMap<Year, Rate>>,
    /// Percentages 0-100 per booking year and collection year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_collection_schedules: Option<CollectionSchedules>,
    /// Explicit first year of the timeline; derived from the periods if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_start_year: Option<Year>,
    /// Explicit last year of the timeline; derived from the periods if absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_end_year: Option<Year>,
    /// Drop (lenient) or reject (strict) activity outside the timeline
    #[serde(default)]
    pub range_policy: RangePolicy,
}

pub(crate) fn default_tax_rate() -> Rate {
    dec!(0.2)
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

/// Year-by-year schedule plus the totals line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectScheduleOutput {
    pub timeline: Timeline,
    pub rows: Vec<ScheduleRow>,
    pub totals: ScheduleLine,
    pub summary: ProjectSummary,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the debt, interest, inventory, revenue, P&L and cash schedules for
/// a development project.
pub fn build_project_schedule(
    input: &ProjectScheduleInput,
) -> DevFinResult<ComputationOutput<ProjectScheduleOutput>> {
    let start = Instant::now();

    validate_input(input)?;

    let land_payment = input.land_payment.or_else(|| {
        input
            .project_start_year
            .or(input.disbursement_period.map(|p| p.start))
            .map(LandPayment::single)
    });

    let timeline = resolve_timeline(&TimelineBounds {
        project_start_year: input.project_start_year,
        project_end_year: input.project_end_year,
        disbursement: input.disbursement_period,
        repayment: input.repayment_period,
        revenue_booking: input.revenue_booking_period,
        land_payment_start: land_payment.map(|l| l.start_year),
        first_presales_year: input.presales_schedule.keys().next().copied(),
        last_presales_year: input.presales_schedule.keys().next_back().copied(),
    })?;
    tracing::debug!(
        start_year = timeline.start_year,
        end_year = timeline.end_year,
        "resolved project timeline"
    );

    let mut placement = Placement::new(timeline, input.range_policy);

    let debt = schedule_debt_and_construction(
        &mut placement,
        input.disbursement_period.as_ref(),
        input.repayment_period.as_ref(),
        input.total_debt,
        input.total_construction_cost,
    )?;
    let land = schedule_land(&mut placement, land_payment.as_ref(), input.total_land_cost)?;

    let rule = CollectionRule::resolve(
        input.cash_collection_schedules.as_ref(),
        input.disbursement_period.as_ref(),
    );
    let presales = schedule_presales(&mut placement, &input.presales_schedule, rule)?;

    // Booking, not collection, is the revenue base
    let total_revenue: Money = input.presales_schedule.values().copied().sum();
    let revenue = schedule_revenue(
        &mut placement,
        input.revenue_booking_period.as_ref(),
        total_revenue,
        input.revenue_distribution.as_ref(),
    )?;

    let capitalized_interest = total_capitalized_interest(
        &timeline,
        &debt.disbursement,
        &debt.repayment,
        input.interest_rate,
        input.revenue_booking_period.as_ref(),
    );
    let ctx = AccrualContext {
        interest_rate: input.interest_rate,
        sga_percentage: input.sga_percentage,
        tax_rate: input.tax_rate,
        booking_period: input.revenue_booking_period,
        total_revenue,
        total_expected_inventory: input.total_construction_cost
            + input.total_land_cost
            + capitalized_interest,
    };
    tracing::debug!(
        %total_revenue,
        %capitalized_interest,
        total_expected_inventory = %ctx.total_expected_inventory,
        "pre-pass complete"
    );

    let flows: Vec<YearFlows> = timeline
        .years()
        .enumerate()
        .map(|(idx, year)| YearFlows {
            year,
            disbursement: debt.disbursement.at(idx),
            repayment: debt.repayment.at(idx),
            construction_cost: debt.construction_cost.at(idx),
            construction_outflow: debt.construction_outflow.at(idx),
            land_cost: land.cost.at(idx),
            land_outflow: land.outflow.at(idx),
            presales_booked: presales.booked.at(idx),
            cash_collected: presales.collected.at(idx),
            revenue_recognised: revenue.at(idx),
        })
        .collect();

    let rows = run_accrual(&flows, &ctx);
    let totals = ScheduleLine::totals(&rows);
    let summary = summarise(&rows, &totals, total_revenue);

    let mut warnings = placement.into_warnings();
    if let Some(schedules) = &input.cash_collection_schedules {
        warnings.extend(collection_schedule_gaps(schedules));
    }
    if let Some(distribution) = &input.revenue_distribution {
        warnings.extend(distribution_gap(
            input.revenue_booking_period.as_ref(),
            distribution,
        ));
    }
    warnings.extend(reconciliation_warnings(&rows, &totals));

    let output = ProjectScheduleOutput {
        timeline,
        rows,
        totals,
        summary,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Development Project Schedule (debt, capitalised interest, inventory release, presales collection)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate_input(input: &ProjectScheduleInput) -> DevFinResult<()> {
    validate_non_negative("total_debt", input.total_debt)?;
    validate_non_negative("total_construction_cost", input.total_construction_cost)?;
    validate_non_negative("total_land_cost", input.total_land_cost)?;
    for (year, amount) in &input.presales_schedule {
        validate_non_negative(&format!("presales_schedule[{year}]"), *amount)?;
    }

    validate_rate("interest_rate", input.interest_rate)?;
    validate_rate("sga_percentage", input.sga_percentage)?;
    validate_rate("tax_rate", input.tax_rate)?;

    for (field, period) in [
        ("disbursement_period", input.disbursement_period),
        ("repayment_period", input.repayment_period),
        ("revenue_booking_period", input.revenue_booking_period),
    ] {
        if let Some(period) = period {
            validate_period_length(field, period.len())?;
        }
    }
    if let Some(land) = &input.land_payment {
        validate_land_payment(land)?;
    }

    Ok(())
}

fn validate_period_length(field: &str, years: u32) -> DevFinResult<()> {
    if years > MAX_TIMELINE_YEARS {
        return Err(DevFinError::InvalidInput {
            field: field.into(),
            reason: format!("Period of {years} years exceeds {MAX_TIMELINE_YEARS} years"),
        });
    }
    Ok(())
}

fn validate_land_payment(land: &LandPayment) -> DevFinResult<()> {
    validate_period_length("land_payment.years", land.years)?;
    if land.years > 0 && land.end_year().is_none() {
        return Err(DevFinError::InvalidInput {
            field: "land_payment.start_year".into(),
            reason: format!(
                "{} instalments from {} run past the last representable year",
                land.years, land.start_year
            ),
        });
    }
    Ok(())
}

fn validate_rate(field: &str, value: Rate) -> DevFinResult<()> {
    if value < Decimal::ZERO || value > Decimal::ONE {
        return Err(DevFinError::InvalidInput {
            field: field.into(),
            reason: format!("Rate must be between 0 and 1, got {value}"),
        });
    }
    Ok(())
}

fn validate_non_negative(field: &str, value: Money) -> DevFinResult<()> {
    if value < Decimal::ZERO {
        return Err(DevFinError::InvalidInput {
            field: field.into(),
            reason: format!("Value must be non-negative, got {value}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_input() -> ProjectScheduleInput {
        ProjectScheduleInput {
            total_debt: dec!(900),
            total_construction_cost: dec!(600),
            total_land_cost: dec!(300),
            presales_schedule: BTreeMap::from([
                (2025, dec!(300)),
                (2026, dec!(500)),
                (2027, dec!(200)),
            ]),
            interest_rate: dec!(0.10),
            sga_percentage: dec!(0.05),
            tax_rate: dec!(0.20),
            disbursement_period: Some(YearPeriod::new(2024, 2026)),
            repayment_period: Some(YearPeriod::new(2027, 2028)),
            revenue_booking_period: Some(YearPeriod::new(2027, 2028)),
            land_payment: None,
            revenue_distribution: None,
            cash_collection_schedules: None,
            project_start_year: None,
            project_end_year: None,
            range_policy: RangePolicy::Lenient,
        }
    }

    #[test]
    fn test_timeline_and_row_count() {
        let out = build_project_schedule(&sample_input()).unwrap();
        let r = &out.result;
        assert_eq!(r.timeline.start_year, 2024);
        assert_eq!(r.timeline.end_year, 2028);
        assert_eq!(r.rows.len(), 5);
        assert_eq!(
            r.rows.iter().map(|row| row.year).collect::<Vec<_>>(),
            vec![2024, 2025, 2026, 2027, 2028]
        );
    }

    #[test]
    fn test_land_defaults_to_disbursement_start() {
        let out = build_project_schedule(&sample_input()).unwrap();
        let r = &out.result;
        assert_eq!(r.rows[0].line.land_cost, dec!(300));
        assert_eq!(r.rows[0].line.cash_outflow_land, dec!(-300));
        assert_eq!(r.totals.land_cost, dec!(300));
    }

    #[test]
    fn test_interest_capitalised_before_booking_expensed_after() {
        let out = build_project_schedule(&sample_input()).unwrap();
        let rows = &out.result.rows;
        // 2024: avg 150 -> 15 capitalised
        assert_eq!(rows[0].line.interest_capitalized, dec!(15));
        assert_eq!(rows[0].line.interest_expense, Decimal::ZERO);
        assert_eq!(rows[0].line.cash_outflow_interest, dec!(-15));
        // 2027: balance 900 -> 450, avg 675 -> 67.5 expensed
        assert_eq!(rows[3].line.interest_capitalized, Decimal::ZERO);
        assert_eq!(rows[3].line.interest_expense, dec!(67.5));
    }

    #[test]
    fn test_inventory_fully_released_in_last_booking_year() {
        let out = build_project_schedule(&sample_input()).unwrap();
        let r = &out.result;
        assert_eq!(r.rows[4].line.inventory_balance, Decimal::ZERO);
        assert_eq!(
            r.totals.cogs,
            dec!(600) + dec!(300) + r.totals.interest_capitalized
        );
    }

    #[test]
    fn test_land_defaults_to_explicit_project_start() {
        let input = ProjectScheduleInput {
            project_start_year: Some(2023),
            ..sample_input()
        };
        let out = build_project_schedule(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.timeline.start_year, 2023);
        assert_eq!(r.rows[0].year, 2023);
        assert_eq!(r.rows[0].line.land_cost, dec!(300));
        assert_eq!(r.rows[0].line.cash_outflow_land, dec!(-300));
        assert_eq!(r.rows[1].line.land_cost, Decimal::ZERO);
        assert_eq!(r.totals.land_cost, dec!(300));
    }

    #[test]
    fn test_extreme_project_bounds_rejected() {
        let input = ProjectScheduleInput {
            project_start_year: Some(Year::MIN),
            project_end_year: Some(Year::MAX),
            ..sample_input()
        };
        assert!(matches!(
            build_project_schedule(&input).unwrap_err(),
            DevFinError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_land_instalments_beyond_year_range_rejected() {
        let input = ProjectScheduleInput {
            land_payment: Some(LandPayment {
                start_year: 2024,
                years: u32::MAX,
            }),
            ..sample_input()
        };
        match build_project_schedule(&input).unwrap_err() {
            DevFinError::InvalidInput { field, .. } => assert_eq!(field, "land_payment.years"),
            other => panic!("expected InvalidInput, got {other:?}"),
        }

        let input = ProjectScheduleInput {
            land_payment: Some(LandPayment {
                start_year: Year::MAX,
                years: 2,
            }),
            ..sample_input()
        };
        match build_project_schedule(&input).unwrap_err() {
            DevFinError::InvalidInput { field, .. } => {
                assert_eq!(field, "land_payment.start_year")
            }
            other => panic!("expected InvalidInput, got {other:?}"),
        }
    }

    #[test]
    fn test_overlong_period_rejected() {
        let input = ProjectScheduleInput {
            repayment_period: Some(YearPeriod::new(2027, Year::MAX)),
            ..sample_input()
        };
        assert!(matches!(
            build_project_schedule(&input).unwrap_err(),
            DevFinError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_negative_rate_rejected() {
        let mut input = sample_input();
        input.interest_rate = dec!(-0.01);
        assert!(matches!(
            build_project_schedule(&input).unwrap_err(),
            DevFinError::InvalidInput { .. }
        ));
    }

    #[test]
    fn test_negative_presales_rejected() {
        let mut input = sample_input();
        input.presales_schedule.insert(2026, dec!(-1));
        assert!(build_project_schedule(&input).is_err());
    }

    #[test]
    fn test_nothing_configured_fails() {
        let input = ProjectScheduleInput {
            disbursement_period: None,
            repayment_period: None,
            revenue_booking_period: None,
            presales_schedule: BTreeMap::new(),
            ..sample_input()
        };
        assert!(matches!(
            build_project_schedule(&input).unwrap_err(),
            DevFinError::InsufficientData(_)
        ));
    }

    #[test]
    fn test_json_input_defaults() {
        let input: ProjectScheduleInput = serde_json::from_str(
            r#"{
                "total_debt": "1000",
                "total_construction_cost": 800,
                "presales_schedule": {"2025": "300", "2026": "700"},
                "disbursement_period": {"start": 2024, "end": 2026},
                "revenue_booking_period": {"start": 2027, "end": 2028}
            }"#,
        )
        .unwrap();
        assert_eq!(input.tax_rate, dec!(0.2));
        assert_eq!(input.range_policy, RangePolicy::Lenient);
        assert_eq!(input.presales_schedule[&2026], dec!(700));
        assert!(build_project_schedule(&input).is_ok());
    }
}
