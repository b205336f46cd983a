use devfin_core::pipeline::{build_simplified_schedule, SimplifiedScheduleInput};
use devfin_core::schedule::{
    build_project_schedule, LandPayment, ProjectScheduleInput, RangePolicy, YearPeriod,
};
use devfin_core::DevFinError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

const PIPELINE_JSON: &str = r#"{
    "total_debt": "1000000000",
    "total_construction_cost": "800000000",
    "total_land_cost": "300000000",
    "land_payment_start_year": 2024,
    "total_revenue": "1500000000",
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
}"#;

fn pipeline_input() -> SimplifiedScheduleInput {
    serde_json::from_str(PIPELINE_JSON).unwrap()
}

fn equivalent_engine_input() -> ProjectScheduleInput {
    ProjectScheduleInput {
        total_debt: dec!(1_000_000_000),
        total_construction_cost: dec!(800_000_000),
        total_land_cost: dec!(300_000_000),
        presales_schedule: BTreeMap::from([
            (2025, dec!(450_000_000)),
            (2026, dec!(750_000_000)),
            (2027, dec!(300_000_000)),
        ]),
        interest_rate: dec!(0.08),
        sga_percentage: dec!(0.05),
        tax_rate: dec!(0.2),
        disbursement_period: Some(YearPeriod::new(2024, 2026)),
        repayment_period: Some(YearPeriod::new(2027, 2028)),
        revenue_booking_period: Some(YearPeriod::new(2027, 2028)),
        land_payment: Some(LandPayment::single(2024)),
        revenue_distribution: None,
        cash_collection_schedules: None,
        project_start_year: None,
        project_end_year: None,
        range_policy: RangePolicy::Lenient,
    }
}

#[test]
fn test_pipeline_matches_direct_engine_run() {
    let via_pipeline = build_simplified_schedule(&pipeline_input()).unwrap();
    let direct = build_project_schedule(&equivalent_engine_input()).unwrap();

    pretty_assertions::assert_eq!(via_pipeline.result.rows, direct.result.rows);
    assert_eq!(via_pipeline.result.totals, direct.result.totals);
    assert_eq!(via_pipeline.warnings, direct.warnings);
}

#[test]
fn test_construction_follows_disbursement() {
    let out = build_simplified_schedule(&pipeline_input()).unwrap();
    let rows = &out.result.rows;
    let expected = dec!(800_000_000) / dec!(3);
    for row in rows.iter().filter(|r| r.year <= 2026) {
        assert_eq!(row.line.construction_cost, expected);
        assert_eq!(row.line.cash_outflow_construction, -expected);
    }
    for row in rows.iter().filter(|r| r.year > 2026) {
        assert_eq!(row.line.construction_cost, Decimal::ZERO);
    }
}

#[test]
fn test_deprecated_land_year_warns_through_pipeline() {
    let mut input = pipeline_input();
    input.land_payment_start_year = None;
    input.land_payment_year = Some(2025);
    let out = build_simplified_schedule(&input).unwrap();

    assert!(out.warnings[0].contains("deprecated"));
    let y2025 = out.result.rows.iter().find(|r| r.year == 2025).unwrap();
    assert_eq!(y2025.line.land_cost, dec!(300_000_000));
}

#[test]
fn test_multi_year_land_payment() {
    let mut input = pipeline_input();
    input.land_payment_years = 3;
    let out = build_simplified_schedule(&input).unwrap();
    let land: Vec<Decimal> = out.result.rows.iter().map(|r| r.line.land_cost).collect();
    assert_eq!(
        land,
        vec![
            dec!(100_000_000),
            dec!(100_000_000),
            dec!(100_000_000),
            Decimal::ZERO,
            Decimal::ZERO
        ]
    );
}

#[test]
fn test_strict_policy_passes_through() {
    let mut input = pipeline_input();
    input.range_policy = RangePolicy::Strict;
    input.cash_collection_schedules = Some(BTreeMap::from([(
        2027,
        BTreeMap::from([(2031, dec!(100))]),
    )]));
    assert!(matches!(
        build_simplified_schedule(&input).unwrap_err(),
        DevFinError::PeriodOutOfRange { year: 2031, .. }
    ));
}

#[test]
fn test_missing_sales_bounds_yields_no_presales() {
    let mut input = pipeline_input();
    input.sales_end_year = None;
    let out = build_simplified_schedule(&input).unwrap();
    assert_eq!(out.result.summary.total_revenue, Decimal::ZERO);
    assert_eq!(out.result.totals.revenue_recognition, Decimal::ZERO);
    assert!(out.warnings[0].starts_with("presales_distribution ignored"));
}

#[test]
fn test_envelope_records_both_inputs() {
    let out = build_simplified_schedule(&pipeline_input()).unwrap();
    assert_eq!(out.assumptions["simplified"]["sales_start_year"], 2025);
    let derived_2026: Decimal = out.assumptions["derived"]["presales_schedule"]["2026"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(derived_2026, dec!(750_000_000));
}
