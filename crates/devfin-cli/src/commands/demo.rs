use rust_decimal_macros::dec;
use serde_json::Value;
use std::collections::BTreeMap;

use devfin_core::pipeline::{self, SimplifiedScheduleInput};
use devfin_core::schedule::RangePolicy;

/// 1B debt and 800M construction over 2024-2026, 300M land up front, 1.5B of
/// sales across 2025-2027 booked as revenue in 2027-2028.
pub fn demo_input() -> SimplifiedScheduleInput {
    SimplifiedScheduleInput {
        total_debt: dec!(1_000_000_000),
        total_construction_cost: dec!(800_000_000),
        total_land_cost: dec!(300_000_000),
        land_payment_year: None,
        land_payment_start_year: Some(2024),
        land_payment_years: 1,
        total_revenue: dec!(1_500_000_000),
        interest_rate: dec!(0.08),
        sga_percentage: dec!(0.05),
        construction_start_year: Some(2024),
        construction_end_year: Some(2026),
        sales_start_year: Some(2025),
        sales_end_year: Some(2027),
        debt_repayment_start_year: Some(2027),
        debt_repayment_end_year: Some(2028),
        revenue_booking_start_year: Some(2027),
        revenue_booking_end_year: Some(2028),
        presales_distribution: Some(BTreeMap::from([
            ("2025".to_string(), dec!(30)),
            ("2026".to_string(), dec!(50)),
            ("2027".to_string(), dec!(20)),
        ])),
        revenue_distribution: None,
        tax_rate: dec!(0.2),
        price_increment_factor: dec!(0),
        base_asp: None,
        total_nsa: None,
        cash_collection_schedules: None,
        range_policy: RangePolicy::Lenient,
    }
}

pub fn run_demo() -> Result<Value, Box<dyn std::error::Error>> {
    let result = pipeline::build_simplified_schedule(&demo_input())?;
    Ok(serde_json::to_value(result)?)
}
