use rust_decimal::Decimal;

use super::period::{LandPayment, YearPeriod};
use super::placement::{outflow, Placement, YearSeries};
use crate::types::{Money, Year};
use crate::DevFinResult;

/// Debt drawdown, construction spend and repayment columns.
#[derive(Debug, Clone)]
pub struct DebtAndConstruction {
    pub disbursement: YearSeries,
    pub repayment: YearSeries,
    pub construction_cost: YearSeries,
    pub construction_outflow: YearSeries,
}

/// Land cost and its cash outflow.
#[derive(Debug, Clone)]
pub struct LandSchedule {
    pub cost: YearSeries,
    pub outflow: YearSeries,
}

/// Equal share of `total` for every year of `period`.
///
/// Returns nothing for a zero-length period, so callers never divide by zero.
pub fn spread_linear(period: &YearPeriod, total: Money) -> Vec<(Year, Money)> {
    let len = period.len();
    if len == 0 {
        return Vec::new();
    }
    let annual = total / Decimal::from(len);
    period.years().map(|year| (year, annual)).collect()
}

/// Linear disbursement, construction and repayment schedules.
///
/// Construction runs over the disbursement period. Repayments are negative.
/// A missing period leaves its columns at zero.
pub fn schedule_debt_and_construction(
    placement: &mut Placement,
    disbursement_period: Option<&YearPeriod>,
    repayment_period: Option<&YearPeriod>,
    total_debt: Money,
    total_construction_cost: Money,
) -> DevFinResult<DebtAndConstruction> {
    let timeline = *placement.timeline();
    let mut disbursement = YearSeries::zeros(&timeline);
    let mut repayment = YearSeries::zeros(&timeline);
    let mut construction_cost = YearSeries::zeros(&timeline);

    if let Some(period) = disbursement_period {
        for (year, amount) in spread_linear(period, total_debt) {
            placement.add(&mut disbursement, "debt disbursement", year, amount)?;
        }
        for (year, amount) in spread_linear(period, total_construction_cost) {
            placement.add(&mut construction_cost, "construction cost", year, amount)?;
        }
    }

    if let Some(period) = repayment_period {
        for (year, amount) in spread_linear(period, total_debt) {
            placement.add(&mut repayment, "debt repayment", year, outflow(amount))?;
        }
    }

    let construction_outflow = construction_cost.negated();
    Ok(DebtAndConstruction {
        disbursement,
        repayment,
        construction_cost,
        construction_outflow,
    })
}

/// Land cost spread evenly over the land payment years.
pub fn schedule_land(
    placement: &mut Placement,
    land_payment: Option<&LandPayment>,
    total_land_cost: Money,
) -> DevFinResult<LandSchedule> {
    let timeline = *placement.timeline();
    let mut cost = YearSeries::zeros(&timeline);

    if total_land_cost > Decimal::ZERO {
        if let Some(period) = land_payment.and_then(LandPayment::period) {
            for (year, amount) in spread_linear(&period, total_land_cost) {
                placement.add(&mut cost, "land payment", year, amount)?;
            }
        }
    }

    let outflow = cost.negated();
    Ok(LandSchedule { cost, outflow })
}
