use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::period::YearPeriod;
use super::placement::{Placement, YearSeries};
use crate::types::{Money, Rate, Year};
use crate::DevFinResult;

/// Recognise `total_revenue` over the booking period.
///
/// With a non-empty distribution each booking year recognises its share
/// (0 when absent from the map); otherwise revenue is recognised linearly.
/// Years outside the booking period never recognise revenue.
pub fn schedule_revenue(
    placement: &mut Placement,
    booking_period: Option<&YearPeriod>,
    total_revenue: Money,
    distribution: Option<&BTreeMap<Year, Rate>>,
) -> DevFinResult<YearSeries> {
    let timeline = *placement.timeline();
    let mut recognised = YearSeries::zeros(&timeline);

    let Some(period) = booking_period else {
        return Ok(recognised);
    };

    match distribution {
        Some(shares) if !shares.is_empty() => {
            for year in period.years() {
                let share = shares.get(&year).copied().unwrap_or(Decimal::ZERO);
                placement.add(&mut recognised, "revenue recognition", year, total_revenue * share)?;
            }
        }
        _ => {
            let len = period.len();
            if len > 0 && total_revenue > Decimal::ZERO {
                let annual = total_revenue / Decimal::from(len);
                for year in period.years() {
                    placement.add(&mut recognised, "revenue recognition", year, annual)?;
                }
            }
        }
    }

    Ok(recognised)
}

/// Warning when a custom distribution does not recognise exactly 100% of
/// revenue inside the booking period.
pub fn distribution_gap(
    booking_period: Option<&YearPeriod>,
    distribution: &BTreeMap<Year, Rate>,
) -> Option<String> {
    let period = booking_period?;
    if distribution.is_empty() {
        return None;
    }
    let total: Decimal = period
        .years()
        .filter_map(|year| distribution.get(&year).copied())
        .sum();
    (total != Decimal::ONE).then(|| {
        format!(
            "Revenue distribution recognises {total} of total revenue within {}-{}",
            period.start, period.end
        )
    })
}
