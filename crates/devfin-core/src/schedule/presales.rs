use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeMap;

use super::period::YearPeriod;
use super::placement::{Placement, YearSeries};
use crate::types::{Money, Year};
use crate::DevFinResult;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Share of a booking collected in the booking year under the default rule.
const FIRST_TRANCHE: Decimal = dec!(0.3);
/// Share spread over the remaining construction years under the default rule.
const REMAINING_TRANCHE: Decimal = dec!(0.7);
const ONE_HUNDRED: Decimal = dec!(100);

/// `{booking_year: {collection_year: percentage 0-100}}`
pub type CollectionSchedules = BTreeMap<Year, BTreeMap<Year, Decimal>>;

// ---------------------------------------------------------------------------
// Collection rules
// ---------------------------------------------------------------------------

/// How booked presales turn into cash.
#[derive(Debug, Clone, Copy)]
pub enum CollectionRule<'a> {
    /// Caller-supplied tranches per booking year. Booking years without an
    /// entry collect in full in the booking year.
    Explicit(&'a CollectionSchedules),
    /// 30% on booking, 70% spread evenly over the following years up to the
    /// end of construction. Bookings at or after construction end collect in
    /// full immediately.
    Default { construction_end: Option<Year> },
}

impl<'a> CollectionRule<'a> {
    /// An empty schedule mapping counts as not supplied.
    pub fn resolve(
        schedules: Option<&'a CollectionSchedules>,
        disbursement_period: Option<&YearPeriod>,
    ) -> Self {
        match schedules {
            Some(s) if !s.is_empty() => CollectionRule::Explicit(s),
            _ => CollectionRule::Default {
                construction_end: disbursement_period.map(|p| p.end),
            },
        }
    }

    /// Cash tranches `(collection_year, amount)` for one booking.
    pub fn tranches(&self, booking_year: Year, amount: Money) -> Vec<(Year, Money)> {
        match self {
            CollectionRule::Explicit(schedules) => match schedules.get(&booking_year) {
                Some(schedule) if !schedule.is_empty() => schedule
                    .iter()
                    .map(|(year, pct)| (*year, amount * *pct / ONE_HUNDRED))
                    .collect(),
                _ => vec![(booking_year, amount)],
            },
            CollectionRule::Default { construction_end } => match construction_end {
                Some(end) if booking_year < *end => {
                    let mut tranches = vec![(booking_year, amount * FIRST_TRANCHE)];
                    let remaining = amount * REMAINING_TRANCHE;
                    let window = YearPeriod::new(booking_year + 1, *end);
                    if window.is_empty() {
                        tranches.push((booking_year, remaining));
                    } else {
                        let annual = remaining / Decimal::from(window.len());
                        tranches.extend(window.years().map(|year| (year, annual)));
                    }
                    tranches
                }
                _ => vec![(booking_year, amount)],
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Booking and collection
// ---------------------------------------------------------------------------

/// Booked presales and the cash they bring in.
#[derive(Debug, Clone)]
pub struct PresalesSchedule {
    pub booked: YearSeries,
    pub collected: YearSeries,
}

/// Record each booking verbatim and collect cash under `rule`.
///
/// Only bookings inside the timeline with a positive amount collect cash.
pub fn schedule_presales(
    placement: &mut Placement,
    presales: &BTreeMap<Year, Money>,
    rule: CollectionRule<'_>,
) -> DevFinResult<PresalesSchedule> {
    let timeline = *placement.timeline();
    let mut booked = YearSeries::zeros(&timeline);
    let mut collected = YearSeries::zeros(&timeline);

    for (&year, &amount) in presales {
        placement.add(&mut booked, "presales booking", year, amount)?;

        if !timeline.contains(year) || amount <= Decimal::ZERO {
            continue;
        }
        for (collection_year, cash) in rule.tranches(year, amount) {
            placement.add(&mut collected, "presales collection", collection_year, cash)?;
        }
    }

    Ok(PresalesSchedule { booked, collected })
}

/// Warnings for tranche schedules that do not collect exactly 100%.
pub fn collection_schedule_gaps(schedules: &CollectionSchedules) -> Vec<String> {
    schedules
        .iter()
        .filter(|(_, schedule)| !schedule.is_empty())
        .filter_map(|(year, schedule)| {
            let total: Decimal = schedule.values().copied().sum();
            (total != ONE_HUNDRED).then(|| {
                format!("Collection schedule for {year} presales totals {total}% rather than 100%")
            })
        })
        .collect()
}
