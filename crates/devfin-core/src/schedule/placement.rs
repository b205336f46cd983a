use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::period::Timeline;
use crate::error::DevFinError;
use crate::types::{Money, Year};
use crate::DevFinResult;

/// What happens to activity scheduled outside the project timeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RangePolicy {
    /// Drop the amount from the projection and report it as a warning.
    #[default]
    Lenient,
    /// Reject the input.
    Strict,
}

/// Cash outflow sign convention: costs become negative, zero stays zero.
pub fn outflow(amount: Money) -> Money {
    if amount.is_zero() {
        Decimal::ZERO
    } else {
        -amount
    }
}

/// One amount that could not be placed on the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedActivity {
    pub activity: &'static str,
    pub year: Year,
    pub amount: Money,
}

/// A per-year column aligned to the timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearSeries {
    values: Vec<Money>,
}

impl YearSeries {
    pub fn zeros(timeline: &Timeline) -> Self {
        Self {
            values: vec![Decimal::ZERO; timeline.len()],
        }
    }

    pub fn at(&self, idx: usize) -> Money {
        self.values[idx]
    }

    pub fn values(&self) -> &[Money] {
        &self.values
    }

    pub fn total(&self) -> Money {
        self.values.iter().copied().sum()
    }

    /// Same amounts with the sign flipped (cost -> cash outflow).
    pub fn negated(&self) -> Self {
        Self {
            values: self
                .values
                .iter()
                .map(|v| outflow(*v))
                .collect(),
        }
    }
}

/// Places amounts on the timeline and enforces the range policy.
#[derive(Debug)]
pub struct Placement {
    timeline: Timeline,
    policy: RangePolicy,
    dropped: Vec<DroppedActivity>,
}

impl Placement {
    pub fn new(timeline: Timeline, policy: RangePolicy) -> Self {
        Self {
            timeline,
            policy,
            dropped: Vec::new(),
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Add `amount` to `series` in `year`. Zero amounts outside the timeline
    /// are ignored under both policies.
    pub fn add(
        &mut self,
        series: &mut YearSeries,
        activity: &'static str,
        year: Year,
        amount: Money,
    ) -> DevFinResult<()> {
        if let Some(idx) = self.timeline.index_of(year) {
            series.values[idx] += amount;
            return Ok(());
        }
        if amount.is_zero() {
            return Ok(());
        }
        match self.policy {
            RangePolicy::Strict => Err(DevFinError::PeriodOutOfRange {
                activity: activity.into(),
                year,
                start: self.timeline.start_year,
                end: self.timeline.end_year,
            }),
            RangePolicy::Lenient => {
                tracing::warn!(activity, year, %amount, "dropping activity outside project timeline");
                self.dropped.push(DroppedActivity {
                    activity,
                    year,
                    amount,
                });
                Ok(())
            }
        }
    }

    /// Consume the placement, rendering every dropped amount as a warning.
    pub fn into_warnings(self) -> Vec<String> {
        let start = self.timeline.start_year;
        let end = self.timeline.end_year;
        self.dropped
            .into_iter()
            .map(|d| {
                format!(
                    "{} of {} in {} falls outside the project timeline {start}-{end} and was dropped",
                    d.activity, d.amount, d.year
                )
            })
            .collect()
    }
}
