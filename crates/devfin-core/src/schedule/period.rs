use serde::{Deserialize, Serialize};

use crate::error::DevFinError;
use crate::types::Year;
use crate::DevFinResult;

/// Longest year axis the engine will lay out.
pub const MAX_TIMELINE_YEARS: u32 = 200;

/// `end - start + 1`, widened so extreme years cannot overflow.
fn span(start: Year, end: Year) -> i64 {
    i64::from(end) - i64::from(start) + 1
}

// ---------------------------------------------------------------------------
// Periods
// ---------------------------------------------------------------------------

/// Closed year interval `[start, end]` governing one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearPeriod {
    pub start: Year,
    pub end: Year,
}

impl YearPeriod {
    pub fn new(start: Year, end: Year) -> Self {
        Self { start, end }
    }

    /// Build a period only when both bounds are known.
    pub fn from_bounds(start: Option<Year>, end: Option<Year>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self { start, end }),
            _ => None,
        }
    }

    /// Number of years in the period; zero when `end < start`.
    pub fn len(&self) -> u32 {
        u32::try_from(span(self.start, self.end).max(0)).unwrap_or(u32::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, year: Year) -> bool {
        self.start <= year && year <= self.end
    }

    pub fn years(&self) -> impl Iterator<Item = Year> {
        self.start..=self.end
    }
}

/// Land paid in equal instalments over `years` consecutive years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandPayment {
    pub start_year: Year,
    #[serde(default = "default_land_payment_years")]
    pub years: u32,
}

fn default_land_payment_years() -> u32 {
    1
}

impl LandPayment {
    /// Single payment in one year.
    pub fn single(year: Year) -> Self {
        Self {
            start_year: year,
            years: 1,
        }
    }

    /// Last instalment year; `None` for zero instalments or when the last
    /// year does not fit in a `Year`.
    pub fn end_year(&self) -> Option<Year> {
        let years = Year::try_from(self.years).ok().filter(|y| *y > 0)?;
        self.start_year.checked_add(years - 1)
    }

    /// Instalment years; `None` when there are none to pay.
    pub fn period(&self) -> Option<YearPeriod> {
        self.end_year().map(|end| YearPeriod::new(self.start_year, end))
    }
}

// ---------------------------------------------------------------------------
// Timeline
// ---------------------------------------------------------------------------

/// Contiguous ascending year axis shared by every schedule column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    pub start_year: Year,
    pub end_year: Year,
}

impl Timeline {
    pub fn len(&self) -> usize {
        usize::try_from(span(self.start_year, self.end_year).max(0)).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.end_year < self.start_year
    }

    pub fn contains(&self, year: Year) -> bool {
        self.start_year <= year && year <= self.end_year
    }

    pub fn index_of(&self, year: Year) -> Option<usize> {
        if self.contains(year) {
            usize::try_from(i64::from(year) - i64::from(self.start_year)).ok()
        } else {
            None
        }
    }

    pub fn years(&self) -> impl Iterator<Item = Year> {
        self.start_year..=self.end_year
    }
}

/// Boundaries that take part in timeline resolution.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineBounds {
    pub project_start_year: Option<Year>,
    pub project_end_year: Option<Year>,
    pub disbursement: Option<YearPeriod>,
    pub repayment: Option<YearPeriod>,
    pub revenue_booking: Option<YearPeriod>,
    pub land_payment_start: Option<Year>,
    pub first_presales_year: Option<Year>,
    pub last_presales_year: Option<Year>,
}

/// Resolve the project year axis.
///
/// Explicit project bounds win. Otherwise the start is the earliest of the
/// disbursement, land payment, revenue booking and repayment starts and the
/// first presales year; the end is the latest of the disbursement, repayment
/// and revenue booking ends and the last presales year. Land payment does not
/// stretch the end of the axis.
pub fn resolve_timeline(bounds: &TimelineBounds) -> DevFinResult<Timeline> {
    let start_year = match bounds.project_start_year {
        Some(year) => year,
        None => [
            bounds.disbursement.map(|p| p.start),
            bounds.land_payment_start,
            bounds.revenue_booking.map(|p| p.start),
            bounds.repayment.map(|p| p.start),
            bounds.first_presales_year,
        ]
        .into_iter()
        .flatten()
        .min()
        .ok_or_else(|| {
            DevFinError::InsufficientData(
                "Cannot derive project start year: supply project_start_year or at least one period"
                    .into(),
            )
        })?,
    };

    let end_year = match bounds.project_end_year {
        Some(year) => year,
        None => [
            bounds.disbursement.map(|p| p.end),
            bounds.repayment.map(|p| p.end),
            bounds.revenue_booking.map(|p| p.end),
            bounds.last_presales_year,
        ]
        .into_iter()
        .flatten()
        .max()
        .ok_or_else(|| {
            DevFinError::InsufficientData(
                "Cannot derive project end year: supply project_end_year or at least one period"
                    .into(),
            )
        })?,
    };

    if end_year < start_year {
        return Err(DevFinError::InvalidInput {
            field: "project_end_year".into(),
            reason: format!("Project ends in {end_year}, before it starts in {start_year}"),
        });
    }
    if span(start_year, end_year) > i64::from(MAX_TIMELINE_YEARS) {
        return Err(DevFinError::InvalidInput {
            field: "project_end_year".into(),
            reason: format!(
                "Timeline {start_year}-{end_year} exceeds {MAX_TIMELINE_YEARS} years"
            ),
        });
    }

    Ok(Timeline {
        start_year,
        end_year,
    })
}
