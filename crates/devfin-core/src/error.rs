use thiserror::Error;

use crate::types::Year;

#[derive(Debug, Error)]
pub enum DevFinError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("{activity} in {year} falls outside the project timeline {start}-{end}")]
    PeriodOutOfRange {
        activity: String,
        year: Year,
        start: Year,
        end: Year,
    },
}
