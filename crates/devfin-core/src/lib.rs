pub mod error;
pub mod types;

#[cfg(feature = "schedule")]
pub mod schedule;

#[cfg(feature = "pipeline")]
pub mod pipeline;

pub use error::DevFinError;
pub use types::*;

/// Standard result type for all devfin operations
pub type DevFinResult<T> = Result<T, DevFinError>;
