pub mod accrual;
pub mod distribution;
pub mod engine;
pub mod period;
pub mod placement;
pub mod presales;
pub mod recognition;
pub mod row;
pub mod summary;

pub use engine::{build_project_schedule, ProjectScheduleInput, ProjectScheduleOutput};
pub use period::{LandPayment, Timeline, YearPeriod};
pub use placement::RangePolicy;
pub use row::{ScheduleLine, ScheduleRow};
