pub mod simplified;

pub use simplified::{build_simplified_schedule, SimplifiedScheduleInput};
