pub mod demo;
pub mod schedule;
pub mod simplified;
