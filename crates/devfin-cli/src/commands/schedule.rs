use clap::Args;
use serde_json::Value;

use devfin_core::schedule::{self, ProjectScheduleInput, RangePolicy};

use crate::input;

/// Arguments for the full schedule engine
#[derive(Args)]
pub struct ScheduleArgs {
    /// Path to a JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Fail on activity outside the project timeline instead of dropping it
    #[arg(long)]
    pub strict: bool,
}

pub fn run_schedule(args: ScheduleArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut schedule_input: ProjectScheduleInput =
        input::read_input(args.input.as_deref(), "project schedule")?;
    tracing::debug!(input = ?args.input, strict = args.strict, "input loaded");
    if args.strict {
        schedule_input.range_policy = RangePolicy::Strict;
    }
    let result = schedule::build_project_schedule(&schedule_input)?;
    Ok(serde_json::to_value(result)?)
}
