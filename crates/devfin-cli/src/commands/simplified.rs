use clap::Args;
use serde_json::Value;

use devfin_core::pipeline::{self, SimplifiedScheduleInput};
use devfin_core::schedule::RangePolicy;

use crate::input;

/// Arguments for the pipeline adapter
#[derive(Args)]
pub struct SimplifiedArgs {
    /// Path to a JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,

    /// Fail on activity outside the project timeline instead of dropping it
    #[arg(long)]
    pub strict: bool,
}

pub fn run_simplified(args: SimplifiedArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut pipeline_input: SimplifiedScheduleInput =
        input::read_input(args.input.as_deref(), "simplified schedule")?;
    tracing::debug!(input = ?args.input, strict = args.strict, "input loaded");
    if args.strict {
        pipeline_input.range_policy = RangePolicy::Strict;
    }
    let result = pipeline::build_simplified_schedule(&pipeline_input)?;
    Ok(serde_json::to_value(result)?)
}
