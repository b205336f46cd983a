use napi::Result as NapiResult;
use napi_derive::napi;

use devfin_core::pipeline::{self, SimplifiedScheduleInput};
use devfin_core::schedule::{self, ProjectScheduleInput};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

#[napi]
pub fn build_project_schedule(input_json: String) -> NapiResult<String> {
    let input: ProjectScheduleInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_project_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_simplified_schedule(input_json: String) -> NapiResult<String> {
    let input: SimplifiedScheduleInput =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = pipeline::build_simplified_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
