// fst_workflow/src/pipeline/mod.rs

//! A small step engine: named, ordered async steps over a shared `ContextData<T>`.
//!
//! Each workflow operation is one `Pipeline`, registered in `Workflows` under the
//! type of its context data and dispatched by that type.

pub mod context_data;
pub mod control;
pub mod definition;
pub mod execution;
pub mod registry;

pub use context_data::ContextData;
pub use control::{PipelineControl, PipelineResult};
pub use definition::{Handler, Pipeline, StepDef};
pub use registry::Workflows;
