// fst_workflow/src/pipeline/definition.rs

//! The `Pipeline<TData>` struct: step definitions and handler registration.

use crate::error::WorkflowError;
use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::PipelineControl;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// A step handler: takes a clone of the run's context and resolves to a control signal.
///
/// Handlers must drop any lock guard on the context before awaiting.
pub type Handler<TData> = Box<
  dyn Fn(ContextData<TData>) -> Pin<Box<dyn Future<Output = Result<PipelineControl, WorkflowError>> + Send>>
    + Send
    + Sync,
>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepDef {
  pub name: String,
  /// A failing optional step is logged and skipped over instead of aborting the run.
  pub optional: bool,
}

pub struct Pipeline<TData>
where
  TData: 'static + Send + Sync,
{
  pub(crate) name: &'static str,
  pub(crate) steps: Vec<StepDef>,
  pub(crate) on: HashMap<String, Vec<Handler<TData>>>,
}

impl<TData> Pipeline<TData>
where
  TData: 'static + Send + Sync,
{
  /// Creates a pipeline from `(step_name, optional)` pairs, in execution order.
  pub fn new(name: &'static str, step_defs: &[(&str, bool)]) -> Self {
    let steps = step_defs
      .iter()
      .map(|(step_name, optional)| StepDef {
        name: (*step_name).to_string(),
        optional: *optional,
      })
      .collect();

    Self {
      name,
      steps,
      on: HashMap::new(),
    }
  }

  pub fn name(&self) -> &'static str {
    self.name
  }

  pub fn steps(&self) -> &[StepDef] {
    &self.steps
  }

  /// Registers a handler for `step_name`. Several handlers on one step run in registration order.
  ///
  /// Panics if the step was not declared: that is a wiring mistake, not a runtime condition.
  pub fn on_root<F>(
    &mut self,
    step_name: &str,
    handler_fn: impl Fn(ContextData<TData>) -> F + Send + Sync + 'static,
  ) where
    F: Future<Output = Result<PipelineControl, WorkflowError>> + Send + 'static,
  {
    if !self.steps.iter().any(|s| s.name == step_name) {
      panic!(
        "Pipeline '{}' setup error: step '{}' is not declared.",
        self.name, step_name
      );
    }
    let handler: Handler<TData> = Box::new(move |ctx_data| Box::pin(handler_fn(ctx_data)));
    self.on.entry(step_name.to_string()).or_default().push(handler);
  }
}
