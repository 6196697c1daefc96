// fst_workflow/src/pipeline/execution.rs

//! `Pipeline::run()`: executes steps in order against one shared context.

use crate::error::WorkflowError;
use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::{PipelineControl, PipelineResult};
use crate::pipeline::definition::Pipeline;
use tracing::{event, instrument, Instrument, Level};

impl<TData> Pipeline<TData>
where
  TData: 'static + Send + Sync,
{
  /// Runs every step in declaration order.
  ///
  /// - `PipelineControl::Stop` ends the run with `PipelineResult::Stopped`.
  /// - An error from a required step ends the run and is returned as-is.
  /// - An error from an optional step is logged; the run moves on to the next step.
  /// - A required step with no handler is a wiring error (`WorkflowError::Internal`).
  #[instrument(
    name = "Pipeline::run",
    skip_all,
    fields(pipeline = self.name, num_steps = self.steps.len())
  )]
  pub async fn run(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, WorkflowError> {
    event!(Level::DEBUG, "Pipeline execution starting.");

    for (step_idx, step_def) in self.steps.iter().enumerate() {
      let handlers = match self.on.get(step_def.name.as_str()) {
        Some(handlers) if !handlers.is_empty() => handlers,
        _ if step_def.optional => {
          event!(Level::DEBUG, step = %step_def.name, "Optional step has no handlers, skipping.");
          continue;
        }
        _ => {
          event!(Level::ERROR, step = %step_def.name, "Required step has no handlers.");
          return Err(WorkflowError::Internal(format!(
            "pipeline '{}' has no handler for required step '{}'",
            self.name, step_def.name
          )));
        }
      };

      let step_span = tracing::info_span!(
        "pipeline_step",
        step_name = step_def.name.as_str(),
        step_index = step_idx,
        optional = step_def.optional
      );

      for handler_fn in handlers {
        match handler_fn(ctx_data.clone()).instrument(step_span.clone()).await {
          Ok(PipelineControl::Continue) => {}
          Ok(PipelineControl::Stop) => {
            event!(Level::INFO, step = %step_def.name, "Pipeline stopped by handler.");
            return Ok(PipelineResult::Stopped);
          }
          Err(e) if step_def.optional => {
            event!(Level::WARN, step = %step_def.name, error = %e, "Optional step failed; continuing.");
            break;
          }
          Err(e) => {
            event!(Level::DEBUG, step = %step_def.name, error = %e, "Step failed.");
            return Err(e);
          }
        }
      }
    }

    event!(Level::DEBUG, "Pipeline execution completed.");
    Ok(PipelineResult::Completed)
  }
}
