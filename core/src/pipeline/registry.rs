// fst_workflow/src/pipeline/registry.rs

//! `Workflows`: pipelines keyed by the type of their context data.
//!
//! Each operation has its own context struct, so the context type alone selects
//! the pipeline to run.

use crate::error::WorkflowError;
use crate::pipeline::context_data::ContextData;
use crate::pipeline::control::PipelineResult;
use crate::pipeline::definition::Pipeline;

use async_trait::async_trait;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{event, Level};

/// Type-erased runner so pipelines over different context types share one map.
#[async_trait]
trait AnyPipelineRunner: Send + Sync {
  /// `ctx_obj` holds a `ContextData<TData>` for the runner's `TData`.
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, WorkflowError>;
}

#[async_trait]
impl<TData> AnyPipelineRunner for Pipeline<TData>
where
  TData: 'static + Send + Sync,
{
  async fn run_erased(&self, ctx_obj: Box<dyn Any + Send>) -> Result<PipelineResult, WorkflowError> {
    match ctx_obj.downcast::<ContextData<TData>>() {
      Ok(ctx_data) => self.run(*ctx_data).await,
      Err(_) => Err(WorkflowError::Internal(format!(
        "pipeline '{}' received a context that is not ContextData<{}>",
        self.name,
        std::any::type_name::<TData>()
      ))),
    }
  }
}

#[derive(Default)]
pub struct Workflows {
  registry: RwLock<HashMap<TypeId, Arc<dyn AnyPipelineRunner>>>,
}

impl Workflows {
  pub fn new() -> Self {
    Self::default()
  }

  /// Registers `pipeline` for its context type, replacing any earlier registration.
  pub fn register_pipeline<TData>(&self, pipeline: Pipeline<TData>)
  where
    TData: 'static + Send + Sync,
  {
    event!(
      Level::DEBUG,
      pipeline = pipeline.name,
      tdata_type = %std::any::type_name::<TData>(),
      "Registering pipeline."
    );
    self
      .registry
      .write()
      .insert(TypeId::of::<TData>(), Arc::new(pipeline));
  }

  pub fn is_registered<TData: 'static>(&self) -> bool {
    self.registry.read().contains_key(&TypeId::of::<TData>())
  }

  /// Runs the pipeline registered for `TData`.
  pub async fn run<TData>(&self, ctx_data: ContextData<TData>) -> Result<PipelineResult, WorkflowError>
  where
    TData: 'static + Send + Sync,
  {
    let runner = {
      let registry = self.registry.read();
      registry.get(&TypeId::of::<TData>()).cloned()
    };
    let runner = runner.ok_or_else(|| {
      let type_name = std::any::type_name::<TData>();
      event!(Level::ERROR, "No pipeline registered for {}.", type_name);
      WorkflowError::Internal(format!("no pipeline registered for {}", type_name))
    })?;

    runner.run_erased(Box::new(ctx_data)).await
  }
}
