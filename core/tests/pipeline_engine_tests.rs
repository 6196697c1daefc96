// tests/pipeline_engine_tests.rs
mod common;

use common::*;
use fst_workflow::pipeline::Handler;
use fst_workflow::{ContextData, Pipeline, PipelineControl, PipelineResult, WorkflowError, Workflows};

#[derive(Debug, Default)]
struct TraceCtx {
  steps_executed: Vec<String>,
}

fn recording_handler(step_name: &'static str) -> Handler<TraceCtx> {
  Box::new(move |ctx: ContextData<TraceCtx>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Ok::<_, WorkflowError>(PipelineControl::Continue)
    })
  })
}

#[tokio::test]
async fn steps_run_in_declaration_order() {
  setup_tracing();
  let mut p = Pipeline::<TraceCtx>::new("ordered", &[("one", false), ("two", false), ("three", false)]);
  // Registered out of order on purpose.
  p.on_root("three", recording_handler("three"));
  p.on_root("one", recording_handler("one"));
  p.on_root("two", recording_handler("two"));

  let ctx = ContextData::new(TraceCtx::default());
  let result = p.run(ctx.clone()).await.unwrap();

  assert_eq!(result, PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["one", "two", "three"]);
}

#[tokio::test]
async fn stop_ends_the_run_early() {
  setup_tracing();
  let mut p = Pipeline::<TraceCtx>::new("stopping", &[("first", false), ("halt", false), ("never", false)]);
  p.on_root("first", recording_handler("first"));
  p.on_root("halt", |ctx: ContextData<TraceCtx>| async move {
    ctx.write().steps_executed.push("halt".to_string());
    Ok::<_, WorkflowError>(PipelineControl::Stop)
  });
  p.on_root("never", recording_handler("never"));

  let ctx = ContextData::new(TraceCtx::default());
  assert_eq!(p.run(ctx.clone()).await.unwrap(), PipelineResult::Stopped);
  assert_eq!(ctx.read().steps_executed, vec!["first", "halt"]);
}

#[tokio::test]
async fn required_step_error_aborts_and_optional_step_error_does_not() {
  setup_tracing();
  let mut p = Pipeline::<TraceCtx>::new("mixed", &[("best_effort", true), ("must_pass", false), ("after", false)]);
  p.on_root("best_effort", |_ctx: ContextData<TraceCtx>| async move {
    Err::<PipelineControl, _>(WorkflowError::Internal("side effect unavailable".to_string()))
  });
  p.on_root("must_pass", recording_handler("must_pass"));
  p.on_root("after", |_ctx: ContextData<TraceCtx>| async move {
    Err::<PipelineControl, _>(WorkflowError::InvalidInput("bad".to_string()))
  });

  let ctx = ContextData::new(TraceCtx::default());
  let err = p.run(ctx.clone()).await.unwrap_err();

  assert!(matches!(err, WorkflowError::InvalidInput(ref msg) if msg == "bad"));
  assert_eq!(ctx.read().steps_executed, vec!["must_pass"]);
}

#[tokio::test]
async fn missing_handlers_skip_optional_steps_but_fail_required_ones() {
  setup_tracing();
  let mut optional_gap = Pipeline::<TraceCtx>::new("optional_gap", &[("a", false), ("unhandled", true)]);
  optional_gap.on_root("a", recording_handler("a"));
  let ctx = ContextData::new(TraceCtx::default());
  assert_eq!(optional_gap.run(ctx).await.unwrap(), PipelineResult::Completed);

  let mut required_gap = Pipeline::<TraceCtx>::new("required_gap", &[("a", false), ("unhandled", false)]);
  required_gap.on_root("a", recording_handler("a"));
  let err = required_gap.run(ContextData::new(TraceCtx::default())).await.unwrap_err();
  assert_eq!(err.code(), "internal");
}

#[test]
#[should_panic(expected = "is not declared")]
fn registering_an_undeclared_step_panics() {
  let mut p = Pipeline::<TraceCtx>::new("strict", &[("known", false)]);
  p.on_root("unknown", recording_handler("unknown"));
}

#[derive(Debug, Default)]
struct OtherCtx {
  touched: bool,
}

#[tokio::test]
async fn workflows_dispatch_on_context_type() {
  setup_tracing();
  let workflows = Workflows::new();

  let mut trace = Pipeline::<TraceCtx>::new("trace", &[("record", false)]);
  trace.on_root("record", recording_handler("record"));
  workflows.register_pipeline(trace);

  assert!(workflows.is_registered::<TraceCtx>());
  assert!(!workflows.is_registered::<OtherCtx>());

  let ctx = ContextData::new(TraceCtx::default());
  assert_eq!(workflows.run(ctx.clone()).await.unwrap(), PipelineResult::Completed);
  assert_eq!(ctx.read().steps_executed, vec!["record"]);

  let other = ContextData::new(OtherCtx::default());
  let err = workflows.run(other.clone()).await.unwrap_err();
  assert!(matches!(err, WorkflowError::Internal(_)));
  assert!(!other.read().touched);
}
