// apps/storefront/src/pipelines/mod.rs

//! Pipelines owned by the storefront itself. Order pipelines are registered by
//! `fst_workflow::OrderWorkflow`.

pub mod contexts;
pub mod signin_pipeline;

use fst_workflow::Workflows;

pub fn register_all_pipelines(workflows: &Workflows) {
  signin_pipeline::register_operator_signin_pipeline(workflows);
  tracing::info!("Storefront pipelines registered.");
}
