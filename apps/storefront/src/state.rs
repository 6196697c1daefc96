// apps/storefront/src/state.rs
use crate::config::AppConfig;
use fst_workflow::{OrderWorkflow, Workflows};
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub db_pool: PgPool,
  pub workflow: Arc<OrderWorkflow>,
  /// Storefront-owned pipelines (operator sign-in).
  pub app_workflows: Arc<Workflows>,
  pub config: Arc<AppConfig>,
}
