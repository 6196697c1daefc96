// apps/storefront/src/pipelines/contexts.rs

//! Context data for the storefront's own pipelines. Order operations use the
//! contexts inside `fst_workflow`.

use crate::models::Operator;
use crate::services::session_service::IssuedSession;
use sqlx::PgPool;

#[derive(Clone)]
pub struct OperatorSigninCtxData {
  pub db_pool: PgPool,
  pub session_ttl: chrono::Duration,
  pub email: String,
  pub password: String,
  pub operator: Option<Operator>,
  pub session: Option<IssuedSession>,
}

impl OperatorSigninCtxData {
  pub fn new(db_pool: PgPool, session_ttl: chrono::Duration, email: String, password: String) -> Self {
    Self {
      db_pool,
      session_ttl,
      email,
      password,
      operator: None,
      session: None,
    }
  }
}
