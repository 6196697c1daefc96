// apps/storefront/src/services/session_service.rs

//! Server-side operator sessions. A session token is an opaque capability: whoever
//! holds an unrevoked, unexpired token may act as the operator it was issued to.

use crate::errors::{AppError, Result as AppResult};
use crate::models::{Operator, OperatorSessionRow};
use crate::services::auth_service::{generate_session_token, hash_password};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fst_workflow::{OperatorIdentity, OperatorVerifier, StoreError, WorkflowError};
use serde::Serialize;
use sqlx::PgPool;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IssuedSession {
  pub token: String,
  pub operator_id: Uuid,
  pub expires_at: DateTime<Utc>,
}

#[instrument(name = "session_service::create_session", skip(pool), err(Display))]
pub async fn create_session(
  pool: &PgPool,
  operator_id: Uuid,
  ttl: chrono::Duration,
  now: DateTime<Utc>,
) -> AppResult<IssuedSession> {
  let token = generate_session_token();
  let expires_at = now + ttl;

  sqlx::query("INSERT INTO operator_sessions (token, operator_id, created_at, expires_at) VALUES ($1, $2, $3, $4)")
    .bind(&token)
    .bind(operator_id)
    .bind(now)
    .bind(expires_at)
    .execute(pool)
    .await?;

  info!(%operator_id, %expires_at, "Operator session issued.");
  Ok(IssuedSession {
    token,
    operator_id,
    expires_at,
  })
}

/// Returns whether a live session was revoked. Revoking an unknown token is not an error.
#[instrument(name = "session_service::revoke_session", skip_all, err(Display))]
pub async fn revoke_session(pool: &PgPool, token: &str, now: DateTime<Utc>) -> AppResult<bool> {
  let result = sqlx::query("UPDATE operator_sessions SET revoked_at = $2 WHERE token = $1 AND revoked_at IS NULL")
    .bind(token)
    .bind(now)
    .execute(pool)
    .await?;
  Ok(result.rows_affected() > 0)
}

#[instrument(name = "session_service::find_operator_by_email", skip(pool), err(Display))]
pub async fn find_operator_by_email(pool: &PgPool, email: &str) -> AppResult<Option<Operator>> {
  let operator = sqlx::query_as::<_, Operator>(
    "SELECT id, email, password_hash, display_name, created_at FROM operators WHERE lower(email) = lower($1)",
  )
  .bind(email.trim())
  .fetch_optional(pool)
  .await?;
  Ok(operator)
}

/// Creates the operator account unless the email is already taken.
#[instrument(name = "session_service::seed_operator", skip(pool, password), err(Display))]
pub async fn seed_operator(pool: &PgPool, email: &str, password: &str) -> AppResult<()> {
  let email = email.trim().to_lowercase();
  if !email.contains('@') {
    return Err(AppError::Config(format!("Seed operator email '{}' is not valid", email)));
  }
  let password_hash = hash_password(password)?;

  let result = sqlx::query(
    "INSERT INTO operators (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4) \
     ON CONFLICT (email) DO NOTHING",
  )
  .bind(Uuid::new_v4())
  .bind(&email)
  .bind(password_hash)
  .bind(Utc::now())
  .execute(pool)
  .await?;

  if result.rows_affected() > 0 {
    info!(%email, "Seed operator account created.");
  } else {
    info!(%email, "Seed operator already exists; left unchanged.");
  }
  Ok(())
}

/// Resolves session tokens against `operator_sessions`. Expiry is judged by the
/// workflow against its own clock, so expired rows are returned as-is.
#[derive(Clone)]
pub struct PgSessionVerifier {
  pool: PgPool,
}

impl PgSessionVerifier {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl OperatorVerifier for PgSessionVerifier {
  #[instrument(name = "pg_session_verifier::verify", skip_all)]
  async fn verify(&self, credential: &str) -> Result<OperatorIdentity, WorkflowError> {
    let token = credential.trim();
    if token.is_empty() {
      return Err(WorkflowError::unauthorized("Operator credential is missing."));
    }

    let row = sqlx::query_as::<_, OperatorSessionRow>(
      "SELECT s.operator_id, o.email AS operator_email, s.expires_at \
       FROM operator_sessions s JOIN operators o ON o.id = s.operator_id \
       WHERE s.token = $1 AND s.revoked_at IS NULL",
    )
    .bind(token)
    .fetch_optional(&self.pool)
    .await
    .map_err(|e| StoreError::Backend(format!("verify_session: {}", e)))?;

    match row {
      Some(session) => {
        debug!(operator = %session.operator_email, "Operator session resolved.");
        Ok(OperatorIdentity {
          operator_id: session.operator_id.to_string(),
          expires_at: session.expires_at,
        })
      }
      None => {
        warn!("Unknown or revoked operator session presented.");
        Err(WorkflowError::unauthorized("Operator session is not valid."))
      }
    }
  }
}
