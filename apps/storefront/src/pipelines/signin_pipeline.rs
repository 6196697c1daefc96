// apps/storefront/src/pipelines/signin_pipeline.rs

use crate::errors::AppError;
use crate::pipelines::contexts::OperatorSigninCtxData;
use crate::services::{auth_service, session_service};
use chrono::Utc;
use fst_workflow::{ContextData, Pipeline, PipelineControl, WorkflowError, Workflows};
use tracing::{event, warn, Level};

const BAD_CREDENTIALS: &str = "Invalid email or password.";

/// Everything below the HTTP layer speaks `WorkflowError`; database trouble is an outage.
fn into_workflow_error(err: AppError) -> WorkflowError {
  match err {
    AppError::Sqlx(e) => WorkflowError::StoreUnavailable(format!("operator lookup: {}", e)),
    AppError::Validation(m) => WorkflowError::InvalidInput(m),
    AppError::Auth(m) => WorkflowError::unauthorized(m),
    AppError::Workflow(e) => e,
    other => WorkflowError::Internal(other.to_string()),
  }
}

/// Operator sign-in: email + password in, server-side session out.
pub fn register_operator_signin_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<OperatorSigninCtxData>::new(
    "operator_signin",
    &[
      ("validate_signin_input", false),
      ("fetch_operator", false),
      ("verify_password", false),
      ("issue_session", false),
    ],
  );

  p.on_root("validate_signin_input", |ctx_data: ContextData<OperatorSigninCtxData>| async move {
    let (email, password_is_empty) = {
      let guard = ctx_data.read();
      (guard.email.trim().to_string(), guard.password.is_empty())
    };

    if email.is_empty() || !email.contains('@') {
      warn!("Operator sign-in attempted without a valid email.");
      return Err(WorkflowError::InvalidInput("Valid email is required.".to_string()));
    }
    if password_is_empty {
      return Err(WorkflowError::InvalidInput("Password is required.".to_string()));
    }
    ctx_data.write().email = email;
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  p.on_root("fetch_operator", |ctx_data: ContextData<OperatorSigninCtxData>| async move {
    let (email, pool) = {
      let guard = ctx_data.read();
      (guard.email.clone(), guard.db_pool.clone())
    };

    let operator = session_service::find_operator_by_email(&pool, &email)
      .await
      .map_err(into_workflow_error)?;
    match operator {
      Some(operator) => {
        event!(Level::DEBUG, operator_id = %operator.id, "Operator found for sign-in.");
        ctx_data.write().operator = Some(operator);
        Ok::<_, WorkflowError>(PipelineControl::Continue)
      }
      None => {
        warn!(%email, "Sign-in for unknown operator email.");
        Err(WorkflowError::unauthorized(BAD_CREDENTIALS))
      }
    }
  });

  p.on_root("verify_password", |ctx_data: ContextData<OperatorSigninCtxData>| async move {
    let (stored_hash, password) = {
      let guard = ctx_data.read();
      (guard.operator.as_ref().map(|o| o.password_hash.clone()), guard.password.clone())
    };
    let stored_hash =
      stored_hash.ok_or_else(|| WorkflowError::Internal("operator missing before password check".to_string()))?;

    let verified = auth_service::verify_password(&stored_hash, &password).map_err(into_workflow_error)?;
    // The plaintext is not needed past this point.
    ctx_data.write().password.clear();
    if verified {
      Ok::<_, WorkflowError>(PipelineControl::Continue)
    } else {
      warn!("Operator password mismatch.");
      Err(WorkflowError::unauthorized(BAD_CREDENTIALS))
    }
  });

  p.on_root("issue_session", |ctx_data: ContextData<OperatorSigninCtxData>| async move {
    let (operator_id, pool, ttl) = {
      let guard = ctx_data.read();
      (guard.operator.as_ref().map(|o| o.id), guard.db_pool.clone(), guard.session_ttl)
    };
    let operator_id =
      operator_id.ok_or_else(|| WorkflowError::Internal("operator missing before session issue".to_string()))?;

    let session = session_service::create_session(&pool, operator_id, ttl, Utc::now())
      .await
      .map_err(into_workflow_error)?;
    event!(Level::INFO, %operator_id, expires_at = %session.expires_at, "Operator signed in.");
    ctx_data.write().session = Some(session);
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(p);
}
