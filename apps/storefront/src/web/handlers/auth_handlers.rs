// apps/storefront/src/web/handlers/auth_handlers.rs

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use chrono::Utc;
use fst_workflow::{ContextData, PipelineResult};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::pipelines::contexts::OperatorSigninCtxData;
use crate::services::session_service;
use crate::state::AppState;
use crate::web::extractors::{OperatorCredential, OPERATOR_SESSION_COOKIE};

#[derive(Deserialize, Debug)]
pub struct SigninRequestPayload {
  pub email: String,
  pub password: String,
}

#[instrument(
    name = "handler::operator_signin",
    skip(app_state, req_payload),
    fields(req_email = %req_payload.email)
)]
pub async fn signin_handler(
  app_state: web::Data<AppState>,
  req_payload: web::Json<SigninRequestPayload>,
) -> Result<HttpResponse, AppError> {
  let SigninRequestPayload { email, password } = req_payload.into_inner();
  let ctx_data = ContextData::new(OperatorSigninCtxData::new(
    app_state.db_pool.clone(),
    app_state.config.session_ttl,
    email,
    password,
  ));

  match app_state.app_workflows.run(ctx_data.clone()).await? {
    PipelineResult::Completed => {}
    PipelineResult::Stopped => {
      warn!("Operator sign-in pipeline stopped without a result.");
      return Err(AppError::Internal("Sign-in was halted by an internal step.".to_string()));
    }
  }

  let session = ctx_data
    .read()
    .session
    .clone()
    .ok_or_else(|| AppError::Internal("Sign-in completed without issuing a session.".to_string()))?;

  let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
  let cookie = Cookie::build(OPERATOR_SESSION_COOKIE, session.token.clone())
    .path("/")
    .http_only(true)
    .same_site(SameSite::Strict)
    .max_age(CookieDuration::seconds(max_age))
    .finish();

  info!(operator_id = %session.operator_id, "Operator session started.");
  Ok(HttpResponse::Ok().cookie(cookie).json(json!({
      "token": session.token,
      "operatorId": session.operator_id,
      "expiresAt": session.expires_at,
  })))
}

#[instrument(name = "handler::operator_signout", skip_all)]
pub async fn signout_handler(
  app_state: web::Data<AppState>,
  credential: OperatorCredential,
) -> Result<HttpResponse, AppError> {
  let revoked = session_service::revoke_session(&app_state.db_pool, credential.as_str(), Utc::now()).await?;
  info!(revoked, "Operator signed out.");

  let mut removal = Cookie::build(OPERATOR_SESSION_COOKIE, "").path("/").finish();
  removal.make_removal();
  Ok(HttpResponse::Ok().cookie(removal).json(json!({ "signedOut": true })))
}
