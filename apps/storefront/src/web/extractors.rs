// apps/storefront/src/web/extractors.rs

//! Request identities. Extraction only reads the raw credential; whether it is
//! any good is decided by the workflow's `OperatorVerifier`.

use crate::errors::AppError;
use actix_web::http::header::{HeaderMap, AUTHORIZATION};
use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::debug;

pub const OPERATOR_SESSION_COOKIE: &str = "operator_session";
pub const CUSTOMER_EMAIL_HEADER: &str = "X-Customer-Email";

/// Raw operator session token from `Authorization: Bearer` or the session cookie.
/// The header wins when both are present.
#[derive(Debug, Clone)]
pub struct OperatorCredential(pub String);

impl OperatorCredential {
  pub fn as_str(&self) -> &str {
    &self.0
  }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
  let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
  let (scheme, token) = value.trim().split_once(' ')?;
  if !scheme.eq_ignore_ascii_case("bearer") {
    return None;
  }
  Some(token.trim().to_string()).filter(|t| !t.is_empty())
}

impl FromRequest for OperatorCredential {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let token = bearer_token(req.headers()).or_else(|| {
      req
        .cookie(OPERATOR_SESSION_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|v| !v.is_empty())
    });

    match token {
      Some(token) => ready(Ok(OperatorCredential(token))),
      None => {
        debug!("Operator request without a session token.");
        ready(Err(AppError::Auth("Operator session required.".to_string())))
      }
    }
  }
}

/// Customer email asserted by the upstream identity provider.
#[derive(Debug, Clone)]
pub struct CustomerEmail(pub String);

impl FromRequest for CustomerEmail {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let email = req
      .headers()
      .get(CUSTOMER_EMAIL_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(|v| v.trim().to_string())
      .filter(|v| !v.is_empty());

    ready(match email {
      Some(email) => Ok(CustomerEmail(email)),
      None => Err(AppError::Auth("Customer identity required.".to_string())),
    })
  }
}
