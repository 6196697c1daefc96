// apps/storefront/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use fst_workflow::WorkflowError;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error(transparent)]
  Workflow(#[from] WorkflowError),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Stable identifier carried in every error body.
  pub fn code(&self) -> &'static str {
    match self {
      AppError::Validation(_) => "invalid_input",
      AppError::Auth(_) => "unauthorized",
      AppError::Config(_) => "configuration",
      AppError::Sqlx(_) => "database",
      AppError::Workflow(source) => source.code(),
      AppError::Internal(_) => "internal",
    }
  }

  /// Message safe to show to a client. Backend details stay in the logs.
  fn public_message(&self) -> String {
    match self {
      AppError::Sqlx(_) => "Database operation failed.".to_string(),
      AppError::Config(_) | AppError::Internal(_) => "An internal error occurred.".to_string(),
      AppError::Workflow(WorkflowError::StoreUnavailable(_)) => {
        "Order store is temporarily unavailable; re-check the order before retrying.".to_string()
      }
      AppError::Workflow(WorkflowError::Internal(_)) => "An internal error occurred.".to_string(),
      other => other.to_string(),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      AppError::Workflow(source) => match source {
        WorkflowError::NotFound { .. } => StatusCode::NOT_FOUND,
        WorkflowError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
        WorkflowError::InvalidTransition { .. } | WorkflowError::AlreadyDeclared { .. } => StatusCode::CONFLICT,
        WorkflowError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        WorkflowError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        WorkflowError::NotificationFailed { .. } | WorkflowError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, code = self.code(), "Responding with error");
    } else {
      tracing::info!(application_error = %self, code = self.code(), "Responding with client error");
    }
    HttpResponse::build(status).json(json!({
      "error": self.public_message(),
      "code": self.code(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
