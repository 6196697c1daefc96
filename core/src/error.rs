// fst_workflow/src/error.rs
use crate::model::{FulfillmentStatus, OrderAction, PaymentStatus};
use thiserror::Error;
use uuid::Uuid;

/// Failures surfaced by workflow operations.
///
/// Every variant except `StoreUnavailable` is a precondition violation: retrying
/// the same call with the same inputs will fail the same way.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("Order not found: {order_id}")]
  NotFound { order_id: Uuid },

  #[error("Unauthorized: {reason}")]
  Unauthorized { reason: String },

  #[error("Cannot {action} order {order_id} (payment: {payment}, fulfillment: {fulfillment})")]
  InvalidTransition {
    order_id: Uuid,
    action: OrderAction,
    payment: PaymentStatus,
    fulfillment: FulfillmentStatus,
  },

  #[error("Payment for order {order_id} was already declared (status: {current})")]
  AlreadyDeclared { order_id: Uuid, current: PaymentStatus },

  #[error("Invalid input: {0}")]
  InvalidInput(String),

  #[error("Order store unavailable: {0}")]
  StoreUnavailable(String),

  /// Never returned from an operation; produced by the notification task and logged.
  #[error("Notification for order {order_id} failed. Source: {source}")]
  NotificationFailed {
    order_id: Uuid,
    #[source]
    source: anyhow::Error,
  },

  #[error("Internal workflow error: {0}")]
  Internal(String),
}

impl WorkflowError {
  pub fn unauthorized(reason: impl Into<String>) -> Self {
    WorkflowError::Unauthorized { reason: reason.into() }
  }

  /// Only a store outage is worth retrying without changing inputs, and even then
  /// the caller must re-read the order first: the write may have landed.
  pub fn is_retryable(&self) -> bool {
    matches!(self, WorkflowError::StoreUnavailable(_))
  }

  /// Stable machine-readable identifier, used by transports in error bodies.
  pub fn code(&self) -> &'static str {
    match self {
      WorkflowError::NotFound { .. } => "not_found",
      WorkflowError::Unauthorized { .. } => "unauthorized",
      WorkflowError::InvalidTransition { .. } => "invalid_transition",
      WorkflowError::AlreadyDeclared { .. } => "already_declared",
      WorkflowError::InvalidInput(_) => "invalid_input",
      WorkflowError::StoreUnavailable(_) => "store_unavailable",
      WorkflowError::NotificationFailed { .. } => "notification_failed",
      WorkflowError::Internal(_) => "internal",
    }
  }
}

/// Errors reported by `OrderStore` backends.
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("Backend error: {0}")]
  Backend(String),

  #[error("Stored record is malformed: {0}")]
  Corrupt(String),

  #[error("Store call timed out after {0:?}")]
  Timeout(std::time::Duration),
}

impl From<StoreError> for WorkflowError {
  fn from(err: StoreError) -> Self {
    WorkflowError::StoreUnavailable(err.to_string())
  }
}

pub type WorkflowResult<T, E = WorkflowError> = std::result::Result<T, E>;
