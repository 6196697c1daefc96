// fst_workflow/src/services/auth.rs

//! Operator capability verification.
//!
//! Every operator-facing operation goes through one `OperatorVerifier`; call sites
//! never decode credentials themselves.

use crate::error::WorkflowError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Who an operator credential belongs to, and until when it is good.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorIdentity {
  pub operator_id: String,
  pub expires_at: DateTime<Utc>,
}

impl OperatorIdentity {
  pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
    self.expires_at <= now
  }
}

#[async_trait]
pub trait OperatorVerifier: Send + Sync {
  /// Resolves an opaque credential (session token, capability token...) to an identity.
  /// Unknown or revoked credentials are `WorkflowError::Unauthorized`.
  async fn verify(&self, credential: &str) -> Result<OperatorIdentity, WorkflowError>;
}
