// apps/storefront/src/models/operator.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A staff account allowed to review payments and manage fulfillment.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Operator {
  pub id: Uuid,
  pub email: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub display_name: Option<String>,
  pub created_at: DateTime<Utc>,
}

/// A live session joined with the operator it belongs to.
#[derive(Debug, Clone, FromRow)]
pub struct OperatorSessionRow {
  pub operator_id: Uuid,
  pub operator_email: String,
  pub expires_at: DateTime<Utc>,
}
