// apps/storefront/src/models/order_row.rs

use chrono::{DateTime, Utc};
use fst_workflow::{Address, FulfillmentStatus, Order, PaymentStatus, StoreError};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// Column list shared by every query that returns whole orders.
pub const ORDER_COLUMNS: &str = "id, customer_email, total, currency, payment_status, fulfillment_status, \
  tracking_number, payment_reference, shipping_address, billing_address, payment_declared_at, \
  payment_confirmed_at, created_at, updated_at";

#[derive(Debug, Clone, FromRow)]
pub struct OrderRow {
  pub id: Uuid,
  pub customer_email: String,
  pub total: Decimal,
  pub currency: String,
  pub payment_status: String,
  pub fulfillment_status: String,
  pub tracking_number: Option<String>,
  pub payment_reference: Option<String>,
  pub shipping_address: Json<Address>,
  pub billing_address: Json<Address>,
  pub payment_declared_at: Option<DateTime<Utc>>,
  pub payment_confirmed_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
  type Error = StoreError;

  fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
    let payment_status = row
      .payment_status
      .parse::<PaymentStatus>()
      .map_err(|e| StoreError::Corrupt(format!("order {}: {}", row.id, e)))?;
    let fulfillment_status = row
      .fulfillment_status
      .parse::<FulfillmentStatus>()
      .map_err(|e| StoreError::Corrupt(format!("order {}: {}", row.id, e)))?;

    Ok(Order {
      id: row.id,
      customer_email: row.customer_email,
      total: row.total,
      currency: row.currency.trim().to_string(),
      payment_status,
      fulfillment_status,
      tracking_number: row.tracking_number,
      payment_reference: row.payment_reference,
      shipping_address: row.shipping_address.0,
      billing_address: row.billing_address.0,
      payment_declared_at: row.payment_declared_at,
      payment_confirmed_at: row.payment_confirmed_at,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}
