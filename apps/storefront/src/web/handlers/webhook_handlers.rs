// apps/storefront/src/web/handlers/webhook_handlers.rs

//! Payment-processor callbacks. A captured payment creates the `pending` order.

use actix_web::{web, HttpRequest, HttpResponse};
use fst_workflow::NewOrder;
use serde::Deserialize;
use serde_json::json;
use subtle::ConstantTimeEq;
use tracing::{info, instrument, warn};

use crate::errors::AppError;
use crate::state::AppState;

pub const WEBHOOK_SECRET_HEADER: &str = "X-Webhook-Secret";
pub const PAYMENT_CAPTURED: &str = "payment_captured";

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentWebhookPayload {
  pub event_type: String,
  #[serde(default)]
  pub data: Option<NewOrder>,
}

/// Empty secrets never match. Length still leaks; content does not.
fn secret_matches(presented: &str, expected: &str) -> bool {
  !presented.is_empty() && bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

#[instrument(
    name = "handler::payment_webhook",
    skip(app_state, req, payload),
    fields(event_type = %payload.event_type)
)]
pub async fn payment_webhook_handler(
  app_state: web::Data<AppState>,
  req: HttpRequest,
  payload: web::Json<PaymentWebhookPayload>,
) -> Result<HttpResponse, AppError> {
  let presented = req
    .headers()
    .get(WEBHOOK_SECRET_HEADER)
    .and_then(|v| v.to_str().ok())
    .unwrap_or_default();
  if !secret_matches(presented, &app_state.config.webhook_secret) {
    warn!("Payment webhook with a missing or wrong secret.");
    return Err(AppError::Auth("Webhook secret mismatch.".to_string()));
  }

  let PaymentWebhookPayload { event_type, data } = payload.into_inner();
  if event_type != PAYMENT_CAPTURED {
    info!(%event_type, "Ignoring payment webhook event.");
    return Ok(HttpResponse::Ok().json(json!({ "received": true, "ignored": true })));
  }

  let new_order = data.ok_or_else(|| AppError::Validation("payment_captured event carries no order data.".to_string()))?;
  // Redeliveries are deduplicated on the reference, so one is mandatory here.
  if new_order.payment_reference.as_deref().map(str::trim).unwrap_or_default().is_empty() {
    return Err(AppError::Validation("payment_captured event needs a paymentReference.".to_string()));
  }

  let order = app_state.workflow.record_checkout(new_order).await?;
  info!(order_id = %order.id, "Checkout recorded from payment webhook.");
  Ok(HttpResponse::Ok().json(json!({ "received": true, "orderId": order.id })))
}
