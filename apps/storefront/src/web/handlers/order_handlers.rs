// apps/storefront/src/web/handlers/order_handlers.rs

//! Customer-facing order endpoints. The caller is identified by `X-Customer-Email`.

use actix_web::{web, HttpResponse};
use fst_workflow::{Address, WorkflowError};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::CustomerEmail;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAddressesPayload {
  #[serde(default)]
  pub shipping_address: Option<Address>,
  #[serde(default)]
  pub billing_address: Option<Address>,
}

#[instrument(name = "handler::get_order", skip(app_state, customer), fields(order_id = %path))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  customer: CustomerEmail,
) -> Result<HttpResponse, AppError> {
  let order_id = path.into_inner();
  let order = app_state.workflow.get_order(order_id).await?;
  if !order.is_owned_by(&customer.0) {
    return Err(WorkflowError::unauthorized("Order belongs to another customer.").into());
  }
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::declare_payment", skip(app_state, customer), fields(order_id = %path))]
pub async fn declare_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  customer: CustomerEmail,
) -> Result<HttpResponse, AppError> {
  let order = app_state.workflow.declare_payment(path.into_inner(), &customer.0).await?;
  info!(order_id = %order.id, "Customer declared payment.");
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::update_addresses", skip(app_state, customer, payload), fields(order_id = %path))]
pub async fn update_addresses_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  customer: CustomerEmail,
  payload: web::Json<UpdateAddressesPayload>,
) -> Result<HttpResponse, AppError> {
  let UpdateAddressesPayload {
    shipping_address,
    billing_address,
  } = payload.into_inner();
  let order = app_state
    .workflow
    .update_addresses(path.into_inner(), &customer.0, shipping_address, billing_address)
    .await?;
  Ok(HttpResponse::Ok().json(order))
}
