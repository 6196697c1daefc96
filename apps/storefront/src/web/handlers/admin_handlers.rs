// apps/storefront/src/web/handlers/admin_handlers.rs

//! Operator endpoints. Every handler takes an `OperatorCredential`; the workflow
//! verifies it.

use actix_web::{web, HttpResponse};
use fst_workflow::{ArchiveFilter, PaymentStatus};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::OperatorCredential;

pub const DEFAULT_LIST_STATUSES: [PaymentStatus; 2] = [PaymentStatus::Pending, PaymentStatus::Declared];

#[derive(Deserialize, Debug)]
pub struct ListOrdersQuery {
  /// Comma-separated payment statuses.
  pub status: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct TrackingPayload {
  pub tracking_number: String,
}

/// Exactly one of `all: true` or `orderIds` must be given.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BulkArchivePayload {
  #[serde(default)]
  pub all: bool,
  #[serde(default)]
  pub order_ids: Option<Vec<Uuid>>,
}

impl BulkArchivePayload {
  fn parse(body: &[u8]) -> Result<Self, AppError> {
    serde_json::from_slice(body).map_err(|e| AppError::Validation(format!("Invalid bulk archive body: {}", e)))
  }

  fn into_filter(self) -> Result<ArchiveFilter, AppError> {
    match (self.all, self.order_ids) {
      (true, None) => Ok(ArchiveFilter::AllConfirmed),
      (false, Some(ids)) if !ids.is_empty() => Ok(ArchiveFilter::Ids(ids)),
      (false, Some(_)) => Err(AppError::Validation("orderIds must not be empty.".to_string())),
      (true, Some(_)) => Err(AppError::Validation("Give either all or orderIds, not both.".to_string())),
      (false, None) => Err(AppError::Validation(
        "Bulk archive needs orderIds or an explicit all: true.".to_string(),
      )),
    }
  }
}

fn parse_statuses(raw: Option<&str>) -> Result<Vec<PaymentStatus>, AppError> {
  let raw = match raw.map(str::trim).filter(|s| !s.is_empty()) {
    Some(raw) => raw,
    None => return Ok(DEFAULT_LIST_STATUSES.to_vec()),
  };
  let mut statuses = Vec::new();
  for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
    let status = part.parse::<PaymentStatus>().map_err(AppError::Validation)?;
    if !statuses.contains(&status) {
      statuses.push(status);
    }
  }
  Ok(statuses)
}

#[instrument(name = "handler::list_orders", skip(app_state, credential))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  query: web::Query<ListOrdersQuery>,
  credential: OperatorCredential,
) -> Result<HttpResponse, AppError> {
  app_state.workflow.authorize(credential.as_str()).await?;
  let statuses = parse_statuses(query.status.as_deref())?;
  let orders = app_state.workflow.list_by_status(&statuses).await?;
  Ok(HttpResponse::Ok().json(orders))
}

#[instrument(name = "handler::confirm_payment", skip(app_state, credential), fields(order_id = %path))]
pub async fn confirm_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  credential: OperatorCredential,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .workflow
    .confirm_payment(path.into_inner(), credential.as_str())
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::reject_payment", skip(app_state, credential), fields(order_id = %path))]
pub async fn reject_payment_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  credential: OperatorCredential,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .workflow
    .reject_payment(path.into_inner(), credential.as_str())
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::assign_tracking", skip(app_state, credential, payload), fields(order_id = %path))]
pub async fn assign_tracking_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  credential: OperatorCredential,
  payload: web::Json<TrackingPayload>,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .workflow
    .assign_tracking(path.into_inner(), &payload.tracking_number, credential.as_str())
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::mark_delivered", skip(app_state, credential), fields(order_id = %path))]
pub async fn mark_delivered_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  credential: OperatorCredential,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .workflow
    .mark_delivered(path.into_inner(), credential.as_str())
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::archive_order", skip(app_state, credential), fields(order_id = %path))]
pub async fn archive_order_handler(
  app_state: web::Data<AppState>,
  path: web::Path<Uuid>,
  credential: OperatorCredential,
) -> Result<HttpResponse, AppError> {
  let order = app_state
    .workflow
    .reset_to_archived(path.into_inner(), credential.as_str())
    .await?;
  Ok(HttpResponse::Ok().json(order))
}

#[instrument(name = "handler::bulk_archive", skip(app_state, credential, body))]
pub async fn bulk_archive_handler(
  app_state: web::Data<AppState>,
  credential: OperatorCredential,
  body: web::Bytes,
) -> Result<HttpResponse, AppError> {
  let filter = BulkArchivePayload::parse(&body)?.into_filter()?;
  let archived = app_state.workflow.archive_confirmed(filter, credential.as_str()).await?;
  info!(archived, "Bulk archive finished.");
  Ok(HttpResponse::Ok().json(json!({ "archived": archived })))
}

#[instrument(name = "handler::confirmed_revenue", skip(app_state, credential))]
pub async fn confirmed_revenue_handler(
  app_state: web::Data<AppState>,
  credential: OperatorCredential,
) -> Result<HttpResponse, AppError> {
  app_state.workflow.authorize(credential.as_str()).await?;
  let revenue = app_state.workflow.confirmed_revenue().await?;
  Ok(HttpResponse::Ok().json(json!({ "confirmedRevenue": revenue })))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn status_filter_defaults_and_dedupes() {
    assert_eq!(parse_statuses(None).unwrap(), DEFAULT_LIST_STATUSES.to_vec());
    assert_eq!(parse_statuses(Some("  ")).unwrap(), DEFAULT_LIST_STATUSES.to_vec());
    assert_eq!(
      parse_statuses(Some("confirmed, Declared,confirmed")).unwrap(),
      vec![PaymentStatus::Confirmed, PaymentStatus::Declared]
    );
    assert!(matches!(parse_statuses(Some("pending,shipped")), Err(AppError::Validation(_))));
  }

  #[test]
  fn bulk_archive_body_must_name_its_scope() {
    let id = Uuid::new_v4();
    let targeted = format!(r#"{{"orderIds":["{}"]}}"#, id);
    assert!(matches!(
      BulkArchivePayload::parse(targeted.as_bytes()).and_then(BulkArchivePayload::into_filter),
      Ok(ArchiveFilter::Ids(ids)) if ids == vec![id]
    ));
    assert!(matches!(
      BulkArchivePayload::parse(br#"{"all":true}"#).and_then(BulkArchivePayload::into_filter),
      Ok(ArchiveFilter::AllConfirmed)
    ));

    let malformed: [&[u8]; 7] = [
      b"",
      b"{}",
      br#"{"all":false}"#,
      br#"{"order_ids":["00000000-0000-0000-0000-000000000001"]}"#,
      br#"{"orderIds":["not-a-uuid"]}"#,
      br#"{"orderIds":[]}"#,
      br#"{"all":true,"orderIds":["00000000-0000-0000-0000-000000000001"]}"#,
    ];
    for body in malformed {
      let result = BulkArchivePayload::parse(body).and_then(BulkArchivePayload::into_filter);
      assert!(
        matches!(result, Err(AppError::Validation(_))),
        "{:?} was accepted",
        String::from_utf8_lossy(body)
      );
    }
  }
}
