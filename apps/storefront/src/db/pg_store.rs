// apps/storefront/src/db/pg_store.rs

//! Postgres-backed `OrderStore`. The authoritative store for every order.
//!
//! Transitions are single `UPDATE ... WHERE id = $1 AND payment_status = ANY($2) ... RETURNING`
//! statements; an empty result means the guard did not match.

use crate::models::order_row::ORDER_COLUMNS;
use crate::models::OrderRow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fst_workflow::{ArchiveFilter, InsertOutcome, Order, OrderPatch, OrderStore, PaymentStatus, StoreError, UpdateGuard};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, error, instrument};
use uuid::Uuid;

#[derive(Clone)]
pub struct PgOrderStore {
  pool: PgPool,
}

impl PgOrderStore {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

fn backend(op: &'static str) -> impl FnOnce(sqlx::Error) -> StoreError {
  move |e| {
    error!(operation = op, error = %e, "Order store query failed.");
    StoreError::Backend(format!("{}: {}", op, e))
  }
}

fn status_strings<S: AsRef<str>>(statuses: impl IntoIterator<Item = S>) -> Vec<String> {
  statuses.into_iter().map(|s| s.as_ref().to_string()).collect()
}

#[async_trait]
impl OrderStore for PgOrderStore {
  #[instrument(name = "pg_store::insert", skip_all, fields(order_id = %order.id))]
  async fn insert(&self, order: Order) -> Result<InsertOutcome, StoreError> {
    let sql = format!(
      "INSERT INTO orders ({ORDER_COLUMNS}) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14) \
       ON CONFLICT (payment_reference) DO NOTHING \
       RETURNING {ORDER_COLUMNS}"
    );
    let inserted = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(order.id)
      .bind(&order.customer_email)
      .bind(order.total)
      .bind(&order.currency)
      .bind(order.payment_status.as_str())
      .bind(order.fulfillment_status.as_str())
      .bind(&order.tracking_number)
      .bind(&order.payment_reference)
      .bind(Json(&order.shipping_address))
      .bind(Json(&order.billing_address))
      .bind(order.payment_declared_at)
      .bind(order.payment_confirmed_at)
      .bind(order.created_at)
      .bind(order.updated_at)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend("insert_order"))?;

    if let Some(row) = inserted {
      return Ok(InsertOutcome::Created(Order::try_from(row)?));
    }

    // Conflict on payment_reference: the capture event was already recorded.
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE payment_reference = $1");
    let existing = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(&order.payment_reference)
      .fetch_one(&self.pool)
      .await
      .map_err(backend("load_by_reference"))?;
    debug!(existing_id = %existing.id, "Payment reference already recorded.");
    Ok(InsertOutcome::Existing(Order::try_from(existing)?))
  }

  #[instrument(name = "pg_store::get", skip(self))]
  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1");
    sqlx::query_as::<_, OrderRow>(&sql)
      .bind(id)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend("get_order"))?
      .map(Order::try_from)
      .transpose()
  }

  #[instrument(name = "pg_store::update_where", skip(self, patch), fields(order_id = %id))]
  async fn update_where(
    &self,
    id: Uuid,
    guard: &UpdateGuard,
    patch: &OrderPatch,
  ) -> Result<Option<Order>, StoreError> {
    let sql = format!(
      "UPDATE orders SET \
         payment_status = COALESCE($3, payment_status), \
         fulfillment_status = COALESCE($4, fulfillment_status), \
         tracking_number = COALESCE($5, tracking_number), \
         payment_declared_at = COALESCE($6, payment_declared_at), \
         payment_confirmed_at = COALESCE($7, payment_confirmed_at), \
         shipping_address = COALESCE($8, shipping_address), \
         billing_address = COALESCE($9, billing_address), \
         updated_at = COALESCE($10, updated_at) \
       WHERE id = $1 \
         AND payment_status = ANY($2) \
         AND ($11::text[] IS NULL OR fulfillment_status = ANY($11)) \
         AND ($12::text IS NULL OR lower(btrim(customer_email)) = lower(btrim($12))) \
       RETURNING {ORDER_COLUMNS}"
    );

    let payment_statuses = status_strings(guard.payment_statuses.iter().map(|s| s.as_str()));
    let fulfillment_statuses = guard
      .fulfillment_statuses
      .as_ref()
      .map(|statuses| status_strings(statuses.iter().map(|s| s.as_str())));

    let row = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(id)
      .bind(payment_statuses)
      .bind(patch.payment_status.map(|s| s.as_str()))
      .bind(patch.fulfillment_status.map(|s| s.as_str()))
      .bind(&patch.tracking_number)
      .bind(patch.payment_declared_at)
      .bind(patch.payment_confirmed_at)
      .bind(patch.shipping_address.as_ref().map(Json))
      .bind(patch.billing_address.as_ref().map(Json))
      .bind(patch.updated_at)
      .bind(fulfillment_statuses)
      .bind(&guard.owner_email)
      .fetch_optional(&self.pool)
      .await
      .map_err(backend("update_order"))?;

    row.map(Order::try_from).transpose()
  }

  #[instrument(name = "pg_store::archive_confirmed", skip(self))]
  async fn archive_confirmed(&self, filter: &ArchiveFilter, now: DateTime<Utc>) -> Result<u64, StoreError> {
    let result = match filter {
      ArchiveFilter::AllConfirmed => {
        sqlx::query("UPDATE orders SET payment_status = 'archived', updated_at = $1 WHERE payment_status = 'confirmed'")
          .bind(now)
          .execute(&self.pool)
          .await
      }
      ArchiveFilter::Ids(ids) => {
        sqlx::query(
          "UPDATE orders SET payment_status = 'archived', updated_at = $1 \
           WHERE payment_status = 'confirmed' AND id = ANY($2)",
        )
        .bind(now)
        .bind(ids.as_slice())
        .execute(&self.pool)
        .await
      }
    };
    Ok(result.map_err(backend("archive_confirmed"))?.rows_affected())
  }

  #[instrument(name = "pg_store::list_by_status", skip(self))]
  async fn list_by_status(&self, statuses: &[PaymentStatus]) -> Result<Vec<Order>, StoreError> {
    let sql = format!(
      "SELECT {ORDER_COLUMNS} FROM orders WHERE payment_status = ANY($1) ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
      .bind(status_strings(statuses.iter().map(|s| s.as_str())))
      .fetch_all(&self.pool)
      .await
      .map_err(backend("list_orders"))?;
    rows.into_iter().map(Order::try_from).collect()
  }

  #[instrument(name = "pg_store::sum_totals", skip(self))]
  async fn sum_totals(&self, status: PaymentStatus) -> Result<Decimal, StoreError> {
    sqlx::query_scalar::<_, Decimal>("SELECT COALESCE(SUM(total), 0) FROM orders WHERE payment_status = $1")
      .bind(status.as_str())
      .fetch_one(&self.pool)
      .await
      .map_err(backend("sum_totals"))
  }
}
