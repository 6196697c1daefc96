// fst_workflow/src/store/memory.rs

//! In-memory `OrderStore`, for tests and local runs. Nothing survives a restart.

use super::{ArchiveFilter, InsertOutcome, OrderStore, UpdateGuard};
use crate::error::StoreError;
use crate::model::{Order, OrderPatch, PaymentStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};
use uuid::Uuid;

/// Every mutation runs under the single write lock, which is what makes
/// `update_where` a compare-and-set here.
#[derive(Clone, Default)]
pub struct MemoryOrderStore {
  orders: Arc<RwLock<HashMap<Uuid, Order>>>,
}

impl MemoryOrderStore {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn len(&self) -> usize {
    self.orders.read().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.orders.read().await.is_empty()
  }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
  #[instrument(name = "memory_store::insert", skip_all, fields(order_id = %order.id))]
  async fn insert(&self, order: Order) -> Result<InsertOutcome, StoreError> {
    let mut orders = self.orders.write().await;
    if let Some(reference) = &order.payment_reference {
      if let Some(existing) = orders
        .values()
        .find(|o| o.payment_reference.as_deref() == Some(reference.as_str()))
      {
        debug!(existing_id = %existing.id, "Payment reference already recorded.");
        return Ok(InsertOutcome::Existing(existing.clone()));
      }
    }
    if orders.contains_key(&order.id) {
      return Err(StoreError::Backend(format!("duplicate order id {}", order.id)));
    }
    orders.insert(order.id, order.clone());
    Ok(InsertOutcome::Created(order))
  }

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
    Ok(self.orders.read().await.get(&id).cloned())
  }

  #[instrument(name = "memory_store::update_where", skip(self, patch), fields(order_id = %id))]
  async fn update_where(
    &self,
    id: Uuid,
    guard: &UpdateGuard,
    patch: &OrderPatch,
  ) -> Result<Option<Order>, StoreError> {
    let mut orders = self.orders.write().await;
    match orders.get_mut(&id) {
      Some(order) if guard.matches(order) => {
        patch.apply_to(order);
        Ok(Some(order.clone()))
      }
      _ => Ok(None),
    }
  }

  async fn archive_confirmed(&self, filter: &ArchiveFilter, now: DateTime<Utc>) -> Result<u64, StoreError> {
    let mut orders = self.orders.write().await;
    let mut moved = 0;
    for order in orders.values_mut() {
      if order.payment_status == PaymentStatus::Confirmed && filter.includes(&order.id) {
        order.payment_status = PaymentStatus::Archived;
        order.updated_at = now;
        moved += 1;
      }
    }
    Ok(moved)
  }

  async fn list_by_status(&self, statuses: &[PaymentStatus]) -> Result<Vec<Order>, StoreError> {
    let orders = self.orders.read().await;
    let mut selected: Vec<Order> = orders
      .values()
      .filter(|o| statuses.contains(&o.payment_status))
      .cloned()
      .collect();
    selected.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
    Ok(selected)
  }

  async fn sum_totals(&self, status: PaymentStatus) -> Result<Decimal, StoreError> {
    let orders = self.orders.read().await;
    Ok(
      orders
        .values()
        .filter(|o| o.payment_status == status)
        .map(|o| o.total)
        .sum(),
    )
  }
}
