// fst_workflow/src/store/mod.rs

//! The persistence boundary of the workflow.
//!
//! A single authoritative store holds every order. The workflow's correctness rests
//! on `OrderStore::update_where` being an atomic compare-and-set: the guard is
//! evaluated and the patch applied as one indivisible step, so two concurrent
//! callers expecting the same prior state cannot both succeed.

use crate::error::StoreError;
use crate::model::{FulfillmentStatus, Order, OrderPatch, PaymentStatus};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

pub mod memory;

pub use memory::MemoryOrderStore;

/// Preconditions a conditional write is keyed on, besides the order id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateGuard {
  /// The stored payment status must be one of these.
  pub payment_statuses: Vec<PaymentStatus>,
  /// When set, the stored fulfillment status must be one of these.
  pub fulfillment_statuses: Option<Vec<FulfillmentStatus>>,
  /// When set, the order must belong to this customer (case-insensitive).
  pub owner_email: Option<String>,
}

impl UpdateGuard {
  pub fn payment_is(status: PaymentStatus) -> Self {
    Self::payment_in(&[status])
  }

  pub fn payment_in(statuses: &[PaymentStatus]) -> Self {
    UpdateGuard {
      payment_statuses: statuses.to_vec(),
      fulfillment_statuses: None,
      owner_email: None,
    }
  }

  pub fn owned_by(mut self, email: impl Into<String>) -> Self {
    self.owner_email = Some(email.into());
    self
  }

  pub fn fulfillment_in(mut self, statuses: &[FulfillmentStatus]) -> Self {
    self.fulfillment_statuses = Some(statuses.to_vec());
    self
  }

  pub fn matches(&self, order: &Order) -> bool {
    if !self.payment_statuses.contains(&order.payment_status) {
      return false;
    }
    if let Some(fulfillment) = &self.fulfillment_statuses {
      if !fulfillment.contains(&order.fulfillment_status) {
        return false;
      }
    }
    match &self.owner_email {
      Some(email) => order.is_owned_by(email),
      None => true,
    }
  }
}

/// Which confirmed orders a bulk archive should move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveFilter {
  AllConfirmed,
  Ids(Vec<Uuid>),
}

impl ArchiveFilter {
  pub fn includes(&self, id: &Uuid) -> bool {
    match self {
      ArchiveFilter::AllConfirmed => true,
      ArchiveFilter::Ids(ids) => ids.contains(id),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
  Created(Order),
  /// An order with the same payment reference already existed; it is returned untouched.
  Existing(Order),
}

impl InsertOutcome {
  pub fn into_order(self) -> Order {
    match self {
      InsertOutcome::Created(order) | InsertOutcome::Existing(order) => order,
    }
  }

  pub fn order(&self) -> &Order {
    match self {
      InsertOutcome::Created(order) | InsertOutcome::Existing(order) => order,
    }
  }

  pub fn was_created(&self) -> bool {
    matches!(self, InsertOutcome::Created(_))
  }
}

/// Backend-agnostic order persistence.
///
/// Implementations must not cache reads: every call observes the latest durable state.
#[async_trait]
pub trait OrderStore: Send + Sync {
  /// Persists a new order, deduplicating on `payment_reference` when present.
  async fn insert(&self, order: Order) -> Result<InsertOutcome, StoreError>;

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

  /// Applies `patch` only if the stored order satisfies `guard`, atomically.
  /// Returns the updated order, or `None` when no order matched (missing id or failed guard).
  async fn update_where(
    &self,
    id: Uuid,
    guard: &UpdateGuard,
    patch: &OrderPatch,
  ) -> Result<Option<Order>, StoreError>;

  /// Moves every `confirmed` order selected by `filter` to `archived`. Returns how many moved.
  async fn archive_confirmed(&self, filter: &ArchiveFilter, now: DateTime<Utc>) -> Result<u64, StoreError>;

  /// Orders whose payment status is in `statuses`, newest first.
  async fn list_by_status(&self, statuses: &[PaymentStatus]) -> Result<Vec<Order>, StoreError>;

  /// Sum of `total` across orders currently in `status`.
  async fn sum_totals(&self, status: PaymentStatus) -> Result<Decimal, StoreError>;
}
