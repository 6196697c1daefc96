// tests/common/mod.rs
#![allow(dead_code)] // Not every test binary uses every fixture

use anyhow::anyhow;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use fst_workflow::{
  Address, ArchiveFilter, Clock, InsertOutcome, MemoryOrderStore, NewOrder, Notifier, OperatorIdentity,
  OperatorVerifier, Order, OrderEvent, OrderPatch, OrderStore, OrderWorkflow, PaymentStatus, StoreError, UpdateGuard,
  WorkflowConfig, WorkflowError, WorkflowServices,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;
use uuid::Uuid;

pub const OPERATOR_TOKEN: &str = "op-token-valid";
pub const EXPIRED_TOKEN: &str = "op-token-expired";
pub const OPERATOR_ID: &str = "operator-1";

// --- Tracing ---
use once_cell::sync::Lazy;
static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Clock ---

/// Advances one second on every read, so successive timestamps are strictly increasing.
pub struct TickingClock {
  next: AtomicI64,
}

impl TickingClock {
  pub fn starting_at(start: DateTime<Utc>) -> Self {
    TickingClock {
      next: AtomicI64::new(start.timestamp()),
    }
  }
}

impl Default for TickingClock {
  fn default() -> Self {
    Self::starting_at(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap())
  }
}

impl Clock for TickingClock {
  fn now(&self) -> DateTime<Utc> {
    let secs = self.next.fetch_add(1, Ordering::SeqCst);
    Utc.timestamp_opt(secs, 0).unwrap()
  }
}

// --- Operator verification ---

pub struct StaticVerifier {
  identities: HashMap<String, OperatorIdentity>,
}

impl StaticVerifier {
  pub fn new() -> Self {
    let mut identities = HashMap::new();
    identities.insert(
      OPERATOR_TOKEN.to_string(),
      OperatorIdentity {
        operator_id: OPERATOR_ID.to_string(),
        expires_at: Utc.with_ymd_and_hms(2100, 1, 1, 0, 0, 0).unwrap(),
      },
    );
    // Still returned by the verifier; the workflow must refuse it on expiry alone.
    identities.insert(
      EXPIRED_TOKEN.to_string(),
      OperatorIdentity {
        operator_id: "operator-stale".to_string(),
        expires_at: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
      },
    );
    StaticVerifier { identities }
  }
}

#[async_trait]
impl OperatorVerifier for StaticVerifier {
  async fn verify(&self, credential: &str) -> Result<OperatorIdentity, WorkflowError> {
    self
      .identities
      .get(credential)
      .cloned()
      .ok_or_else(|| WorkflowError::unauthorized("unknown operator credential"))
  }
}

// --- Notifiers ---

#[derive(Clone, Default)]
pub struct RecordingNotifier {
  pub events: Arc<Mutex<Vec<(&'static str, Uuid)>>>,
}

impl RecordingNotifier {
  pub fn recorded(&self) -> Vec<(&'static str, Uuid)> {
    self.events.lock().clone()
  }

  /// Notifications run on spawned tasks; poll until `count` have arrived.
  pub async fn wait_for(&self, count: usize) -> Vec<(&'static str, Uuid)> {
    for _ in 0..100 {
      if self.events.lock().len() >= count {
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    self.recorded()
  }
}

#[async_trait]
impl Notifier for RecordingNotifier {
  async fn notify(&self, event: &OrderEvent) -> anyhow::Result<()> {
    self.events.lock().push((event.kind(), event.order().id));
    Ok(())
  }
}

pub struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
  async fn notify(&self, _event: &OrderEvent) -> anyhow::Result<()> {
    Err(anyhow!("mail relay refused connection"))
  }
}

// --- Stores ---

/// Delays every call by `delay` before delegating to the inner memory store.
pub struct SlowStore {
  pub inner: MemoryOrderStore,
  pub delay: Duration,
}

#[async_trait]
impl OrderStore for SlowStore {
  async fn insert(&self, order: Order) -> Result<InsertOutcome, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.insert(order).await
  }

  async fn get(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.get(id).await
  }

  async fn update_where(
    &self,
    id: Uuid,
    guard: &UpdateGuard,
    patch: &OrderPatch,
  ) -> Result<Option<Order>, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.update_where(id, guard, patch).await
  }

  async fn archive_confirmed(&self, filter: &ArchiveFilter, now: DateTime<Utc>) -> Result<u64, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.archive_confirmed(filter, now).await
  }

  async fn list_by_status(&self, statuses: &[PaymentStatus]) -> Result<Vec<Order>, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.list_by_status(statuses).await
  }

  async fn sum_totals(&self, status: PaymentStatus) -> Result<Decimal, StoreError> {
    tokio::time::sleep(self.delay).await;
    self.inner.sum_totals(status).await
  }
}

// --- Data ---

pub fn address(name: &str) -> Address {
  Address {
    name: name.to_string(),
    line1: "221B Baker Street".to_string(),
    line2: None,
    city: "London".to_string(),
    region: None,
    postal_code: "NW1 6XE".to_string(),
    country: "GB".to_string(),
  }
}

pub fn new_order(email: &str, total: &str) -> NewOrder {
  NewOrder {
    customer_email: email.to_string(),
    total: Decimal::from_str(total).unwrap(),
    currency: "EUR".to_string(),
    payment_reference: None,
    shipping_address: address("Ada Lovelace"),
    billing_address: address("Ada Lovelace"),
  }
}

// --- Harness ---

pub struct Harness {
  pub workflow: OrderWorkflow,
  pub store: MemoryOrderStore,
  pub notifier: RecordingNotifier,
}

impl Harness {
  pub fn new() -> Self {
    setup_tracing();
    let store = MemoryOrderStore::new();
    let notifier = RecordingNotifier::default();
    let services = WorkflowServices::new(
      Arc::new(store.clone()),
      Arc::new(StaticVerifier::new()),
      Arc::new(notifier.clone()),
    )
    .with_clock(Arc::new(TickingClock::default()))
    .with_config(WorkflowConfig {
      store_timeout: Duration::from_secs(2),
    });
    Harness {
      workflow: OrderWorkflow::new(services),
      store,
      notifier,
    }
  }

  pub async fn pending_order(&self, email: &str, total: &str) -> Order {
    self.workflow.record_checkout(new_order(email, total)).await.unwrap()
  }

  pub async fn declared_order(&self, email: &str, total: &str) -> Order {
    let order = self.pending_order(email, total).await;
    self.workflow.declare_payment(order.id, email).await.unwrap()
  }

  pub async fn confirmed_order(&self, email: &str, total: &str) -> Order {
    let order = self.declared_order(email, total).await;
    self.workflow.confirm_payment(order.id, OPERATOR_TOKEN).await.unwrap()
  }
}
