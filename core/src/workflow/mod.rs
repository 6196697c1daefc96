// fst_workflow/src/workflow/mod.rs

//! The Order Status Workflow.
//!
//! `OrderWorkflow` owns one pipeline per operation and the collaborators those
//! pipelines need. Every state change goes through a conditional store write
//! keyed on the expected prior state, so the workflow itself holds no per-order
//! state and needs no locking of its own.

pub mod archive;
pub(crate) mod common_steps;
pub mod contexts;
pub mod customer;
pub mod fulfillment;
pub mod review;

use crate::error::WorkflowError;
use crate::model::{Address, NewOrder, Order, PaymentStatus, Transition};
use crate::pipeline::{ContextData, PipelineResult, Workflows};
use crate::services::{Clock, Notifier, OperatorIdentity, OperatorVerifier, SystemClock};
use crate::store::{ArchiveFilter, OrderStore};
use contexts::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{info, instrument};
use uuid::Uuid;

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct WorkflowConfig {
  /// Upper bound on any single store or verifier call.
  pub store_timeout: Duration,
}

impl Default for WorkflowConfig {
  fn default() -> Self {
    WorkflowConfig {
      store_timeout: DEFAULT_STORE_TIMEOUT,
    }
  }
}

/// Collaborators handed to every pipeline run. Cheap to clone.
#[derive(Clone)]
pub struct WorkflowServices {
  pub store: Arc<dyn OrderStore>,
  pub verifier: Arc<dyn OperatorVerifier>,
  pub notifier: Arc<dyn Notifier>,
  pub clock: Arc<dyn Clock>,
  pub config: Arc<WorkflowConfig>,
  /// Receives every `NotificationFailed`, for callers that want to retry or alert.
  pub notification_failures: Option<mpsc::UnboundedSender<WorkflowError>>,
}

impl WorkflowServices {
  pub fn new(store: Arc<dyn OrderStore>, verifier: Arc<dyn OperatorVerifier>, notifier: Arc<dyn Notifier>) -> Self {
    WorkflowServices {
      store,
      verifier,
      notifier,
      clock: Arc::new(SystemClock),
      config: Arc::new(WorkflowConfig::default()),
      notification_failures: None,
    }
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn with_config(mut self, config: WorkflowConfig) -> Self {
    self.config = Arc::new(config);
    self
  }

  pub fn with_notification_failures(mut self, tx: mpsc::UnboundedSender<WorkflowError>) -> Self {
    self.notification_failures = Some(tx);
    self
  }
}

pub struct OrderWorkflow {
  services: WorkflowServices,
  workflows: Workflows,
}

impl OrderWorkflow {
  pub fn new(services: WorkflowServices) -> Self {
    let workflows = Workflows::new();
    customer::register_record_checkout_pipeline(&workflows);
    customer::register_declare_payment_pipeline(&workflows);
    customer::register_update_addresses_pipeline(&workflows);
    review::register_payment_review_pipeline(&workflows);
    fulfillment::register_assign_tracking_pipeline(&workflows);
    fulfillment::register_mark_delivered_pipeline(&workflows);
    archive::register_archive_order_pipeline(&workflows);
    archive::register_bulk_archive_pipeline(&workflows);
    info!("Order workflow pipelines registered.");

    OrderWorkflow { services, workflows }
  }

  pub fn services(&self) -> &WorkflowServices {
    &self.services
  }

  /// Runs the pipeline for `T`, then pulls the operation's result out of the context.
  async fn execute<T, R>(&self, ctx: T, take: impl FnOnce(&mut T) -> Option<R> + Send) -> Result<R, WorkflowError>
  where
    T: Send + Sync + 'static,
  {
    let ctx_data = ContextData::new(ctx);
    match self.workflows.run(ctx_data.clone()).await? {
      PipelineResult::Completed => {
        let mut guard = ctx_data.write();
        take(&mut guard).ok_or_else(|| {
          WorkflowError::Internal(format!(
            "pipeline for {} completed without a result",
            std::any::type_name::<T>()
          ))
        })
      }
      PipelineResult::Stopped => Err(WorkflowError::Internal(format!(
        "pipeline for {} stopped before completing",
        std::any::type_name::<T>()
      ))),
    }
  }

  /// Creates the order for a captured payment. A repeated capture event with the same
  /// payment reference returns the order recorded the first time.
  #[instrument(name = "workflow::record_checkout", skip_all, fields(customer = %new_order.customer_email))]
  pub async fn record_checkout(&self, new_order: NewOrder) -> Result<Order, WorkflowError> {
    let ctx = RecordCheckoutCtxData {
      services: self.services.clone(),
      new_order,
      outcome: None,
    };
    let outcome = self.execute(ctx, |c| c.outcome.take()).await?;
    Ok(outcome.into_order())
  }

  /// `pending -> declared`, by the order's owner. Succeeds at most once per order.
  #[instrument(name = "workflow::declare_payment", skip(self))]
  pub async fn declare_payment(&self, order_id: Uuid, requester_email: &str) -> Result<Order, WorkflowError> {
    let ctx = DeclarePaymentCtxData {
      services: self.services.clone(),
      order_id,
      requester_email: requester_email.to_string(),
      declared_order: None,
    };
    self.execute(ctx, |c| c.declared_order.take()).await
  }

  #[instrument(name = "workflow::update_addresses", skip(self, shipping_address, billing_address))]
  pub async fn update_addresses(
    &self,
    order_id: Uuid,
    requester_email: &str,
    shipping_address: Option<Address>,
    billing_address: Option<Address>,
  ) -> Result<Order, WorkflowError> {
    let ctx = UpdateAddressesCtxData {
      services: self.services.clone(),
      order_id,
      requester_email: requester_email.to_string(),
      shipping_address,
      billing_address,
      updated_order: None,
    };
    self.execute(ctx, |c| c.updated_order.take()).await
  }

  #[instrument(name = "workflow::confirm_payment", skip(self, credential))]
  pub async fn confirm_payment(&self, order_id: Uuid, credential: &str) -> Result<Order, WorkflowError> {
    self.review(order_id, credential, Transition::Confirm).await
  }

  #[instrument(name = "workflow::reject_payment", skip(self, credential))]
  pub async fn reject_payment(&self, order_id: Uuid, credential: &str) -> Result<Order, WorkflowError> {
    self.review(order_id, credential, Transition::Reject).await
  }

  async fn review(&self, order_id: Uuid, credential: &str, decision: Transition) -> Result<Order, WorkflowError> {
    let ctx = PaymentReviewCtxData {
      services: self.services.clone(),
      order_id,
      credential: credential.to_string(),
      decision,
      operator: None,
      reviewed_order: None,
    };
    self.execute(ctx, |c| c.reviewed_order.take()).await
  }

  #[instrument(name = "workflow::assign_tracking", skip(self, credential))]
  pub async fn assign_tracking(
    &self,
    order_id: Uuid,
    tracking_number: &str,
    credential: &str,
  ) -> Result<Order, WorkflowError> {
    let ctx = AssignTrackingCtxData {
      services: self.services.clone(),
      order_id,
      credential: credential.to_string(),
      tracking_number: tracking_number.to_string(),
      operator: None,
      shipped_order: None,
    };
    self.execute(ctx, |c| c.shipped_order.take()).await
  }

  #[instrument(name = "workflow::mark_delivered", skip(self, credential))]
  pub async fn mark_delivered(&self, order_id: Uuid, credential: &str) -> Result<Order, WorkflowError> {
    let ctx = MarkDeliveredCtxData {
      services: self.services.clone(),
      order_id,
      credential: credential.to_string(),
      operator: None,
      delivered_order: None,
    };
    self.execute(ctx, |c| c.delivered_order.take()).await
  }

  /// `confirmed -> archived` for one order. The record stays readable by id.
  #[instrument(name = "workflow::reset_to_archived", skip(self, credential))]
  pub async fn reset_to_archived(&self, order_id: Uuid, credential: &str) -> Result<Order, WorkflowError> {
    let ctx = ArchiveOrderCtxData {
      services: self.services.clone(),
      order_id,
      credential: credential.to_string(),
      operator: None,
      archived_order: None,
    };
    self.execute(ctx, |c| c.archived_order.take()).await
  }

  /// Bulk form of `reset_to_archived`. Orders in `filter` that are not `confirmed`
  /// are left alone and not counted.
  #[instrument(name = "workflow::archive_confirmed", skip(self, credential))]
  pub async fn archive_confirmed(&self, filter: ArchiveFilter, credential: &str) -> Result<u64, WorkflowError> {
    let ctx = BulkArchiveCtxData {
      services: self.services.clone(),
      filter,
      credential: credential.to_string(),
      operator: None,
      archived_count: 0,
    };
    self.execute(ctx, |c| Some(c.archived_count)).await
  }

  /// Orders in any of `statuses`, newest first. Always read from the store.
  #[instrument(name = "workflow::list_by_status", skip(self))]
  pub async fn list_by_status(&self, statuses: &[PaymentStatus]) -> Result<Vec<Order>, WorkflowError> {
    common_steps::bounded(&self.services, "list_by_status", self.services.store.list_by_status(statuses)).await
  }

  #[instrument(name = "workflow::get_order", skip(self))]
  pub async fn get_order(&self, order_id: Uuid) -> Result<Order, WorkflowError> {
    common_steps::bounded(&self.services, "get_order", self.services.store.get(order_id))
      .await?
      .ok_or(WorkflowError::NotFound { order_id })
  }

  /// Sum of totals over `confirmed` orders only.
  #[instrument(name = "workflow::confirmed_revenue", skip(self))]
  pub async fn confirmed_revenue(&self) -> Result<Decimal, WorkflowError> {
    common_steps::bounded(
      &self.services,
      "sum_totals",
      self.services.store.sum_totals(PaymentStatus::Confirmed),
    )
    .await
  }

  /// Verifies an operator credential without performing any transition.
  pub async fn authorize(&self, credential: &str) -> Result<OperatorIdentity, WorkflowError> {
    common_steps::authorize(&self.services, credential).await
  }
}
