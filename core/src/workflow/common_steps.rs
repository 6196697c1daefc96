// fst_workflow/src/workflow/common_steps.rs

//! Steps and helpers shared by several workflow pipelines.

use crate::error::{StoreError, WorkflowError};
use crate::model::{OrderAction, Transition};
use crate::pipeline::{ContextData, PipelineControl};
use crate::services::{OperatorIdentity, OrderEvent};
use crate::workflow::contexts::OperatorGated;
use crate::workflow::WorkflowServices;
use std::fmt::Display;
use std::future::Future;
use tracing::{debug, error, info, instrument, warn, Instrument};
use uuid::Uuid;

/// Runs one store (or verifier) call under the configured timeout.
///
/// A timeout fails closed with `StoreUnavailable`. Nothing here retries: after an
/// ambiguous timeout the write may or may not have landed, and only the caller can
/// decide to re-read and try again.
pub(crate) async fn bounded<T, E, F>(services: &WorkflowServices, call: &'static str, fut: F) -> Result<T, WorkflowError>
where
  F: Future<Output = Result<T, E>>,
  E: Into<WorkflowError> + Display,
{
  let limit = services.config.store_timeout;
  match tokio::time::timeout(limit, fut).await {
    Ok(Ok(value)) => Ok(value),
    Ok(Err(e)) => {
      debug!(call, error = %e, "Collaborator call returned an error.");
      Err(e.into())
    }
    Err(_) => {
      error!(call, timeout_ms = limit.as_millis() as u64, "Collaborator call timed out.");
      Err(StoreError::Timeout(limit).into())
    }
  }
}

/// Resolves an operator credential through the injected verifier and rejects expired identities.
pub(crate) async fn authorize(services: &WorkflowServices, credential: &str) -> Result<OperatorIdentity, WorkflowError> {
  if credential.trim().is_empty() {
    return Err(WorkflowError::unauthorized("operator credential is missing"));
  }
  let identity = bounded(services, "verify_operator", services.verifier.verify(credential)).await?;
  if identity.is_expired(services.clock.now()) {
    warn!(operator = %identity.operator_id, expired_at = %identity.expires_at, "Operator session expired.");
    return Err(WorkflowError::unauthorized("operator session has expired"));
  }
  Ok(identity)
}

#[instrument(name = "common_step::authorize_operator", skip(ctx_data))]
pub(crate) async fn authorize_operator_step<T: OperatorGated>(
  ctx_data: ContextData<T>,
) -> Result<PipelineControl, WorkflowError> {
  let (services, credential) = {
    let guard = ctx_data.read();
    (guard.services().clone(), guard.credential().to_string())
  };

  let operator = authorize(&services, &credential).await?;
  info!(operator = %operator.operator_id, "Operator authorized.");
  ctx_data.write().set_operator(operator);
  Ok(PipelineControl::Continue)
}

/// Works out why a conditional write matched nothing, by re-reading the order.
///
/// The re-read only picks the error to report; the decision to refuse the write was
/// already made atomically by the store.
pub(crate) async fn explain_unmatched_write(
  services: &WorkflowServices,
  order_id: Uuid,
  action: OrderAction,
  requester_email: Option<&str>,
) -> WorkflowError {
  let current = match bounded(services, "reload_order", services.store.get(order_id)).await {
    Ok(Some(order)) => order,
    Ok(None) => return WorkflowError::NotFound { order_id },
    Err(e) => return e,
  };

  if let Some(email) = requester_email {
    if !current.is_owned_by(email) {
      return WorkflowError::unauthorized("order belongs to a different customer");
    }
  }

  match action {
    OrderAction::Payment(Transition::Declare) => WorkflowError::AlreadyDeclared {
      order_id,
      current: current.payment_status,
    },
    _ => WorkflowError::InvalidTransition {
      order_id,
      action,
      payment: current.payment_status,
      fulfillment: current.fulfillment_status,
    },
  }
}

/// Hands `event` to the notifier on its own task, after the triggering write is durable.
///
/// The caller never waits for delivery. Failures are logged as `NotificationFailed`
/// and forwarded to the failure channel when one is configured.
pub(crate) fn dispatch_notification(services: &WorkflowServices, event: OrderEvent) {
  let notifier = services.notifier.clone();
  let failures = services.notification_failures.clone();
  let order_id = event.order().id;
  let kind = event.kind();

  let task = async move {
    match notifier.notify(&event).await {
      Ok(()) => debug!("Notification delivered."),
      Err(source) => {
        let failure = WorkflowError::NotificationFailed { order_id, source };
        warn!(error = %failure, "Notification failed; the transition stands.");
        if let Some(tx) = failures {
          let _ = tx.send(failure);
        }
      }
    }
  };

  match tokio::runtime::Handle::try_current() {
    Ok(handle) => {
      handle.spawn(task.instrument(tracing::info_span!("notification", %order_id, event = kind)));
    }
    Err(_) => warn!(%order_id, event = kind, "No async runtime available; notification dropped."),
  }
}
