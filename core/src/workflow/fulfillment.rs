// fst_workflow/src/workflow/fulfillment.rs

//! Shipping: tracking assignment and delivery, both gated on a confirmed payment.

use crate::error::WorkflowError;
use crate::model::{FulfillmentStatus, OrderAction, OrderPatch, PaymentStatus};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, Workflows};
use crate::services::OrderEvent;
use crate::store::UpdateGuard;
use crate::workflow::common_steps::{authorize_operator_step, bounded, dispatch_notification, explain_unmatched_write};
use crate::workflow::contexts::{AssignTrackingCtxData, MarkDeliveredCtxData};
use tracing::{info, warn};

/// Fulfillment states from which a tracking number may be (re)assigned.
const TRACKABLE: [FulfillmentStatus; 3] = [
  FulfillmentStatus::Pending,
  FulfillmentStatus::Preparing,
  FulfillmentStatus::Shipped,
];

pub fn register_assign_tracking_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<AssignTrackingCtxData>::new(
    "assign_tracking",
    &[
      ("authorize_operator", false),
      ("check_payment_confirmed", false),
      ("validate_tracking_number", false),
      ("assign_tracking", false),
      ("notify_customer", true),
    ],
  );

  p.on_root("authorize_operator", authorize_operator_step::<AssignTrackingCtxData>);

  // State is checked before the tracking number so an unpaid order reports the
  // transition problem, whatever number was sent.
  p.on_root("check_payment_confirmed", |ctx_data: ContextData<AssignTrackingCtxData>| async move {
    let (services, order_id) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.order_id)
    };

    let order = bounded(&services, "load_order", services.store.get(order_id))
      .await?
      .ok_or(WorkflowError::NotFound { order_id })?;

    if order.payment_status != PaymentStatus::Confirmed || !TRACKABLE.contains(&order.fulfillment_status) {
      return Err(WorkflowError::InvalidTransition {
        order_id,
        action: OrderAction::AssignTracking,
        payment: order.payment_status,
        fulfillment: order.fulfillment_status,
      });
    }
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  p.on_root("validate_tracking_number", |ctx_data: ContextData<AssignTrackingCtxData>| async move {
    let mut guard = ctx_data.write();
    let trimmed = guard.tracking_number.trim().to_string();
    if trimmed.is_empty() {
      return Err(WorkflowError::InvalidInput("Tracking number must not be empty.".to_string()));
    }
    guard.tracking_number = trimmed;
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  // The earlier check is advisory; this write re-asserts `confirmed` atomically.
  p.on_root("assign_tracking", |ctx_data: ContextData<AssignTrackingCtxData>| async move {
    let (services, order_id, tracking_number) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.order_id, guard.tracking_number.clone())
    };

    let guard = UpdateGuard::payment_is(PaymentStatus::Confirmed).fulfillment_in(&TRACKABLE);
    let patch = OrderPatch {
      tracking_number: Some(tracking_number.clone()),
      fulfillment_status: Some(FulfillmentStatus::Shipped),
      ..OrderPatch::touched_at(services.clock.now())
    };

    match bounded(&services, "assign_tracking", services.store.update_where(order_id, &guard, &patch)).await? {
      Some(order) => {
        info!(%order_id, tracking = %tracking_number, "Tracking number assigned.");
        ctx_data.write().shipped_order = Some(order);
        Ok::<_, WorkflowError>(PipelineControl::Continue)
      }
      None => {
        let err = explain_unmatched_write(&services, order_id, OrderAction::AssignTracking, None).await;
        warn!(%order_id, error = %err, "Tracking assignment refused.");
        Err(err)
      }
    }
  });

  p.on_root("notify_customer", |ctx_data: ContextData<AssignTrackingCtxData>| async move {
    let (services, order) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.shipped_order.clone())
    };
    if let Some(order) = order {
      dispatch_notification(&services, OrderEvent::OrderShipped(order));
    }
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(p);
}

pub fn register_mark_delivered_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<MarkDeliveredCtxData>::new(
    "mark_delivered",
    &[("authorize_operator", false), ("record_delivery", false)],
  );

  p.on_root("authorize_operator", authorize_operator_step::<MarkDeliveredCtxData>);

  p.on_root("record_delivery", |ctx_data: ContextData<MarkDeliveredCtxData>| async move {
    let (services, order_id) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.order_id)
    };

    let guard = UpdateGuard::payment_is(PaymentStatus::Confirmed).fulfillment_in(&[FulfillmentStatus::Shipped]);
    let patch = OrderPatch {
      fulfillment_status: Some(FulfillmentStatus::Delivered),
      ..OrderPatch::touched_at(services.clock.now())
    };

    match bounded(&services, "mark_delivered", services.store.update_where(order_id, &guard, &patch)).await? {
      Some(order) => {
        info!(%order_id, "Order marked delivered.");
        ctx_data.write().delivered_order = Some(order);
        Ok::<_, WorkflowError>(PipelineControl::Continue)
      }
      None => Err(explain_unmatched_write(&services, order_id, OrderAction::MarkDelivered, None).await),
    }
  });

  workflows.register_pipeline(p);
}
