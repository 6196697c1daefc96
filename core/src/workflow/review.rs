// fst_workflow/src/workflow/review.rs

//! Operator review of a declared bank transfer: confirm or reject.

use crate::error::WorkflowError;
use crate::model::{FulfillmentStatus, OrderAction, OrderPatch, Transition};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, Workflows};
use crate::services::OrderEvent;
use crate::store::UpdateGuard;
use crate::workflow::common_steps::{authorize_operator_step, bounded, dispatch_notification, explain_unmatched_write};
use crate::workflow::contexts::PaymentReviewCtxData;
use tracing::{info, warn};

pub fn register_payment_review_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<PaymentReviewCtxData>::new(
    "payment_review",
    &[
      ("authorize_operator", false),
      ("apply_decision", false),
      ("notify_customer", true),
    ],
  );

  p.on_root("authorize_operator", authorize_operator_step::<PaymentReviewCtxData>);

  p.on_root("apply_decision", |ctx_data: ContextData<PaymentReviewCtxData>| async move {
    let (services, order_id, decision, operator_id) = {
      let guard = ctx_data.read();
      (
        guard.services.clone(),
        guard.order_id,
        guard.decision,
        guard.operator.as_ref().map(|o| o.operator_id.clone()).unwrap_or_default(),
      )
    };

    let now = services.clock.now();
    let mut patch = OrderPatch {
      payment_status: Some(decision.to_status()),
      ..OrderPatch::touched_at(now)
    };
    match decision {
      Transition::Confirm => patch.payment_confirmed_at = Some(now),
      Transition::Reject => patch.fulfillment_status = Some(FulfillmentStatus::Cancelled),
      other => {
        return Err(WorkflowError::Internal(format!("'{:?}' is not a review decision", other)));
      }
    }

    let guard = UpdateGuard::payment_is(decision.from_status());
    match bounded(&services, "review_payment", services.store.update_where(order_id, &guard, &patch)).await? {
      Some(order) => {
        info!(%order_id, operator = %operator_id, status = %order.payment_status, "Payment review applied.");
        ctx_data.write().reviewed_order = Some(order);
        Ok::<_, WorkflowError>(PipelineControl::Continue)
      }
      None => {
        let err = explain_unmatched_write(&services, order_id, OrderAction::Payment(decision), None).await;
        warn!(%order_id, operator = %operator_id, error = %err, "Payment review refused.");
        Err(err)
      }
    }
  });

  // Only confirmations reach the customer; a rejection is followed up by staff directly.
  p.on_root("notify_customer", |ctx_data: ContextData<PaymentReviewCtxData>| async move {
    let (services, decision, order) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.decision, guard.reviewed_order.clone())
    };
    if let (Transition::Confirm, Some(order)) = (decision, order) {
      dispatch_notification(&services, OrderEvent::PaymentConfirmed(order));
    }
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(p);
}
