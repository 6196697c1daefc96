// fst_workflow/src/workflow/customer.rs

//! Customer-side pipelines: recording a checkout, declaring a bank transfer, and
//! editing addresses before payment is ruled on.

use crate::error::WorkflowError;
use crate::model::{OrderAction, OrderPatch, PaymentStatus, Transition};
use crate::pipeline::{ContextData, Pipeline, PipelineControl, Workflows};
use crate::services::OrderEvent;
use crate::store::UpdateGuard;
use crate::workflow::common_steps::{bounded, dispatch_notification, explain_unmatched_write};
use crate::workflow::contexts::{DeclarePaymentCtxData, RecordCheckoutCtxData, UpdateAddressesCtxData};
use tracing::{info, warn};
use uuid::Uuid;

pub fn register_record_checkout_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<RecordCheckoutCtxData>::new(
    "record_checkout",
    &[("validate_checkout", false), ("insert_order", false)],
  );

  p.on_root("validate_checkout", |ctx_data: ContextData<RecordCheckoutCtxData>| async move {
    ctx_data.read().new_order.validate()?;
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  p.on_root("insert_order", |ctx_data: ContextData<RecordCheckoutCtxData>| async move {
    let (services, new_order) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.new_order.clone())
    };

    let order = new_order.into_order(Uuid::new_v4(), services.clock.now());
    let outcome = bounded(&services, "insert_order", services.store.insert(order)).await?;
    let order = outcome.order();
    if outcome.was_created() {
      info!(order_id = %order.id, customer = %order.customer_email, total = %order.total, "Order recorded.");
    } else {
      info!(order_id = %order.id, reference = ?order.payment_reference, "Checkout already recorded; returning existing order.");
    }
    ctx_data.write().outcome = Some(outcome);
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(p);
}

pub fn register_declare_payment_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<DeclarePaymentCtxData>::new(
    "declare_payment",
    &[
      ("validate_requester", false),
      ("record_declaration", false),
      ("notify_staff", true),
    ],
  );

  p.on_root("validate_requester", |ctx_data: ContextData<DeclarePaymentCtxData>| async move {
    if ctx_data.read().requester_email.trim().is_empty() {
      return Err(WorkflowError::unauthorized("requester email is missing"));
    }
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  // One conditional write keyed on id + owner + `pending`: of two concurrent
  // declarations exactly one matches, the other is refused by the store.
  p.on_root("record_declaration", |ctx_data: ContextData<DeclarePaymentCtxData>| async move {
    let (services, order_id, requester_email) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.order_id, guard.requester_email.clone())
    };

    let now = services.clock.now();
    let guard = UpdateGuard::payment_is(PaymentStatus::Pending).owned_by(requester_email.clone());
    let patch = OrderPatch {
      payment_status: Some(Transition::Declare.to_status()),
      payment_declared_at: Some(now),
      ..OrderPatch::touched_at(now)
    };

    match bounded(&services, "declare_payment", services.store.update_where(order_id, &guard, &patch)).await? {
      Some(order) => {
        info!(%order_id, declared_at = %now, "Payment declared by customer.");
        ctx_data.write().declared_order = Some(order);
        Ok::<_, WorkflowError>(PipelineControl::Continue)
      }
      None => {
        let err = explain_unmatched_write(
          &services,
          order_id,
          OrderAction::Payment(Transition::Declare),
          Some(&requester_email),
        )
        .await;
        warn!(%order_id, error = %err, "Payment declaration refused.");
        Err(err)
      }
    }
  });

  p.on_root("notify_staff", |ctx_data: ContextData<DeclarePaymentCtxData>| async move {
    let (services, order) = {
      let guard = ctx_data.read();
      (guard.services.clone(), guard.declared_order.clone())
    };
    if let Some(order) = order {
      dispatch_notification(&services, OrderEvent::PaymentDeclared(order));
    }
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  workflows.register_pipeline(p);
}

pub fn register_update_addresses_pipeline(workflows: &Workflows) {
  let mut p = Pipeline::<UpdateAddressesCtxData>::new(
    "update_addresses",
    &[("validate_addresses", false), ("apply_addresses", false)],
  );

  p.on_root("validate_addresses", |ctx_data: ContextData<UpdateAddressesCtxData>| async move {
    let guard = ctx_data.read();
    if guard.requester_email.trim().is_empty() {
      return Err(WorkflowError::unauthorized("requester email is missing"));
    }
    if guard.shipping_address.is_none() && guard.billing_address.is_none() {
      return Err(WorkflowError::InvalidInput(
        "At least one of shipping or billing address is required.".to_string(),
      ));
    }
    if let Some(address) = &guard.shipping_address {
      address.validate("shipping")?;
    }
    if let Some(address) = &guard.billing_address {
      address.validate("billing")?;
    }
    Ok::<_, WorkflowError>(PipelineControl::Continue)
  });

  p.on_root("apply_addresses", |ctx_data: ContextData<UpdateAddressesCtxData>| async move {
    let (services, order_id, requester_email, shipping_address, billing_address) = {
      let guard = ctx_data.read();
      (
        guard.services.clone(),
        guard.order_id,
        guard.requester_email.clone(),
        guard.shipping_address.clone(),
        guard.billing_address.clone(),
      )
    };

    let now = services.clock.now();
    let editable: Vec<PaymentStatus> =
      PaymentStatus::ALL.into_iter().filter(|s| s.allows_address_change()).collect();
    let guard = UpdateGuard::payment_in(&editable).owned_by(requester_email.clone());
    let patch = OrderPatch {
      shipping_address,
      billing_address,
      ..OrderPatch::touched_at(now)
    };

    match bounded(&services, "update_addresses", services.store.update_where(order_id, &guard, &patch)).await? {
      Some(order) => {
        info!(%order_id, "Order addresses updated.");
        ctx_data.write().updated_order = Some(order);
        Ok::<_, WorkflowError>(PipelineControl::Continue)
      }
      None => Err(explain_unmatched_write(&services, order_id, OrderAction::UpdateAddresses, Some(&requester_email)).await),
    }
  });

  workflows.register_pipeline(p);
}
