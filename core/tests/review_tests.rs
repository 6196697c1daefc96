// tests/review_tests.rs
mod common;

use common::*;
use fst_workflow::{FulfillmentStatus, OrderAction, PaymentStatus, Transition, WorkflowError};
use uuid::Uuid;

#[tokio::test]
async fn confirming_a_declared_payment_stamps_and_notifies() {
  let h = Harness::new();
  let declared = h.declared_order("a@example.com", "99.00").await;

  let confirmed = h.workflow.confirm_payment(declared.id, OPERATOR_TOKEN).await.unwrap();

  assert_eq!(confirmed.payment_status, PaymentStatus::Confirmed);
  assert!(confirmed.payment_confirmed_at.unwrap() > declared.payment_declared_at.unwrap());
  assert_eq!(confirmed.fulfillment_status, FulfillmentStatus::Pending);

  let events = h.notifier.wait_for(2).await;
  assert!(events.contains(&("payment_confirmed", declared.id)));
}

#[tokio::test]
async fn rejecting_cancels_fulfillment_and_sends_nothing_to_the_customer() {
  let h = Harness::new();
  let declared = h.declared_order("a@example.com", "99.00").await;

  let rejected = h.workflow.reject_payment(declared.id, OPERATOR_TOKEN).await.unwrap();
  assert_eq!(rejected.payment_status, PaymentStatus::Rejected);
  assert_eq!(rejected.fulfillment_status, FulfillmentStatus::Cancelled);
  assert!(rejected.payment_confirmed_at.is_none());

  let events = h.notifier.wait_for(2).await;
  assert_eq!(events, vec![("payment_declared", declared.id)]);
}

#[tokio::test]
async fn review_requires_a_declared_payment() {
  let h = Harness::new();
  let pending = h.pending_order("a@example.com", "15.00").await;

  for decision in [Transition::Confirm, Transition::Reject] {
    let result = match decision {
      Transition::Confirm => h.workflow.confirm_payment(pending.id, OPERATOR_TOKEN).await,
      _ => h.workflow.reject_payment(pending.id, OPERATOR_TOKEN).await,
    };
    match result {
      Err(WorkflowError::InvalidTransition { action, payment, .. }) => {
        assert_eq!(action, OrderAction::Payment(decision));
        assert_eq!(payment, PaymentStatus::Pending);
      }
      other => panic!("expected InvalidTransition, got {other:?}"),
    }
  }
  assert_eq!(h.workflow.get_order(pending.id).await.unwrap(), pending);
}

async fn order_in(h: &Harness, status: PaymentStatus) -> fst_workflow::Order {
  match status {
    PaymentStatus::Pending => h.pending_order("a@example.com", "15.00").await,
    PaymentStatus::Declared => h.declared_order("a@example.com", "15.00").await,
    PaymentStatus::Confirmed => h.confirmed_order("a@example.com", "15.00").await,
    PaymentStatus::Rejected => {
      let declared = h.declared_order("a@example.com", "15.00").await;
      h.workflow.reject_payment(declared.id, OPERATOR_TOKEN).await.unwrap()
    }
    PaymentStatus::Archived => {
      let confirmed = h.confirmed_order("a@example.com", "15.00").await;
      h.workflow.reset_to_archived(confirmed.id, OPERATOR_TOKEN).await.unwrap()
    }
  }
}

#[tokio::test]
async fn review_outside_declared_leaves_every_state_untouched() {
  let h = Harness::new();
  for status in PaymentStatus::ALL.into_iter().filter(|s| *s != PaymentStatus::Declared) {
    for decision in [Transition::Confirm, Transition::Reject] {
      let before = order_in(&h, status).await;
      assert_eq!(before.payment_status, status);

      let result = match decision {
        Transition::Confirm => h.workflow.confirm_payment(before.id, OPERATOR_TOKEN).await,
        _ => h.workflow.reject_payment(before.id, OPERATOR_TOKEN).await,
      };
      match result {
        Err(WorkflowError::InvalidTransition { action, payment, .. }) => {
          assert_eq!(action, OrderAction::Payment(decision));
          assert_eq!(payment, status);
        }
        other => panic!("{decision:?} on {status:?}: expected InvalidTransition, got {other:?}"),
      }
      assert_eq!(h.workflow.get_order(before.id).await.unwrap(), before);
    }
  }
}

#[tokio::test]
async fn rejecting_twice_is_an_invalid_transition() {
  let h = Harness::new();
  let declared = h.declared_order("a@example.com", "15.00").await;
  let rejected = h.workflow.reject_payment(declared.id, OPERATOR_TOKEN).await.unwrap();

  let err = h.workflow.reject_payment(declared.id, OPERATOR_TOKEN).await.unwrap_err();
  assert!(matches!(
    err,
    WorkflowError::InvalidTransition { payment: PaymentStatus::Rejected, .. }
  ));
  assert_eq!(h.workflow.get_order(declared.id).await.unwrap(), rejected);
}

#[tokio::test]
async fn confirming_after_confirmation_is_an_invalid_transition() {
  let h = Harness::new();
  let confirmed = h.confirmed_order("a@example.com", "15.00").await;
  let err = h.workflow.confirm_payment(confirmed.id, OPERATOR_TOKEN).await.unwrap_err();
  assert_eq!(err.code(), "invalid_transition");
}

#[tokio::test]
async fn unknown_order_is_not_found_for_operators() {
  let h = Harness::new();
  let err = h.workflow.confirm_payment(Uuid::new_v4(), OPERATOR_TOKEN).await.unwrap_err();
  assert!(matches!(err, WorkflowError::NotFound { .. }));
}

#[tokio::test]
async fn review_refuses_missing_unknown_and_expired_credentials() {
  let h = Harness::new();
  let declared = h.declared_order("a@example.com", "15.00").await;

  for credential in ["", "not-a-session", EXPIRED_TOKEN] {
    let err = h.workflow.confirm_payment(declared.id, credential).await.unwrap_err();
    assert!(
      matches!(err, WorkflowError::Unauthorized { .. }),
      "credential {credential:?} produced {err:?}"
    );
  }
  let still_declared = h.workflow.get_order(declared.id).await.unwrap();
  assert_eq!(still_declared.payment_status, PaymentStatus::Declared);
}

#[tokio::test]
async fn authorize_resolves_the_operator_identity() {
  let h = Harness::new();
  let identity = h.workflow.authorize(OPERATOR_TOKEN).await.unwrap();
  assert_eq!(identity.operator_id, OPERATOR_ID);
  assert!(h.workflow.authorize(EXPIRED_TOKEN).await.is_err());
}
