// tests/archive_tests.rs
mod common;

use common::*;
use fst_workflow::{ArchiveFilter, OrderAction, PaymentStatus, Transition, WorkflowError};
use rust_decimal::Decimal;
use std::str::FromStr;

fn dec(value: &str) -> Decimal {
  Decimal::from_str(value).unwrap()
}

#[tokio::test]
async fn archiving_removes_an_order_from_revenue_but_keeps_the_record() {
  let h = Harness::new();
  let kept = h.confirmed_order("a@example.com", "100.00").await;
  let archived = h.confirmed_order("b@example.com", "40.50").await;
  h.declared_order("c@example.com", "999.00").await;

  assert_eq!(h.workflow.confirmed_revenue().await.unwrap(), dec("140.50"));

  let result = h.workflow.reset_to_archived(archived.id, OPERATOR_TOKEN).await.unwrap();
  assert_eq!(result.payment_status, PaymentStatus::Archived);

  assert_eq!(h.workflow.confirmed_revenue().await.unwrap(), dec("100.00"));
  let fetched = h.workflow.get_order(archived.id).await.unwrap();
  assert_eq!(fetched.payment_status, PaymentStatus::Archived);
  assert_eq!(fetched.total, dec("40.50"));
  assert_eq!(h.workflow.get_order(kept.id).await.unwrap().payment_status, PaymentStatus::Confirmed);
}

#[tokio::test]
async fn only_confirmed_orders_can_be_archived() {
  let h = Harness::new();
  let declared = h.declared_order("a@example.com", "10.00").await;

  let err = h.workflow.reset_to_archived(declared.id, OPERATOR_TOKEN).await.unwrap_err();
  assert!(matches!(
    err,
    WorkflowError::InvalidTransition { action: OrderAction::Payment(Transition::Archive), .. }
  ));

  let confirmed = h.confirmed_order("a@example.com", "10.00").await;
  h.workflow.reset_to_archived(confirmed.id, OPERATOR_TOKEN).await.unwrap();
  let err = h.workflow.reset_to_archived(confirmed.id, OPERATOR_TOKEN).await.unwrap_err();
  assert!(matches!(
    err,
    WorkflowError::InvalidTransition { payment: PaymentStatus::Archived, .. }
  ));
}

#[tokio::test]
async fn bulk_archive_moves_every_confirmed_order() {
  let h = Harness::new();
  h.confirmed_order("a@example.com", "10.00").await;
  h.confirmed_order("b@example.com", "20.00").await;
  let declared = h.declared_order("c@example.com", "30.00").await;

  let moved = h.workflow.archive_confirmed(ArchiveFilter::AllConfirmed, OPERATOR_TOKEN).await.unwrap();
  assert_eq!(moved, 2);
  assert_eq!(h.workflow.confirmed_revenue().await.unwrap(), Decimal::ZERO);
  assert_eq!(h.workflow.get_order(declared.id).await.unwrap().payment_status, PaymentStatus::Declared);

  let again = h.workflow.archive_confirmed(ArchiveFilter::AllConfirmed, OPERATOR_TOKEN).await.unwrap();
  assert_eq!(again, 0);
}

#[tokio::test]
async fn bulk_archive_by_ids_skips_orders_that_are_not_confirmed() {
  let h = Harness::new();
  let first = h.confirmed_order("a@example.com", "10.00").await;
  let second = h.confirmed_order("b@example.com", "20.00").await;
  let pending = h.pending_order("c@example.com", "30.00").await;

  let moved = h
    .workflow
    .archive_confirmed(ArchiveFilter::Ids(vec![first.id, pending.id]), OPERATOR_TOKEN)
    .await
    .unwrap();

  assert_eq!(moved, 1);
  assert_eq!(h.workflow.get_order(first.id).await.unwrap().payment_status, PaymentStatus::Archived);
  assert_eq!(h.workflow.get_order(second.id).await.unwrap().payment_status, PaymentStatus::Confirmed);
  assert_eq!(h.workflow.get_order(pending.id).await.unwrap().payment_status, PaymentStatus::Pending);
}

#[tokio::test]
async fn bulk_archive_requires_an_operator() {
  let h = Harness::new();
  h.confirmed_order("a@example.com", "10.00").await;
  let err = h.workflow.archive_confirmed(ArchiveFilter::AllConfirmed, "").await.unwrap_err();
  assert!(matches!(err, WorkflowError::Unauthorized { .. }));
  assert_eq!(h.workflow.confirmed_revenue().await.unwrap(), Decimal::from_str("10.00").unwrap());
}

#[tokio::test]
async fn listing_is_newest_first_and_filtered_by_status() {
  let h = Harness::new();
  let oldest = h.pending_order("a@example.com", "1.00").await;
  let middle = h.declared_order("b@example.com", "2.00").await;
  let newest = h.pending_order("c@example.com", "3.00").await;
  h.confirmed_order("d@example.com", "4.00").await;

  let listed = h
    .workflow
    .list_by_status(&[PaymentStatus::Pending, PaymentStatus::Declared])
    .await
    .unwrap();
  let ids: Vec<_> = listed.iter().map(|o| o.id).collect();
  assert_eq!(ids, vec![newest.id, middle.id, oldest.id]);

  // Reads always reflect the latest write.
  h.workflow.declare_payment(newest.id, "c@example.com").await.unwrap();
  let declared_only = h.workflow.list_by_status(&[PaymentStatus::Declared]).await.unwrap();
  let ids: Vec<_> = declared_only.iter().map(|o| o.id).collect();
  assert_eq!(ids, vec![newest.id, middle.id]);

  assert!(h.workflow.list_by_status(&[]).await.unwrap().is_empty());
}
