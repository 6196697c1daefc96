// fst_workflow/src/services/notify.rs

//! Outbound notifications (email, realtime push) triggered by committed transitions.

use crate::model::Order;
use async_trait::async_trait;

#[derive(Debug, Clone)]
pub enum OrderEvent {
  /// A customer says they have sent the bank transfer. Addressed to staff.
  PaymentDeclared(Order),
  /// Staff confirmed the transfer arrived. Addressed to the customer.
  PaymentConfirmed(Order),
  /// A tracking number was assigned. Addressed to the customer.
  OrderShipped(Order),
}

impl OrderEvent {
  pub fn order(&self) -> &Order {
    match self {
      OrderEvent::PaymentDeclared(order) | OrderEvent::PaymentConfirmed(order) | OrderEvent::OrderShipped(order) => {
        order
      }
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      OrderEvent::PaymentDeclared(_) => "payment_declared",
      OrderEvent::PaymentConfirmed(_) => "payment_confirmed",
      OrderEvent::OrderShipped(_) => "order_shipped",
    }
  }
}

/// Delivery is best-effort. Implementations report failure, the workflow logs it;
/// a failed notification never undoes the transition that triggered it.
#[async_trait]
pub trait Notifier: Send + Sync {
  async fn notify(&self, event: &OrderEvent) -> anyhow::Result<()>;
}
