// apps/storefront/src/services/email_notifier.rs

//! Simulated transactional email. Stands in for a real provider: every message is
//! logged and "sent" after a short delay.

use async_trait::async_trait;
use fst_workflow::{Notifier, Order, OrderEvent};
use tracing::{info, instrument, warn};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
  pub to: String,
  pub from: String,
  pub subject: String,
  pub body: String,
}

#[derive(Debug, Clone)]
pub struct EmailNotifier {
  sender: String,
  staff_email: String,
}

impl EmailNotifier {
  pub fn new(sender: impl Into<String>, staff_email: impl Into<String>) -> Self {
    Self {
      sender: sender.into(),
      staff_email: staff_email.into(),
    }
  }

  /// Declarations go to staff; everything after that goes to the customer.
  pub fn compose(&self, event: &OrderEvent) -> OutgoingEmail {
    let order = event.order();
    let (to, subject, body) = match event {
      OrderEvent::PaymentDeclared(_) => (
        self.staff_email.clone(),
        format!("Payment declared for order {}", order.id),
        format!(
          "{} reports a bank transfer of {} {} for order {}. Please check the account and review it.",
          order.customer_email,
          order.total,
          order.currency,
          order.id
        ),
      ),
      OrderEvent::PaymentConfirmed(_) => (
        order.customer_email.clone(),
        format!("We received your payment for order {}", order.id),
        format!(
          "Your payment of {} {} has been confirmed. We will let you know when the order ships.",
          order.total, order.currency
        ),
      ),
      OrderEvent::OrderShipped(_) => (
        order.customer_email.clone(),
        format!("Order {} has shipped", order.id),
        shipped_body(order),
      ),
    };

    OutgoingEmail {
      to,
      from: self.sender.clone(),
      subject,
      body,
    }
  }
}

fn shipped_body(order: &Order) -> String {
  match &order.tracking_number {
    Some(tracking) => format!(
      "Your order is on its way to {}. Tracking number: {}.",
      order.shipping_address.city, tracking
    ),
    None => format!("Your order is on its way to {}.", order.shipping_address.city),
  }
}

#[async_trait]
impl Notifier for EmailNotifier {
  #[instrument(name = "email_notifier::notify", skip_all, fields(event = event.kind(), order_id = %event.order().id))]
  async fn notify(&self, event: &OrderEvent) -> anyhow::Result<()> {
    let email = self.compose(event);
    if !email.to.contains('@') {
      warn!(recipient = %email.to, "Refusing to send email to a malformed address.");
      anyhow::bail!("malformed recipient address '{}'", email.to);
    }

    info!(to = %email.to, from = %email.from, subject = %email.subject, "Simulating email send.");
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    let message_id = format!("mock_email_{}", Uuid::new_v4());
    info!(%message_id, "Email sent.");
    Ok(())
  }
}
