// fst_workflow/src/model/order.rs

use super::status::{FulfillmentStatus, PaymentStatus};
use crate::error::WorkflowError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
  pub name: String,
  pub line1: String,
  #[serde(default)]
  pub line2: Option<String>,
  pub city: String,
  #[serde(default)]
  pub region: Option<String>,
  pub postal_code: String,
  pub country: String,
}

impl Address {
  pub fn validate(&self, label: &str) -> Result<(), WorkflowError> {
    let required = [
      ("name", &self.name),
      ("line1", &self.line1),
      ("city", &self.city),
      ("postalCode", &self.postal_code),
      ("country", &self.country),
    ];
    for (field, value) in required {
      if value.trim().is_empty() {
        return Err(WorkflowError::InvalidInput(format!("{} address is missing '{}'", label, field)));
      }
    }
    Ok(())
  }
}

/// An order as persisted by the authoritative store.
///
/// `id`, `customer_email`, `total` and `currency` never change after creation.
/// Everything else is only ever written through the workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub customer_email: String,
  pub total: Decimal,
  pub currency: String,
  pub payment_status: PaymentStatus,
  pub fulfillment_status: FulfillmentStatus,
  pub tracking_number: Option<String>,
  pub payment_reference: Option<String>,
  pub shipping_address: Address,
  pub billing_address: Address,
  pub payment_declared_at: Option<DateTime<Utc>>,
  pub payment_confirmed_at: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Order {
  /// Emails are compared case-insensitively; hosted auth providers normalise differently.
  /// Folds the full Unicode range, as Postgres `lower()` does for the stored column.
  pub fn is_owned_by(&self, email: &str) -> bool {
    self.customer_email.trim().to_lowercase() == email.trim().to_lowercase()
  }
}

/// Totals are stored as NUMERIC(12,2).
const TOTAL_SCALE: u32 = 2;
const TOTAL_INTEGER_DIGITS: u32 = 10;

fn max_total() -> Decimal {
  Decimal::from(10_i64.pow(TOTAL_INTEGER_DIGITS))
}

/// Checkout data delivered by the payment-capture event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
  pub customer_email: String,
  pub total: Decimal,
  pub currency: String,
  #[serde(default)]
  pub payment_reference: Option<String>,
  pub shipping_address: Address,
  pub billing_address: Address,
}

impl NewOrder {
  pub fn validate(&self) -> Result<(), WorkflowError> {
    let email = self.customer_email.trim();
    if email.is_empty() || !email.contains('@') {
      return Err(WorkflowError::InvalidInput("A valid customer email is required.".to_string()));
    }
    if self.total < Decimal::ZERO {
      return Err(WorkflowError::InvalidInput(format!(
        "Order total cannot be negative (got {}).",
        self.total
      )));
    }
    if self.total.normalize().scale() > TOTAL_SCALE {
      return Err(WorkflowError::InvalidInput(format!(
        "Order total has more than {} decimal places (got {}).",
        TOTAL_SCALE, self.total
      )));
    }
    if self.total >= max_total() {
      return Err(WorkflowError::InvalidInput(format!(
        "Order total {} exceeds the storable maximum.",
        self.total
      )));
    }
    if self.currency.len() != 3 || !self.currency.chars().all(|c| c.is_ascii_alphabetic()) {
      return Err(WorkflowError::InvalidInput(format!(
        "Currency must be a three-letter ISO code (got '{}').",
        self.currency
      )));
    }
    if let Some(reference) = &self.payment_reference {
      if reference.trim().is_empty() {
        return Err(WorkflowError::InvalidInput("Payment reference cannot be blank.".to_string()));
      }
    }
    self.shipping_address.validate("shipping")?;
    self.billing_address.validate("billing")?;
    Ok(())
  }

  /// Builds the initial `pending` record. Call `validate` first.
  pub fn into_order(self, id: Uuid, now: DateTime<Utc>) -> Order {
    Order {
      id,
      customer_email: self.customer_email.trim().to_string(),
      total: self.total,
      currency: self.currency.to_ascii_uppercase(),
      payment_status: PaymentStatus::Pending,
      fulfillment_status: FulfillmentStatus::Pending,
      tracking_number: None,
      payment_reference: self.payment_reference.map(|r| r.trim().to_string()),
      shipping_address: self.shipping_address,
      billing_address: self.billing_address,
      payment_declared_at: None,
      payment_confirmed_at: None,
      created_at: now,
      updated_at: now,
    }
  }
}

/// The fields a single conditional write may touch. `None` leaves a field as stored.
///
/// `updated_at` is always written.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
  pub payment_status: Option<PaymentStatus>,
  pub fulfillment_status: Option<FulfillmentStatus>,
  pub tracking_number: Option<String>,
  pub payment_declared_at: Option<DateTime<Utc>>,
  pub payment_confirmed_at: Option<DateTime<Utc>>,
  pub shipping_address: Option<Address>,
  pub billing_address: Option<Address>,
  pub updated_at: Option<DateTime<Utc>>,
}

impl OrderPatch {
  pub fn touched_at(now: DateTime<Utc>) -> Self {
    OrderPatch {
      updated_at: Some(now),
      ..Default::default()
    }
  }

  /// Applies the patch in place. Stores without native partial updates use this.
  pub fn apply_to(&self, order: &mut Order) {
    if let Some(status) = self.payment_status {
      order.payment_status = status;
    }
    if let Some(status) = self.fulfillment_status {
      order.fulfillment_status = status;
    }
    if let Some(tracking) = &self.tracking_number {
      order.tracking_number = Some(tracking.clone());
    }
    if let Some(at) = self.payment_declared_at {
      order.payment_declared_at = Some(at);
    }
    if let Some(at) = self.payment_confirmed_at {
      order.payment_confirmed_at = Some(at);
    }
    if let Some(address) = &self.shipping_address {
      order.shipping_address = address.clone();
    }
    if let Some(address) = &self.billing_address {
      order.billing_address = address.clone();
    }
    if let Some(at) = self.updated_at {
      order.updated_at = at;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::str::FromStr;

  fn address() -> Address {
    Address {
      name: "Ada Lovelace".to_string(),
      line1: "12 Analytical Row".to_string(),
      line2: None,
      city: "London".to_string(),
      region: None,
      postal_code: "N1 9GU".to_string(),
      country: "GB".to_string(),
    }
  }

  fn new_order() -> NewOrder {
    NewOrder {
      customer_email: " a@example.com ".to_string(),
      total: Decimal::from_str("42.50").unwrap(),
      currency: "eur".to_string(),
      payment_reference: Some("pi_123".to_string()),
      shipping_address: address(),
      billing_address: address(),
    }
  }

  #[test]
  fn new_order_starts_pending() {
    let input = new_order();
    input.validate().unwrap();
    let now = Utc::now();
    let order = input.into_order(Uuid::new_v4(), now);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.fulfillment_status, FulfillmentStatus::Pending);
    assert_eq!(order.currency, "EUR");
    assert_eq!(order.customer_email, "a@example.com");
    assert!(order.payment_declared_at.is_none());
    assert_eq!(order.created_at, order.updated_at);
    assert!(order.is_owned_by("A@Example.com"));
  }

  #[test]
  fn validation_rejects_bad_checkout_data() {
    let mut negative = new_order();
    negative.total = Decimal::from_str("-1.00").unwrap();
    assert!(matches!(negative.validate(), Err(WorkflowError::InvalidInput(_))));

    let mut bad_email = new_order();
    bad_email.customer_email = "nobody".to_string();
    assert!(matches!(bad_email.validate(), Err(WorkflowError::InvalidInput(_))));

    let mut bad_currency = new_order();
    bad_currency.currency = "EURO".to_string();
    assert!(matches!(bad_currency.validate(), Err(WorkflowError::InvalidInput(_))));

    let mut no_city = new_order();
    no_city.shipping_address.city = "  ".to_string();
    assert!(matches!(no_city.validate(), Err(WorkflowError::InvalidInput(_))));

    let mut free = new_order();
    free.total = Decimal::ZERO;
    assert!(free.validate().is_ok());
  }

  #[test]
  fn totals_must_fit_the_stored_column() {
    let mut fractional_cent = new_order();
    fractional_cent.total = Decimal::from_str("10.005").unwrap();
    assert!(matches!(fractional_cent.validate(), Err(WorkflowError::InvalidInput(_))));

    let mut trailing_zeros = new_order();
    trailing_zeros.total = Decimal::from_str("10.5000").unwrap();
    assert!(trailing_zeros.validate().is_ok());

    let mut largest = new_order();
    largest.total = Decimal::from_str("9999999999.99").unwrap();
    assert!(largest.validate().is_ok());

    let mut too_large = new_order();
    too_large.total = Decimal::from_str("10000000000.00").unwrap();
    assert!(matches!(too_large.validate(), Err(WorkflowError::InvalidInput(_))));
  }

  #[test]
  fn ownership_folds_non_ascii_case() {
    let mut input = new_order();
    input.customer_email = "ÉLODIE@Example.com".to_string();
    let order = input.into_order(Uuid::new_v4(), Utc::now());
    assert!(order.is_owned_by(" élodie@example.com "));
    assert!(!order.is_owned_by("elodie@example.com"));
  }

  #[test]
  fn patch_only_touches_given_fields() {
    let now = Utc::now();
    let mut order = new_order().into_order(Uuid::new_v4(), now);
    let later = now + chrono::Duration::seconds(5);
    let patch = OrderPatch {
      payment_status: Some(PaymentStatus::Declared),
      payment_declared_at: Some(later),
      ..OrderPatch::touched_at(later)
    };
    patch.apply_to(&mut order);
    assert_eq!(order.payment_status, PaymentStatus::Declared);
    assert_eq!(order.payment_declared_at, Some(later));
    assert_eq!(order.updated_at, later);
    assert_eq!(order.created_at, now);
    assert!(order.tracking_number.is_none());
  }
}
