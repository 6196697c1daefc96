// fst_workflow/src/model/status.rs

//! Payment ("FST") and fulfillment status enums, and the legal payment state graph.
//!
//! ```text
//! pending  --declare--> declared
//! declared --confirm--> confirmed
//! declared --reject---> rejected
//! confirmed --archive-> archived
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
  Pending,
  Declared,
  Confirmed,
  Rejected,
  Archived,
}

impl PaymentStatus {
  pub const ALL: [PaymentStatus; 5] = [
    PaymentStatus::Pending,
    PaymentStatus::Declared,
    PaymentStatus::Confirmed,
    PaymentStatus::Rejected,
    PaymentStatus::Archived,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      PaymentStatus::Pending => "pending",
      PaymentStatus::Declared => "declared",
      PaymentStatus::Confirmed => "confirmed",
      PaymentStatus::Rejected => "rejected",
      PaymentStatus::Archived => "archived",
    }
  }

  /// No ordinary transition leaves these states.
  pub fn is_terminal(&self) -> bool {
    matches!(self, PaymentStatus::Rejected | PaymentStatus::Archived)
  }

  /// Shipping and billing addresses may only change before an operator has ruled on payment.
  pub fn allows_address_change(&self) -> bool {
    matches!(self, PaymentStatus::Pending | PaymentStatus::Declared)
  }

  /// Target state of `transition` when applied from `self`, or the reason it is illegal.
  pub fn apply(self, transition: Transition) -> Result<PaymentStatus, IllegalTransition> {
    if self == transition.from_status() {
      return Ok(transition.to_status());
    }
    match transition {
      Transition::Declare => Err(IllegalTransition::AlreadyDeclared),
      _ => Err(IllegalTransition::WrongState),
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PaymentStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Ok(PaymentStatus::Pending),
      "declared" => Ok(PaymentStatus::Declared),
      "confirmed" => Ok(PaymentStatus::Confirmed),
      "rejected" => Ok(PaymentStatus::Rejected),
      "archived" => Ok(PaymentStatus::Archived),
      other => Err(format!("unknown payment status '{}'", other)),
    }
  }
}

/// Why `PaymentStatus::apply` refused a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IllegalTransition {
  /// A declaration was attempted after the order already left `pending`.
  AlreadyDeclared,
  WrongState,
}

/// The edges of the payment state graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Transition {
  Declare,
  Confirm,
  Reject,
  Archive,
}

impl Transition {
  pub fn from_status(&self) -> PaymentStatus {
    match self {
      Transition::Declare => PaymentStatus::Pending,
      Transition::Confirm | Transition::Reject => PaymentStatus::Declared,
      Transition::Archive => PaymentStatus::Confirmed,
    }
  }

  pub fn to_status(&self) -> PaymentStatus {
    match self {
      Transition::Declare => PaymentStatus::Declared,
      Transition::Confirm => PaymentStatus::Confirmed,
      Transition::Reject => PaymentStatus::Rejected,
      Transition::Archive => PaymentStatus::Archived,
    }
  }
}

impl fmt::Display for Transition {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Transition::Declare => "declare payment for",
      Transition::Confirm => "confirm payment for",
      Transition::Reject => "reject payment for",
      Transition::Archive => "archive",
    })
  }
}

/// Anything the workflow can be asked to do to an order, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderAction {
  Payment(Transition),
  AssignTracking,
  MarkDelivered,
  UpdateAddresses,
}

impl From<Transition> for OrderAction {
  fn from(transition: Transition) -> Self {
    OrderAction::Payment(transition)
  }
}

impl fmt::Display for OrderAction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OrderAction::Payment(transition) => transition.fmt(f),
      OrderAction::AssignTracking => f.write_str("assign tracking to"),
      OrderAction::MarkDelivered => f.write_str("mark delivered"),
      OrderAction::UpdateAddresses => f.write_str("change addresses of"),
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FulfillmentStatus {
  Pending,
  Preparing,
  Shipped,
  Delivered,
  Cancelled,
}

impl FulfillmentStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      FulfillmentStatus::Pending => "pending",
      FulfillmentStatus::Preparing => "preparing",
      FulfillmentStatus::Shipped => "shipped",
      FulfillmentStatus::Delivered => "delivered",
      FulfillmentStatus::Cancelled => "cancelled",
    }
  }
}

impl fmt::Display for FulfillmentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for FulfillmentStatus {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Ok(FulfillmentStatus::Pending),
      "preparing" => Ok(FulfillmentStatus::Preparing),
      "shipped" => Ok(FulfillmentStatus::Shipped),
      "delivered" => Ok(FulfillmentStatus::Delivered),
      "cancelled" => Ok(FulfillmentStatus::Cancelled),
      other => Err(format!("unknown fulfillment status '{}'", other)),
    }
  }
}
