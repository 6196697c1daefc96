// fst_workflow/src/workflow/contexts.rs

//! Context data for each workflow pipeline. `Workflows` dispatches on these types,
//! so every operation gets its own struct.

use crate::model::{Address, NewOrder, Order, Transition};
use crate::services::OperatorIdentity;
use crate::store::{ArchiveFilter, InsertOutcome};
use crate::workflow::WorkflowServices;
use uuid::Uuid;

/// Contexts of operator-facing pipelines, so `authorize_operator_step` can serve them all.
pub trait OperatorGated: Send + Sync + 'static {
  fn services(&self) -> &WorkflowServices;
  fn credential(&self) -> &str;
  fn set_operator(&mut self, operator: OperatorIdentity);
}

macro_rules! operator_gated {
  ($($ctx:ty),+ $(,)?) => {
    $(
      impl OperatorGated for $ctx {
        fn services(&self) -> &WorkflowServices {
          &self.services
        }

        fn credential(&self) -> &str {
          &self.credential
        }

        fn set_operator(&mut self, operator: OperatorIdentity) {
          self.operator = Some(operator);
        }
      }
    )+
  };
}

// --- Customer-initiated ---

pub struct RecordCheckoutCtxData {
  pub services: WorkflowServices,
  pub new_order: NewOrder,
  pub outcome: Option<InsertOutcome>,
}

pub struct DeclarePaymentCtxData {
  pub services: WorkflowServices,
  pub order_id: Uuid,
  pub requester_email: String,
  pub declared_order: Option<Order>,
}

pub struct UpdateAddressesCtxData {
  pub services: WorkflowServices,
  pub order_id: Uuid,
  pub requester_email: String,
  pub shipping_address: Option<Address>,
  pub billing_address: Option<Address>,
  pub updated_order: Option<Order>,
}

// --- Operator-initiated ---

/// Shared by confirm and reject; `decision` selects the edge.
pub struct PaymentReviewCtxData {
  pub services: WorkflowServices,
  pub order_id: Uuid,
  pub credential: String,
  pub decision: Transition,
  pub operator: Option<OperatorIdentity>,
  pub reviewed_order: Option<Order>,
}

pub struct AssignTrackingCtxData {
  pub services: WorkflowServices,
  pub order_id: Uuid,
  pub credential: String,
  pub tracking_number: String,
  pub operator: Option<OperatorIdentity>,
  pub shipped_order: Option<Order>,
}

pub struct MarkDeliveredCtxData {
  pub services: WorkflowServices,
  pub order_id: Uuid,
  pub credential: String,
  pub operator: Option<OperatorIdentity>,
  pub delivered_order: Option<Order>,
}

pub struct ArchiveOrderCtxData {
  pub services: WorkflowServices,
  pub order_id: Uuid,
  pub credential: String,
  pub operator: Option<OperatorIdentity>,
  pub archived_order: Option<Order>,
}

pub struct BulkArchiveCtxData {
  pub services: WorkflowServices,
  pub filter: ArchiveFilter,
  pub credential: String,
  pub operator: Option<OperatorIdentity>,
  pub archived_count: u64,
}

operator_gated!(
  PaymentReviewCtxData,
  AssignTrackingCtxData,
  MarkDeliveredCtxData,
  ArchiveOrderCtxData,
  BulkArchiveCtxData,
);
