// src/lib.rs

//! fst_workflow: the payment-declaration and fulfillment workflow for storefront orders.
//!
//! Orders are paid by bank transfer. The customer declares the transfer, an operator
//! confirms or rejects it, and a confirmed order is shipped with a tracking number.
//! Staff may later archive confirmed orders to reset the live revenue counter.
//!
//! The crate provides:
//!  - The order model and the payment state graph (`model`).
//!  - A pluggable `OrderStore` whose `update_where` is an atomic compare-and-set,
//!    with an in-memory implementation (`store`).
//!  - Collaborator traits for operator verification, notifications and time (`services`).
//!  - A small async step-pipeline engine (`pipeline`).
//!  - `OrderWorkflow`, which runs one pipeline per operation (`workflow`).

pub mod error;
pub mod model;
pub mod pipeline;
pub mod services;
pub mod store;
pub mod workflow;

// --- Re-exports for the Public API ---

pub use crate::error::{StoreError, WorkflowError, WorkflowResult};

pub use crate::model::{
  Address, FulfillmentStatus, IllegalTransition, NewOrder, Order, OrderAction, OrderPatch, PaymentStatus, Transition,
};

pub use crate::pipeline::{ContextData, Pipeline, PipelineControl, PipelineResult, StepDef, Workflows};

pub use crate::services::{Clock, Notifier, OperatorIdentity, OperatorVerifier, OrderEvent, SystemClock};

pub use crate::store::{ArchiveFilter, InsertOutcome, MemoryOrderStore, OrderStore, UpdateGuard};

pub use crate::workflow::{OrderWorkflow, WorkflowConfig, WorkflowServices, DEFAULT_STORE_TIMEOUT};
