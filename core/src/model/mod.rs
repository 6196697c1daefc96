// fst_workflow/src/model/mod.rs

//! Order records and the enums that describe where an order is in its lifecycle.

pub mod order;
pub mod status;

pub use order::{Address, NewOrder, Order, OrderPatch};
pub use status::{FulfillmentStatus, IllegalTransition, OrderAction, PaymentStatus, Transition};
