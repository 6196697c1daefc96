// apps/storefront/src/models/mod.rs

//! Database row types. Rows are converted into `fst_workflow` domain types at the store boundary.

pub mod operator;
pub mod order_row;

pub use operator::{Operator, OperatorSessionRow};
pub use order_row::OrderRow;
