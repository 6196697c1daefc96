// fst_workflow/src/services/mod.rs

//! External collaborators the workflow is handed at construction time.

pub mod auth;
pub mod clock;
pub mod notify;

pub use auth::{OperatorIdentity, OperatorVerifier};
pub use clock::{Clock, SystemClock};
pub use notify::{Notifier, OrderEvent};
