// apps/storefront/src/services/mod.rs

pub mod auth_service;
pub mod email_notifier;
pub mod session_service;

pub use email_notifier::EmailNotifier;
pub use session_service::PgSessionVerifier;
