// apps/storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub database_url: String,
  pub database_max_connections: u32,

  /// Bound on every order-store and session lookup made by the workflow.
  pub store_timeout: Duration,
  pub session_ttl: chrono::Duration,

  /// Shared secret the payment processor sends in `X-Webhook-Secret`.
  pub webhook_secret: String,

  pub email_sender: String,
  pub staff_notification_email: String,

  pub run_migrations: bool,
  /// Operator account created at startup when both are set and the email is unused.
  pub seed_operator: Option<(String, String)>,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok(); // Load .env file if present
    Self::from_lookup(|name| env::var(name).ok())
  }

  /// Builds the config from any variable source; `from_env` passes the process environment.
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
    let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
    let require = |name: &str| get(name).ok_or_else(|| AppError::Config(format!("Missing environment variable '{}'", name)));

    let server_host = get("SERVER_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
    let server_port = parse_or(&get, "SERVER_PORT", 8080u16)?;
    let database_url = require("DATABASE_URL")?;
    let database_max_connections = parse_or(&get, "DATABASE_MAX_CONNECTIONS", 10u32)?;

    let store_timeout_ms = parse_or(&get, "STORE_TIMEOUT_MS", 5000u64)?;
    if store_timeout_ms == 0 {
      return Err(AppError::Config("STORE_TIMEOUT_MS must be greater than zero".to_string()));
    }
    let session_ttl_hours = parse_or(&get, "SESSION_TTL_HOURS", 8i64)?;
    if session_ttl_hours <= 0 {
      return Err(AppError::Config("SESSION_TTL_HOURS must be greater than zero".to_string()));
    }

    let webhook_secret = require("WEBHOOK_SECRET")?;
    let email_sender = get("EMAIL_SENDER").unwrap_or_else(|| "orders@example.com".to_string());
    let staff_notification_email = get("STAFF_NOTIFICATION_EMAIL").unwrap_or_else(|| "staff@example.com".to_string());
    let run_migrations = parse_or(&get, "RUN_MIGRATIONS", true)?;

    let seed_operator = match (get("SEED_OPERATOR_EMAIL"), get("SEED_OPERATOR_PASSWORD")) {
      (Some(email), Some(password)) => Some((email, password)),
      (None, None) => None,
      _ => {
        return Err(AppError::Config(
          "SEED_OPERATOR_EMAIL and SEED_OPERATOR_PASSWORD must be set together".to_string(),
        ))
      }
    };

    tracing::info!("Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      database_url,
      database_max_connections,
      store_timeout: Duration::from_millis(store_timeout_ms),
      session_ttl: chrono::Duration::hours(session_ttl_hours),
      webhook_secret,
      email_sender,
      staff_notification_email,
      run_migrations,
      seed_operator,
    })
  }

  pub fn server_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}

fn parse_or<T>(get: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> Result<T>
where
  T: FromStr,
  T::Err: std::fmt::Display,
{
  match get(name) {
    Some(raw) => raw
      .trim()
      .parse::<T>()
      .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
    None => Ok(default),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    move |name: &str| map.get(name).cloned()
  }

  const REQUIRED: [(&str, &str); 2] = [
    ("DATABASE_URL", "postgres://localhost/storefront"),
    ("WEBHOOK_SECRET", "whsec_test"),
  ];

  #[test]
  fn defaults_apply_when_only_required_vars_are_set() {
    let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();
    assert_eq!(config.server_address(), "127.0.0.1:8080");
    assert_eq!(config.store_timeout, Duration::from_millis(5000));
    assert_eq!(config.session_ttl, chrono::Duration::hours(8));
    assert_eq!(config.database_max_connections, 10);
    assert!(config.run_migrations);
    assert!(config.seed_operator.is_none());
  }

  #[test]
  fn missing_required_vars_fail() {
    let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
    assert!(matches!(err, AppError::Config(ref m) if m.contains("WEBHOOK_SECRET")));
  }

  #[test]
  fn invalid_values_fail_instead_of_defaulting() {
    for (name, value) in [
      ("SERVER_PORT", "eighty"),
      ("STORE_TIMEOUT_MS", "0"),
      ("SESSION_TTL_HOURS", "-1"),
      ("RUN_MIGRATIONS", "maybe"),
    ] {
      let mut vars = REQUIRED.to_vec();
      vars.push((name, value));
      assert!(
        matches!(AppConfig::from_lookup(lookup(&vars)), Err(AppError::Config(_))),
        "{name}={value} should be rejected"
      );
    }
  }

  #[test]
  fn seed_operator_needs_both_halves() {
    let mut vars = REQUIRED.to_vec();
    vars.push(("SEED_OPERATOR_EMAIL", "ops@example.com"));
    assert!(AppConfig::from_lookup(lookup(&vars)).is_err());

    vars.push(("SEED_OPERATOR_PASSWORD", "correct horse"));
    let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
    assert_eq!(
      config.seed_operator,
      Some(("ops@example.com".to_string(), "correct horse".to_string()))
    );
  }
}
