// apps/storefront/src/services/auth_service.rs

//! Operator credentials: Argon2 password hashes and opaque session tokens.

use crate::errors::AppError;
use argon2::{
  password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use rand_core::{OsRng, RngCore};
use std::fmt::Write;
use tracing::{debug, error, instrument};

const SESSION_TOKEN_BYTES: usize = 32;

#[instrument(name = "auth_service::hash_password", skip(password), err(Display))]
pub fn hash_password(password: &str) -> Result<String, AppError> {
  if password.is_empty() {
    return Err(AppError::Validation("Password cannot be empty.".to_string()));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 password hashing failed.");
      AppError::Internal(format!("Password hashing failed: {}", e))
    })
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash itself is unusable.
#[instrument(name = "auth_service::verify_password", skip_all)]
pub fn verify_password(stored_hash: &str, provided_password: &str) -> Result<bool, AppError> {
  if provided_password.is_empty() {
    return Ok(false);
  }

  let parsed_hash = PasswordHash::new(stored_hash).map_err(|e| {
    error!(error = %e, "Stored operator password hash is malformed.");
    AppError::Internal(format!("Invalid stored password hash: {}", e))
  })?;

  match Argon2::default().verify_password(provided_password.as_bytes(), &parsed_hash) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Operator password mismatch.");
      Ok(false)
    }
    Err(e) => {
      error!(error = %e, "Argon2 password verification failed.");
      Err(AppError::Internal(format!("Password verification failed: {}", e)))
    }
  }
}

/// 256 random bits from the OS, hex-encoded.
pub fn generate_session_token() -> String {
  let mut bytes = [0u8; SESSION_TOKEN_BYTES];
  OsRng.fill_bytes(&mut bytes);
  bytes.iter().fold(String::with_capacity(SESSION_TOKEN_BYTES * 2), |mut out, b| {
    let _ = write!(out, "{:02x}", b);
    out
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn hashed_password_verifies_and_rejects_others() {
    let hash = hash_password("correct horse battery staple").unwrap();
    assert!(hash.starts_with("$argon2"));
    assert!(verify_password(&hash, "correct horse battery staple").unwrap());
    assert!(!verify_password(&hash, "Tr0ub4dor&3").unwrap());
    assert!(!verify_password(&hash, "").unwrap());
  }

  #[test]
  fn empty_password_cannot_be_hashed() {
    assert!(matches!(hash_password(""), Err(AppError::Validation(_))));
  }

  #[test]
  fn malformed_stored_hash_is_an_internal_error() {
    assert!(matches!(verify_password("not-a-hash", "pw"), Err(AppError::Internal(_))));
  }

  #[test]
  fn session_tokens_are_long_and_unique() {
    let a = generate_session_token();
    let b = generate_session_token();
    assert_eq!(a.len(), 64);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(a, b);
  }
}
