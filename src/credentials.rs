//! Password storage.
//!
//! Passwords are kept as Argon2id PHC strings (algorithm, parameters and salt
//! are embedded in the stored value), so every comparison goes through
//! [`verify`] instead of an equality check in SQL.

use crate::errors::AppError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

/// Hashing and verification run on the blocking pool.
pub async fn hash(password: &str) -> Result<String, AppError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_now(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

/// A stored value that does not parse as a PHC string never matches.
pub async fn verify(stored: &str, supplied: &str) -> Result<bool, AppError> {
    let stored = stored.to_owned();
    let supplied = supplied.to_owned();
    tokio::task::spawn_blocking(move || verify_now(&stored, &supplied))
        .await
        .map_err(|e| AppError::Internal(format!("Password check task failed: {}", e)))
}

fn hash_now(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

fn verify_now(stored: &str, supplied: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(parsed) => Argon2::default()
            .verify_password(supplied.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::warn!("Unreadable password hash in store: {}", e);
            false
        }
    }
}
