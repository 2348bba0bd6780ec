//! Password hashing using bcrypt
//!
//! Provides salted password hashing and verification.
//!
//! # Performance Considerations
//!
//! bcrypt is intentionally CPU-intensive. Request handlers go through
//! `hash_async`/`verify_async`, which move the work onto the blocking pool.

use quill_shared::validation::MAX_PASSWORD_BYTES;
use thiserror::Error;

/// Password hashing failures
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("password cannot be empty")]
    Empty,

    /// bcrypt silently ignores input past its ceiling, so longer passwords are refused
    #[error("password must be at most {max} bytes")]
    TooLong { max: usize },

    #[error("failed to hash password: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("task join error: {0}")]
    Task(String),
}

/// Password hashing service
///
/// Holds the bcrypt work factor. The factor is embedded in every hash, so
/// verification does not depend on the configured cost.
#[derive(Debug, Clone, Copy)]
pub struct PasswordService {
    cost: u32,
}

impl Default for PasswordService {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PasswordService {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    #[inline]
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a password with a fresh random salt (blocking operation)
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        if password.is_empty() {
            return Err(PasswordError::Empty);
        }
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(PasswordError::TooLong {
                max: MAX_PASSWORD_BYTES,
            });
        }
        Ok(bcrypt::hash(password, self.cost)?)
    }

    /// Hash a password asynchronously (non-blocking)
    pub async fn hash_async(&self, password: String) -> Result<String, PasswordError> {
        let service = *self;
        tokio::task::spawn_blocking(move || service.hash(&password))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))?
    }

    /// Check `password` against a stored hash (blocking operation)
    ///
    /// A malformed hash verifies as `false` rather than erroring.
    pub fn verify(hash: &str, password: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }

    /// Verify a password asynchronously (non-blocking)
    pub async fn verify_async(hash: String, password: String) -> Result<bool, PasswordError> {
        tokio::task::spawn_blocking(move || Self::verify(&hash, &password))
            .await
            .map_err(|e| PasswordError::Task(e.to_string()))
    }
}
