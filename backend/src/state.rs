//! Application state management
//!
//! This module provides the shared application state that is passed
//! to all request handlers via Axum's state extraction.
//!
//! # Design Principles
//!
//! 1. **Pre-compute expensive resources**: JWT keys and the store are created once
//! 2. **Cheap cloning**: All fields use Arc or are already Clone-cheap
//! 3. **Explicit configuration**: nothing reads the environment after start-up

use crate::auth::{PasswordService, TokenService};
use crate::config::AppConfig;
use crate::middleware::RateLimiter;
use crate::repositories::Store;
use std::sync::Arc;

/// Shared application state
///
/// Generic over the store so the same router runs against Postgres in
/// production and the in-memory store in tests.
#[derive(Clone)]
pub struct AppState<S> {
    /// Persistence backend
    pub store: S,
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Pre-initialized token service with cached keys
    pub tokens: TokenService,
    /// bcrypt hashing with the configured cost
    pub passwords: PasswordService,
    /// Per-client request limiter shared by every connection
    pub rate_limiter: RateLimiter,
}

impl<S: Store> AppState<S> {
    /// Create a new application state
    ///
    /// Derives the JWT keys from the config secret, so this should only
    /// be called once at application startup.
    pub fn new(store: S, config: AppConfig) -> Self {
        let tokens = TokenService::new(&config.jwt.secret, config.jwt.expiry_secs);
        let passwords = PasswordService::new(config.password.bcrypt_cost);
        let rate_limiter = RateLimiter::from_config(&config.rate_limit);

        Self {
            store,
            config: Arc::new(config),
            tokens,
            passwords,
            rate_limiter,
        }
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    #[inline]
    pub fn passwords(&self) -> &PasswordService {
        &self.passwords
    }

    #[inline]
    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}
