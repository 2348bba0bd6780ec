//! Database repositories
//!
//! Provides the data access layer. Each resource has a store trait so the
//! HTTP layer can run against Postgres in production and an in-memory store
//! in tests.

pub mod blog;
pub mod memory;
pub mod personalization;
pub mod user;

pub use blog::{BlogRecord, BlogStore};
pub use memory::MemoryStore;
pub use personalization::{PersonalizationInput, PersonalizationRecord, PersonalizationStore};
pub use user::{NewUser, UserRecord, UserStore};

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;

/// Storage failures surfaced to the service layer
#[derive(Debug, Error)]
pub enum StoreError {
    /// The named entity does not exist
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A uniqueness constraint was violated
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Map a unique-constraint violation to `Conflict`, anything else to `Database`
pub(crate) fn conflict_or(err: sqlx::Error, message: &str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(message.to_string())
        }
        _ => StoreError::Database(err),
    }
}

/// Everything the HTTP layer needs from persistence
#[async_trait]
pub trait Store: UserStore + BlogStore + PersonalizationStore + Clone + Send + Sync + 'static {
    /// Cheap round trip used by the readiness probe
    async fn health_check(&self) -> StoreResult<()>;
}

/// Postgres-backed store
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool for `config` and wrap it
    pub async fn connect(config: &crate::config::DatabaseConfig) -> anyhow::Result<Self> {
        Ok(Self::new(crate::db::connect(config).await?))
    }

    #[inline]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> StoreResult<()> {
        crate::db::health_check(&self.pool).await?;
        Ok(())
    }
}
