//! User repository for database operations

use super::{conflict_or, PgStore, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_shared::types::UserResponse;

/// User record from database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRecord {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            handle: user.handle,
            name: user.name,
            email: user.email,
        }
    }
}

/// Input for creating a user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub handle: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a user; a duplicate handle or email is a `Conflict`
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    async fn find_user_by_handle(&self, handle: &str) -> StoreResult<Option<UserRecord>>;

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
}

#[async_trait]
impl UserStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (handle, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING handle, name, email, password_hash, created_at
            "#,
        )
        .bind(&user.handle)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(self.pool())
        .await
        .map_err(|e| conflict_or(e, "user with this handle or email already exists"))
    }

    async fn find_user_by_handle(&self, handle: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT handle, name, email, password_hash, created_at
            FROM users
            WHERE handle = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(self.pool())
        .await?;

        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let user = sqlx::query_as::<_, UserRecord>(
            r#"
            SELECT handle, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        Ok(user)
    }
}
