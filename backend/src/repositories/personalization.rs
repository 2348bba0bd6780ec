//! Personalization repository for database operations

use super::{conflict_or, PgStore, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use quill_shared::types::PersonalizationResponse;

/// Personalization record from database
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct PersonalizationRecord {
    pub handle: String,
    pub description: String,
    pub photo: String,
    pub updated_at: DateTime<Utc>,
}

impl From<PersonalizationRecord> for PersonalizationResponse {
    fn from(record: PersonalizationRecord) -> Self {
        Self {
            description: record.description,
            photo: record.photo,
            updated_at: record.updated_at,
        }
    }
}

/// Input for creating or replacing a personalization
#[derive(Debug, Clone)]
pub struct PersonalizationInput {
    pub handle: String,
    pub description: String,
    pub photo: String,
}

/// Personalization persistence, at most one record per user
#[async_trait]
pub trait PersonalizationStore: Send + Sync {
    async fn find_personalization(&self, handle: &str) -> StoreResult<Option<PersonalizationRecord>>;

    /// Insert; an existing record for the handle is a `Conflict`
    async fn create_personalization(
        &self,
        input: PersonalizationInput,
    ) -> StoreResult<PersonalizationRecord>;

    /// Replace; a missing record is `NotFound`
    async fn update_personalization(
        &self,
        input: PersonalizationInput,
    ) -> StoreResult<PersonalizationRecord>;
}

#[async_trait]
impl PersonalizationStore for PgStore {
    async fn find_personalization(&self, handle: &str) -> StoreResult<Option<PersonalizationRecord>> {
        let record = sqlx::query_as::<_, PersonalizationRecord>(
            r#"
            SELECT handle, description, photo, updated_at
            FROM personalizations
            WHERE handle = $1
            "#,
        )
        .bind(handle)
        .fetch_optional(self.pool())
        .await?;

        Ok(record)
    }

    async fn create_personalization(
        &self,
        input: PersonalizationInput,
    ) -> StoreResult<PersonalizationRecord> {
        sqlx::query_as::<_, PersonalizationRecord>(
            r#"
            INSERT INTO personalizations (handle, description, photo)
            VALUES ($1, $2, $3)
            RETURNING handle, description, photo, updated_at
            "#,
        )
        .bind(&input.handle)
        .bind(&input.description)
        .bind(&input.photo)
        .fetch_one(self.pool())
        .await
        .map_err(|e| conflict_or(e, "personalization already exists"))
    }

    async fn update_personalization(
        &self,
        input: PersonalizationInput,
    ) -> StoreResult<PersonalizationRecord> {
        sqlx::query_as::<_, PersonalizationRecord>(
            r#"
            UPDATE personalizations SET
                description = $2,
                photo = $3,
                updated_at = NOW()
            WHERE handle = $1
            RETURNING handle, description, photo, updated_at
            "#,
        )
        .bind(&input.handle)
        .bind(&input.description)
        .bind(&input.photo)
        .fetch_optional(self.pool())
        .await?
        .ok_or(StoreError::NotFound("personalization"))
    }
}
