//! Personalization service: one self-only record per user

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::repositories::{
    PersonalizationInput, PersonalizationRecord, PersonalizationStore, StoreError, UserStore,
};
use quill_shared::types::PersonalizationRequest;
use tracing::info;
use validator::Validate;

/// Whether a write replaced an existing record or created one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Updated,
    Created,
}

pub struct PersonalizationService;

impl PersonalizationService {
    pub async fn get<P: PersonalizationStore + ?Sized>(
        store: &P,
        caller: &AuthUser,
        handle: &str,
    ) -> Result<PersonalizationRecord, ApiError> {
        caller.ensure_self(handle)?;

        store
            .find_personalization(handle)
            .await?
            .ok_or_else(|| ApiError::NotFound("personalization not found".to_string()))
    }

    /// Replace the caller's personalization, creating it when absent
    pub async fn upsert<P>(
        store: &P,
        caller: &AuthUser,
        handle: &str,
        request: PersonalizationRequest,
    ) -> Result<(PersonalizationRecord, Upsert), ApiError>
    where
        P: PersonalizationStore + UserStore + ?Sized,
    {
        caller.ensure_self(handle)?;
        request.validate()?;

        if store.find_user_by_handle(handle).await?.is_none() {
            return Err(ApiError::NotFound("user not found".to_string()));
        }

        let input = PersonalizationInput {
            handle: handle.to_string(),
            description: request.description,
            photo: request.photo,
        };

        match store.update_personalization(input.clone()).await {
            Ok(record) => Ok((record, Upsert::Updated)),
            Err(StoreError::NotFound(_)) => {
                let record = store.create_personalization(input).await?;
                info!(handle = %record.handle, "Personalization created");
                Ok((record, Upsert::Created))
            }
            Err(e) => Err(e.into()),
        }
    }
}
