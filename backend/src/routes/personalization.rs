//! Personalization routes
//!
//! Self-only reads and writes of a user's personalization record.

use super::ApiJson;
use crate::auth::{auth_middleware, AuthUser};
use crate::error::ApiResult;
use crate::repositories::Store;
use crate::services::{PersonalizationService, Upsert};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    middleware,
    routing::get,
    Json, Router,
};
use quill_shared::types::{PersonalizationRequest, PersonalizationResponse};

/// Create personalization routes
pub fn personalization_routes<S: Store>(state: AppState<S>) -> Router<AppState<S>> {
    Router::new()
        .route(
            "/users/:handle/personalization",
            get(get_personalization::<S>)
                .post(write_personalization::<S>)
                .put(write_personalization::<S>),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware::<S>))
}

/// GET /api/v1/users/:handle/personalization
async fn get_personalization<S: Store>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    Path(handle): Path<String>,
) -> ApiResult<Json<PersonalizationResponse>> {
    let record = PersonalizationService::get(state.store(), &user, &handle).await?;
    Ok(Json(record.into()))
}

/// Replace the personalization, creating it on first write
///
/// POST|PUT /api/v1/users/:handle/personalization
async fn write_personalization<S: Store>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    Path(handle): Path<String>,
    ApiJson(req): ApiJson<PersonalizationRequest>,
) -> ApiResult<(StatusCode, Json<PersonalizationResponse>)> {
    let (record, outcome) =
        PersonalizationService::upsert(state.store(), &user, &handle, req).await?;

    let status = match outcome {
        Upsert::Created => StatusCode::CREATED,
        Upsert::Updated => StatusCode::OK,
    };
    Ok((status, Json(record.into())))
}
