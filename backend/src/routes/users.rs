//! User routes
//!
//! Every route here sits behind the auth gate and is self-only.

use crate::auth::{auth_middleware, AuthUser};
use crate::error::ApiResult;
use crate::repositories::Store;
use crate::services::UserService;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    middleware,
    routing::get,
    Json, Router,
};
use quill_shared::types::UserResponse;

/// Create user routes
pub fn user_routes<S: Store>(state: AppState<S>) -> Router<AppState<S>> {
    Router::new()
        .route("/users/:handle", get(get_user::<S>))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware::<S>))
}

/// Fetch the caller's own account
///
/// GET /api/v1/users/:handle
async fn get_user<S: Store>(
    State(state): State<AppState<S>>,
    user: AuthUser,
    Path(handle): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    let response = UserService::get_user(state.store(), &user, &handle).await?;
    Ok(Json(response))
}
