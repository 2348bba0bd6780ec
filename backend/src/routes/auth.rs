//! Authentication routes
//!
//! Provides endpoints for user registration and login.
//!
//! # Performance Optimizations
//!
//! - Uses pre-computed JWT keys from AppState (no per-request allocation)
//! - Password hashing runs on blocking thread pool (doesn't block async runtime)

use super::ApiJson;
use crate::error::ApiResult;
use crate::repositories::Store;
use crate::services::UserService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use quill_shared::types::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};

/// Create auth routes
pub fn auth_routes<S: Store>() -> Router<AppState<S>> {
    Router::new()
        .route("/register", post(register::<S>))
        .route("/login", post(login::<S>))
}

/// Register a new user
///
/// POST /api/v1/register
async fn register<S: Store>(
    State(state): State<AppState<S>>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = UserService::register(state.store(), state.passwords(), req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Login with email and password
///
/// POST /api/v1/login
async fn login<S: Store>(
    State(state): State<AppState<S>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ApiResult<Json<TokenResponse>> {
    let tokens = UserService::login(state.store(), state.tokens(), req).await?;
    Ok(Json(tokens))
}
