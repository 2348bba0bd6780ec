//! Route definitions for the Quill API
//!
//! This module organizes all API routes and applies middleware.

use crate::error::ApiError;
use crate::middleware::{cors_layer, rate_limit_middleware};
use crate::repositories::Store;
use crate::state::AppState;
use axum::{
    extract::{FromRequest, FromRequestParts},
    middleware,
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod blogs;
mod health;
mod personalization;
mod users;


pub use auth::auth_routes;
pub use blogs::blog_routes;
pub use personalization::personalization_routes;
pub use users::user_routes;

/// JSON body extractor whose rejection renders the `{"error": …}` envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor with the same error envelope as [`ApiJson`]
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Create the main application router with all middleware
///
/// The rate limiter is the outermost layer, so rejected requests never
/// reach CORS handling or routing.
pub fn create_router<S: Store>(state: AppState<S>) -> Router {
    let timeout = Duration::from_secs(state.config().server.request_timeout_secs);
    let cors = cors_layer(&state.config().cors);
    let limiter = state.rate_limiter().clone();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check::<S>))
        .route("/health/live", get(health::liveness_check))
        .nest("/api/v1", api_routes(&state))
        // Apply middleware layers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(timeout))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
        .with_state(state)
}

/// API v1 routes
fn api_routes<S: Store>(state: &AppState<S>) -> Router<AppState<S>> {
    Router::new()
        .route("/", get(|| async { "Quill API v1" }))
        .merge(auth::auth_routes::<S>())
        .merge(users::user_routes(state.clone()))
        .merge(personalization::personalization_routes(state.clone()))
        .merge(blogs::blog_routes::<S>())
}
