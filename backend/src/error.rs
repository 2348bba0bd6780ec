//! Application error handling
//!
//! This module provides unified error handling for the API,
//! converting internal errors to `{"error": "<message>"}` responses.

use crate::auth::{PasswordError, TokenError};
use crate::repositories::StoreError;
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_shared::types::ErrorResponse;
use thiserror::Error;
use tracing::error;

/// Message returned for every authentication failure
pub const PERMISSION_DENIED: &str = "permission denied";

/// API error type that can be converted to HTTP responses
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    BadRequest(String),

    /// Duplicate email, handle or slug. Reported as 400, not 409.
    #[error("{0}")]
    Conflict(String),

    /// Missing, invalid or expired token, or unknown token subject
    #[error("permission denied")]
    PermissionDenied,

    /// Login with an unknown email or a wrong password
    #[error("invalid email or password")]
    InvalidCredentials,

    /// Authenticated, but not allowed to touch this resource
    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("internal server error")]
    Database(#[from] sqlx::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadRequest(_) | ApiError::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::PermissionDenied | ApiError::InvalidCredentials | ApiError::Forbidden(_) => {
                StatusCode::FORBIDDEN
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) | ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Internal(err) => error!("Internal error: {:?}", err),
            ApiError::Database(err) => error!("Database error: {:?}", err),
            _ => {}
        }

        let body = Json(ErrorResponse {
            error: self.to_string(),
        });

        (self.status(), body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(format!("{} not found", what)),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Database(err) => ApiError::Database(err),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Encoding(e) => ApiError::Internal(anyhow::anyhow!("token encoding: {}", e)),
            TokenError::MissingSubject => ApiError::BadRequest(err.to_string()),
            TokenError::Malformed(_) | TokenError::InvalidSignature | TokenError::Expired => {
                ApiError::PermissionDenied
            }
        }
    }
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        match err {
            PasswordError::Empty | PasswordError::TooLong { .. } => {
                ApiError::Validation(err.to_string())
            }
            PasswordError::Hash(e) => ApiError::Internal(anyhow::anyhow!("password hashing: {}", e)),
            PasswordError::Task(e) => ApiError::Internal(anyhow::anyhow!("password task: {}", e)),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::Validation(format!("invalid payload: {}", errors))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

/// Result type alias for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
