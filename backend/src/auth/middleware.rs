//! Authentication gate
//!
//! Resolves the caller's identity from a bearer token, looked up first in
//! the `Authorization` header and then in the `token` query parameter.
//! Every failure (no token, bad token, unknown subject) is reported the
//! same way: 403 with `permission denied`.
//!
//! # Performance
//!
//! Uses the pre-computed JWT keys from AppState to avoid key derivation on
//! every request.

use crate::auth::TokenService;
use crate::error::ApiError;
use crate::repositories::{Store, UserStore};
use crate::state::AppState;
use axum::{
    extract::{FromRequestParts, Query, Request, State},
    http::{header::AUTHORIZATION, request::Parts, Extensions, HeaderMap, Uri},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;
use tracing::debug;

/// Query parameter consulted when no `Authorization` header is present
pub const TOKEN_QUERY_PARAM: &str = "token";

/// Authenticated user resolved from a valid token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub handle: String,
}

impl AuthUser {
    /// Allow only the user named in the path
    pub fn ensure_self(&self, handle: &str) -> Result<(), ApiError> {
        if self.handle == handle {
            Ok(())
        } else {
            debug!(caller = %self.handle, target = %handle, "rejecting access to another user");
            Err(ApiError::Forbidden(
                "you are not authorized to access this user".to_string(),
            ))
        }
    }

    /// Allow only the owner of a resource
    pub fn ensure_owner(&self, owner: &str, action: &str) -> Result<(), ApiError> {
        if self.handle == owner {
            Ok(())
        } else {
            debug!(caller = %self.handle, owner = %owner, action, "rejecting non-owner");
            Err(ApiError::Forbidden(format!(
                "you are not authorized to {}",
                action
            )))
        }
    }
}

/// Handle of the authenticated caller, or `""` when the request never
/// passed through the gate
pub fn current_handle(extensions: &Extensions) -> &str {
    extensions
        .get::<AuthUser>()
        .map(|user| user.handle.as_str())
        .unwrap_or("")
}

#[derive(Deserialize)]
struct TokenQuery {
    token: Option<String>,
}

/// Locate the raw token on a request
///
/// A present `Authorization` header wins over the query parameter; a
/// leading `Bearer` scheme (any case) is stripped when present.
pub fn token_from_request(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    if let Some(value) = header {
        return Some(strip_bearer(value).trim().to_string());
    }

    Query::<TokenQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(query)| query.token)
        .filter(|token| !token.is_empty())
}

fn strip_bearer(value: &str) -> &str {
    match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest,
        _ => value,
    }
}

/// Validate the request's token and confirm its subject still exists
pub async fn authenticate<U>(
    tokens: &TokenService,
    users: &U,
    headers: &HeaderMap,
    uri: &Uri,
) -> Result<AuthUser, ApiError>
where
    U: UserStore + ?Sized,
{
    let token = token_from_request(headers, uri).ok_or_else(|| {
        debug!("No token on request");
        ApiError::PermissionDenied
    })?;

    let data = tokens.validate(&token).map_err(|e| {
        debug!(error = %e, "Failed to validate token");
        ApiError::PermissionDenied
    })?;

    // Store I/O errors propagate as 500; only a miss is an auth failure
    let user = users
        .find_user_by_handle(&data.claims.sub)
        .await?
        .ok_or_else(|| {
            debug!(handle = %data.claims.sub, "Token subject no longer exists");
            ApiError::PermissionDenied
        })?;

    Ok(AuthUser {
        handle: user.handle,
    })
}

#[axum::async_trait]
impl<S: Store> FromRequestParts<AppState<S>> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<S>,
    ) -> Result<Self, Self::Rejection> {
        // Already resolved by `auth_middleware` on this route
        let handle = current_handle(&parts.extensions);
        if !handle.is_empty() {
            return Ok(AuthUser {
                handle: handle.to_string(),
            });
        }

        authenticate(state.tokens(), state.store(), &parts.headers, &parts.uri).await
    }
}

/// Middleware form of the gate for a group of routes
///
/// Stores the resolved [`AuthUser`] in the request extensions, where
/// [`current_handle`] and the extractor pick it up.
pub async fn auth_middleware<S: Store>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = authenticate(
        state.tokens(),
        state.store(),
        request.headers(),
        request.uri(),
    )
    .await?;

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}
