//! Authentication module
//!
//! Provides HS256 JWT authentication with bcrypt password hashing.

mod jwt;
mod middleware;
mod password;

pub use jwt::{
    issue_token, verify_and_extract_claims, Claims, JwtKeys, TokenError, TokenService,
    HMAC_ALGORITHMS,
};
pub use middleware::{
    auth_middleware, authenticate, current_handle, token_from_request, AuthUser,
    TOKEN_QUERY_PARAM,
};
pub use password::{PasswordError, PasswordService};
