//! JWT token issuance and validation
//!
//! Tokens are compact HS256 JWS values carrying `{sub, iat, exp}`. The
//! signing algorithm is pinned to the HMAC-SHA2 family: a token whose header
//! advertises `none` or an asymmetric algorithm is rejected before any
//! signature work happens.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, TokenData,
    Validation,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Algorithms a token header may advertise
pub const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Token validation failures
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(String),

    /// Bad signature, or a header algorithm outside the HMAC family
    #[error("invalid token signature")]
    InvalidSignature,

    #[error("token has expired")]
    Expired,

    #[error("token subject is empty")]
    MissingSubject,

    #[error("failed to sign token: {0}")]
    Encoding(jsonwebtoken::errors::Error),
}

/// JWT claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user handle)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Pre-computed JWT keys for efficient token operations
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    /// Create new JWT keys from secret
    /// This should be called once at startup
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret)),
            decoding: Arc::new(DecodingKey::from_secret(secret)),
        }
    }

    pub fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    pub fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token service holding the process-wide signing keys
///
/// Build once at startup from configuration and share through `AppState`.
/// Rotating the secret invalidates every outstanding token.
#[derive(Clone)]
pub struct TokenService {
    keys: JwtKeys,
    expiry_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, expiry_secs: i64) -> Self {
        Self {
            keys: JwtKeys::new(secret.as_bytes()),
            expiry_secs,
        }
    }

    /// Issue a token for `handle`, expiring `expiry_secs` from now
    pub fn issue(&self, handle: &str) -> Result<String, TokenError> {
        sign(&self.keys, handle, self.expiry_secs)
    }

    /// Check structure, algorithm, signature and expiry
    pub fn validate(&self, token: &str) -> Result<TokenData<Claims>, TokenError> {
        decode_token(token, self.keys.decoding())
    }

    /// Token lifetime in seconds
    #[inline]
    pub fn expiry_secs(&self) -> i64 {
        self.expiry_secs
    }
}

/// Issue a token signed with an explicit secret
pub fn issue_token(secret: &[u8], handle: &str, expiry_secs: i64) -> Result<String, TokenError> {
    sign(&JwtKeys::new(secret), handle, expiry_secs)
}

/// Verify a token against an explicit secret and return its claims
///
/// Applies the same algorithm and signature checks as
/// [`TokenService::validate`], followed by an explicit comparison of `exp`
/// against the current time.
pub fn verify_and_extract_claims(token: &str, secret: &[u8]) -> Result<Claims, TokenError> {
    let data = decode_token(token, &DecodingKey::from_secret(secret))?;
    if data.claims.exp < Utc::now().timestamp() {
        return Err(TokenError::Expired);
    }
    Ok(data.claims)
}

fn sign(keys: &JwtKeys, handle: &str, expiry_secs: i64) -> Result<String, TokenError> {
    if handle.is_empty() {
        return Err(TokenError::MissingSubject);
    }

    let now = Utc::now();
    let claims = Claims {
        sub: handle.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
    };

    encode(&Header::new(Algorithm::HS256), &claims, keys.encoding()).map_err(TokenError::Encoding)
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = HMAC_ALGORITHMS.to_vec();
    validation.leeway = 0;
    validation.validate_exp = true;
    validation.set_required_spec_claims(&["exp", "sub"]);
    validation
}

fn decode_token(token: &str, key: &DecodingKey) -> Result<TokenData<Claims>, TokenError> {
    ensure_hmac_header(token)?;
    decode::<Claims>(token, key, &validation()).map_err(classify)
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Reject algorithm confusion before handing the token to the decoder
///
/// The decoder cannot even parse a header claiming `none`, which would
/// surface as a generic parse error; inspecting `alg` directly lets every
/// non-HMAC algorithm fail uniformly as a signature error.
fn ensure_hmac_header(token: &str) -> Result<(), TokenError> {
    let mut segments = token.split('.');
    let header = match (segments.next(), segments.next(), segments.next(), segments.next()) {
        (Some(header), Some(_), Some(_), None) => header,
        _ => return Err(TokenError::Malformed("expected three segments".to_string())),
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(header)
        .map_err(|e| TokenError::Malformed(format!("header encoding: {}", e)))?;
    let raw: RawHeader = serde_json::from_slice(&bytes)
        .map_err(|e| TokenError::Malformed(format!("header: {}", e)))?;

    match raw.alg.as_str() {
        "HS256" | "HS384" | "HS512" => Ok(()),
        other => {
            debug!(alg = other, "rejecting token with unexpected signing method");
            Err(TokenError::InvalidSignature)
        }
    }
}

fn classify(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature
        | ErrorKind::InvalidAlgorithm
        | ErrorKind::InvalidAlgorithmName
        | ErrorKind::InvalidKeyFormat => TokenError::InvalidSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed(err.to_string()),
    }
}
