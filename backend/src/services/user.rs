//! User service for registration, login and profile lookup
//!
//! # Performance Optimizations
//!
//! - Password hashing/verification runs on the blocking thread pool
//! - The token service is passed by reference (pre-computed keys)

use crate::auth::{AuthUser, PasswordService, TokenService};
use crate::error::ApiError;
use crate::repositories::{NewUser, UserStore};
use quill_shared::types::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};
use quill_shared::validation::{validate_handle, validate_password};
use tracing::{debug, info};
use validator::Validate;

/// User service for authentication operations
pub struct UserService;

impl UserService {
    /// Register a new user
    pub async fn register<U: UserStore + ?Sized>(
        users: &U,
        passwords: &PasswordService,
        request: RegisterRequest,
    ) -> Result<UserResponse, ApiError> {
        request.validate()?;
        validate_handle(&request.handle).map_err(ApiError::Validation)?;
        validate_password(&request.password).map_err(ApiError::Validation)?;

        if users.find_user_by_email(&request.email).await?.is_some() {
            return Err(ApiError::Conflict(format!(
                "user with email {} already exists",
                request.email
            )));
        }
        if users.find_user_by_handle(&request.handle).await?.is_some() {
            return Err(ApiError::Conflict(format!(
                "handle {} is already taken",
                request.handle
            )));
        }

        // Hash password on blocking thread pool (CPU-intensive)
        let password_hash = passwords.hash_async(request.password).await?;

        let user = users
            .create_user(NewUser {
                handle: request.handle,
                name: request.name,
                email: request.email,
                password_hash,
            })
            .await?;

        info!(handle = %user.handle, "User registered");
        Ok(user.into())
    }

    /// Login with email and password
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login<U: UserStore + ?Sized>(
        users: &U,
        tokens: &TokenService,
        request: LoginRequest,
    ) -> Result<TokenResponse, ApiError> {
        request.validate()?;

        let user = users
            .find_user_by_email(&request.email)
            .await?
            .ok_or_else(|| {
                debug!("Login for unknown email");
                ApiError::InvalidCredentials
            })?;

        let valid = PasswordService::verify_async(user.password_hash, request.password).await?;
        if !valid {
            debug!(handle = %user.handle, "Login with wrong password");
            return Err(ApiError::InvalidCredentials);
        }

        let token = tokens.issue(&user.handle)?;

        Ok(TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.expiry_secs(),
        })
    }

    /// Fetch a user's own profile
    pub async fn get_user<U: UserStore + ?Sized>(
        users: &U,
        caller: &AuthUser,
        handle: &str,
    ) -> Result<UserResponse, ApiError> {
        caller.ensure_self(handle)?;

        let user = users
            .find_user_by_handle(handle)
            .await?
            .ok_or_else(|| ApiError::NotFound("user not found".to_string()))?;

        Ok(user.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::verify_and_extract_claims;
    use crate::repositories::MemoryStore;

    const SECRET: &str = "service-secret";

    fn register_request(handle: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            handle: handle.to_string(),
            name: "Alice".to_string(),
            email: email.to_string(),
            password: "pw".to_string(),
        }
    }

    fn login_request(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let store = MemoryStore::new();
        let passwords = PasswordService::new(4);
        let tokens = TokenService::new(SECRET, 3600);

        let user = UserService::register(&store, &passwords, register_request("alice", "alice@x.com"))
            .await
            .unwrap();
        assert_eq!(user.handle, "alice");

        let response = UserService::login(&store, &tokens, login_request("alice@x.com", "pw"))
            .await
            .unwrap();
        assert_eq!(response.token_type, "Bearer");
        assert_eq!(response.expires_in, 3600);

        let claims = verify_and_extract_claims(&response.token, SECRET.as_bytes()).unwrap();
        assert_eq!(claims.sub, "alice");
    }

    #[tokio::test]
    async fn test_password_is_stored_hashed() {
        let store = MemoryStore::new();
        UserService::register(&store, &PasswordService::new(4), register_request("alice", "alice@x.com"))
            .await
            .unwrap();

        let stored = store.find_user_by_handle("alice").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw");
        assert!(PasswordService::verify(&stored.password_hash, "pw"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let store = MemoryStore::new();
        let passwords = PasswordService::new(4);
        UserService::register(&store, &passwords, register_request("alice", "alice@x.com"))
            .await
            .unwrap();

        let same_email = UserService::register(&store, &passwords, register_request("alice2", "alice@x.com")).await;
        assert!(matches!(same_email, Err(ApiError::Conflict(_))));

        let same_handle = UserService::register(&store, &passwords, register_request("alice", "other@x.com")).await;
        assert!(matches!(same_handle, Err(ApiError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_register_rejects_bad_input() {
        let store = MemoryStore::new();
        let passwords = PasswordService::new(4);

        let mut request = register_request("alice", "alice@x.com");
        request.password = "a".repeat(73);
        assert!(matches!(
            UserService::register(&store, &passwords, request).await,
            Err(ApiError::Validation(_))
        ));

        let request = register_request("bad handle", "alice@x.com");
        assert!(matches!(
            UserService::register(&store, &passwords, request).await,
            Err(ApiError::Validation(_))
        ));

        let request = register_request("alice", "not-an-email");
        assert!(matches!(
            UserService::register(&store, &passwords, request).await,
            Err(ApiError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let store = MemoryStore::new();
        let tokens = TokenService::new(SECRET, 3600);
        UserService::register(&store, &PasswordService::new(4), register_request("alice", "alice@x.com"))
            .await
            .unwrap();

        let wrong_password = UserService::login(&store, &tokens, login_request("alice@x.com", "nope"))
            .await
            .unwrap_err();
        let unknown_email = UserService::login(&store, &tokens, login_request("bob@x.com", "pw"))
            .await
            .unwrap_err();

        assert_eq!(wrong_password.to_string(), unknown_email.to_string());
        assert_eq!(wrong_password.status(), unknown_email.status());
    }

    #[tokio::test]
    async fn test_get_user_is_self_only() {
        let store = MemoryStore::new();
        UserService::register(&store, &PasswordService::new(4), register_request("alice", "alice@x.com"))
            .await
            .unwrap();

        let alice = AuthUser {
            handle: "alice".to_string(),
        };
        let bob = AuthUser {
            handle: "bob".to_string(),
        };

        assert_eq!(
            UserService::get_user(&store, &alice, "alice").await.unwrap().email,
            "alice@x.com"
        );
        assert!(matches!(
            UserService::get_user(&store, &bob, "alice").await,
            Err(ApiError::Forbidden(_))
        ));
    }
}
