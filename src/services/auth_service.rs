//! Domain service for registration, login and token lifecycle.
//!
//! Access and refresh tokens carry the user's `refresh_token_version`.
//! Refreshing advances that version, so each refresh token works once;
//! logout advances it too, revoking everything issued before.

use thiserror::Error;

use crate::auth::{TokenError, TokenPair};
use crate::models::ValidationError;
use crate::models::user::{CurrentUser, NewUser, User};

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("User account is inactive")]
    InactiveUser,

    #[error("Could not validate credentials")]
    InvalidToken,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Token has been revoked")]
    TokenRevoked,

    #[error("Username already registered")]
    UsernameTaken,

    #[error("Email already registered")]
    EmailTaken,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ValidationError> for AuthError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Invalid | TokenError::WrongKind { .. } => Self::InvalidToken,
            TokenError::Encode(msg) => Self::Internal(msg),
        }
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Validates and stores a new account.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UsernameTaken`] or [`AuthError::EmailTaken`] on duplicates.
    async fn register(&self, new_user: NewUser) -> Result<User, AuthError>;

    /// Verifies credentials (username or email) and issues a token pair.
    async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, AuthError>;

    /// Exchanges a refresh token for a new pair, retiring the old one.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::TokenRevoked`] if the token was already used.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;

    /// Resolves an access token to the calling user.
    async fn authenticate(&self, access_token: &str) -> Result<CurrentUser, AuthError>;

    /// Revokes every outstanding token of the user.
    async fn logout(&self, user: &CurrentUser) -> Result<(), AuthError>;

    /// Refresh token lifetime in seconds, used for cookie max-age.
    fn refresh_ttl_secs(&self) -> i64;
}
