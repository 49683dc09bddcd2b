//! Domain service for user accounts.

use thiserror::Error;

use crate::models::ValidationError;
use crate::models::user::{CurrentUser, ProfileChanges, User};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User '{0}' not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Email already registered")]
    EmailTaken,

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for UserError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for UserError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ValidationError> for UserError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

#[async_trait::async_trait]
pub trait UserService: Send + Sync {
    async fn list(&self) -> Result<Vec<User>, UserError>;

    async fn get(&self, username: &str) -> Result<User, UserError>;

    /// Updates the caller's own profile.
    ///
    /// # Errors
    ///
    /// Returns [`UserError::Forbidden`] when `username` is not the caller.
    async fn update_profile(
        &self,
        caller: &CurrentUser,
        username: &str,
        changes: ProfileChanges,
    ) -> Result<User, UserError>;

    /// Deletes the caller's own account along with their songs.
    async fn delete(&self, caller: &CurrentUser, username: &str) -> Result<(), UserError>;

    /// Administrative toggle, not exposed over HTTP.
    async fn set_active(&self, username: &str, is_active: bool) -> Result<User, UserError>;
}
