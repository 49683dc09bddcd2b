//! `SeaORM` implementation of the `UserService` trait.

use async_trait::async_trait;
use tracing::info;

use crate::db::{Store, unique_violation};
use crate::models::user::{CurrentUser, ProfileChanges, User};
use crate::services::user_service::{UserError, UserService};

pub struct SeaOrmUserService {
    store: Store,
}

impl SeaOrmUserService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    /// Loads `username` and checks that the caller is acting on themselves.
    async fn own_account(
        &self,
        caller: &CurrentUser,
        username: &str,
        action: &str,
    ) -> Result<User, UserError> {
        let user = self.get(username).await?;
        if user.id != caller.id {
            return Err(UserError::Forbidden(format!(
                "You can only {action} your own account"
            )));
        }
        Ok(user)
    }
}

#[async_trait]
impl UserService for SeaOrmUserService {
    async fn list(&self) -> Result<Vec<User>, UserError> {
        Ok(self.store.list_users().await?)
    }

    async fn get(&self, username: &str) -> Result<User, UserError> {
        self.store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }

    async fn update_profile(
        &self,
        caller: &CurrentUser,
        username: &str,
        changes: ProfileChanges,
    ) -> Result<User, UserError> {
        let user = self.own_account(caller, username, "update").await?;
        let changes = changes.normalized()?;

        if let Some(email) = &changes.email
            && *email != user.email
            && self.store.get_user_by_email(email).await?.is_some()
        {
            return Err(UserError::EmailTaken);
        }

        let updated = self
            .store
            .update_user_profile(user.id, changes)
            .await
            .map_err(|err| match unique_violation(&err) {
                Some(_) => UserError::EmailTaken,
                None => UserError::from(err),
            })?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        info!(user_id = user.id, "Updated profile for {}", user.username);
        Ok(updated)
    }

    async fn delete(&self, caller: &CurrentUser, username: &str) -> Result<(), UserError> {
        let user = self.own_account(caller, username, "delete").await?;

        if !self.store.delete_user(user.id).await? {
            return Err(UserError::NotFound(username.to_string()));
        }

        info!(user_id = user.id, "Deleted user {}", user.username);
        Ok(())
    }

    async fn set_active(&self, username: &str, is_active: bool) -> Result<User, UserError> {
        let user = self
            .store
            .set_user_active(username, is_active)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))?;

        info!(
            user_id = user.id,
            is_active, "Changed active flag for {}", user.username
        );
        Ok(user)
    }
}
