use anyhow::{Context, Result};
use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::entities::{songs, users};
use crate::models::user::{NewUser, ProfileChanges, User};

impl From<users::Model> for User {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            first_name: model.first_name,
            last_name: model.last_name,
            is_active: model.is_active,
            last_login: model.last_login,
            refresh_token_version: model.refresh_token_version,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct UserRepository {
    conn: DatabaseConnection,
}

impl UserRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    // ========================================================================
    // Lookups
    // ========================================================================

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>> {
        let user = users::Entity::find_by_id(id)
            .one(&self.conn)
            .await
            .context("Failed to query user by ID")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await
            .context("Failed to query user by username")?;

        Ok(user.map(User::from))
    }

    pub async fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.conn)
            .await
            .context("Failed to query user by email")?;

        Ok(user.map(User::from))
    }

    /// Looks up a user by username or email together with the password hash.
    pub async fn get_with_password(&self, identifier: &str) -> Result<Option<(User, String)>> {
        let user = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(identifier))
                    .add(users::Column::Email.eq(identifier.to_lowercase())),
            )
            .one(&self.conn)
            .await
            .context("Failed to query user for login")?;

        Ok(user.map(|u| {
            let password_hash = u.password_hash.clone();
            (User::from(u), password_hash)
        }))
    }

    pub async fn list(&self) -> Result<Vec<User>> {
        let rows = users::Entity::find()
            .order_by_asc(users::Column::Username)
            .all(&self.conn)
            .await
            .context("Failed to list users")?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Inserts a validated user, hashing the password on the blocking pool.
    pub async fn create(&self, new_user: NewUser, security: &SecurityConfig) -> Result<User> {
        let password = new_user.password.clone();
        let security = security.clone();
        let password_hash = task::spawn_blocking(move || hash_password(&password, &security))
            .await
            .context("Password hashing task panicked")??;

        let now = chrono::Utc::now().to_rfc3339();
        let active = users::ActiveModel {
            username: Set(new_user.username),
            email: Set(new_user.email),
            password_hash: Set(password_hash),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            is_active: Set(true),
            last_login: Set(None),
            refresh_token_version: Set(0),
            created_at: Set(now),
            updated_at: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert user")?;

        Ok(User::from(model))
    }

    pub async fn update_profile(&self, id: i32, changes: ProfileChanges) -> Result<Option<User>> {
        let Some(model) = users::Entity::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        if let Some(email) = changes.email {
            active.email = Set(email);
        }
        if let Some(first_name) = changes.first_name {
            active.first_name = Set(Some(first_name));
        }
        if let Some(last_name) = changes.last_name {
            active.last_name = Set(Some(last_name));
        }
        active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));

        let model = active
            .update(&self.conn)
            .await
            .context("Failed to update user profile")?;

        Ok(Some(User::from(model)))
    }

    /// Deletes the user and every song they own in one transaction.
    pub async fn delete(&self, id: i32) -> Result<bool> {
        let txn = self.conn.begin().await?;

        songs::Entity::delete_many()
            .filter(songs::Column::UserId.eq(id))
            .exec(&txn)
            .await
            .context("Failed to delete user songs")?;

        let result = users::Entity::delete_by_id(id)
            .exec(&txn)
            .await
            .context("Failed to delete user")?;

        txn.commit().await?;

        Ok(result.rows_affected > 0)
    }

    pub async fn set_active(&self, username: &str, is_active: bool) -> Result<Option<User>> {
        let Some(model) = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.conn)
            .await?
        else {
            return Ok(None);
        };

        let mut active: users::ActiveModel = model.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));
        let model = active.update(&self.conn).await?;

        Ok(Some(User::from(model)))
    }

    pub async fn touch_last_login(&self, id: i32) -> Result<()> {
        users::Entity::update_many()
            .col_expr(
                users::Column::LastLogin,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to update last login")?;

        Ok(())
    }

    // ========================================================================
    // Refresh token versions
    // ========================================================================

    /// Advances the version from `expected` to `expected + 1`.
    ///
    /// Returns `false` when another writer moved the version first.
    pub async fn rotate_refresh_version(&self, id: i32, expected: i64) -> Result<bool> {
        let now = chrono::Utc::now().to_rfc3339();
        let result = users::Entity::update_many()
            .col_expr(users::Column::RefreshTokenVersion, Expr::value(expected + 1))
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id))
            .filter(users::Column::RefreshTokenVersion.eq(expected))
            .exec(&self.conn)
            .await
            .context("Failed to rotate refresh token version")?;

        Ok(result.rows_affected == 1)
    }

    /// Unconditionally bumps the version, revoking every outstanding token.
    pub async fn bump_refresh_version(&self, id: i32) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        users::Entity::update_many()
            .col_expr(
                users::Column::RefreshTokenVersion,
                Expr::col(users::Column::RefreshTokenVersion).add(1),
            )
            .col_expr(users::Column::UpdatedAt, Expr::value(now))
            .filter(users::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to bump refresh token version")?;

        Ok(())
    }
}

/// Hash a password using Argon2id with the configured cost parameters.
pub fn hash_password(password: &str, config: &SecurityConfig) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| anyhow::anyhow!("Invalid Argon2 params: {e}"))?;
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {e}"))?;

    Ok(hash.to_string())
}

/// Checks a password against a stored hash on the blocking pool.
///
/// The parameters are read from the hash itself, so hashes created under an
/// older cost setting still verify.
pub async fn verify_password(password_hash: String, password: String) -> Result<bool> {
    task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&password_hash)
            .map_err(|e| anyhow::anyhow!("Invalid password hash format: {e}"))?;

        Ok::<bool, anyhow::Error>(
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed_hash)
                .is_ok(),
        )
    })
    .await
    .context("Password verification task panicked")?
}
