//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::auth::{TokenIssuer, TokenKind, TokenPair};
use crate::config::SecurityConfig;
use crate::db::{Store, unique_violation};
use crate::db::repositories::user::verify_password;
use crate::models::user::{CurrentUser, NewUser, User};
use crate::services::auth_service::{AuthError, AuthService};

fn record_event(event: &'static str, outcome: &'static str) {
    let labels = [("event", event), ("outcome", outcome)];
    metrics::counter!("auth_events_total", &labels).increment(1);
}

pub struct SeaOrmAuthService {
    store: Store,
    tokens: TokenIssuer,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, tokens: TokenIssuer, security: SecurityConfig) -> Self {
        Self {
            store,
            tokens,
            security,
        }
    }

    async fn load_active_user(&self, user_id: i32) -> Result<User, AuthError> {
        let user = self
            .store
            .get_user(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;

        if !user.is_active {
            return Err(AuthError::InactiveUser);
        }
        Ok(user)
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn register(&self, new_user: NewUser) -> Result<User, AuthError> {
        let new_user = new_user.normalized()?;

        if self
            .store
            .get_user_by_username(&new_user.username)
            .await?
            .is_some()
        {
            return Err(AuthError::UsernameTaken);
        }

        if self
            .store
            .get_user_by_email(&new_user.email)
            .await?
            .is_some()
        {
            return Err(AuthError::EmailTaken);
        }

        // A concurrent registration can still win the race to the unique index.
        let user = self
            .store
            .create_user(new_user, &self.security)
            .await
            .map_err(|err| match unique_violation(&err) {
                Some(constraint) if constraint.contains("email") => AuthError::EmailTaken,
                Some(_) => AuthError::UsernameTaken,
                None => AuthError::from(err),
            })?;

        record_event("register", "success");
        info!(user_id = user.id, "Registered user {}", user.username);
        Ok(user)
    }

    async fn login(&self, identifier: &str, password: &str) -> Result<TokenPair, AuthError> {
        let identifier = identifier.trim();
        if identifier.is_empty() || password.is_empty() {
            return Err(AuthError::Validation(
                "Username and password are required".to_string(),
            ));
        }

        let Some((user, password_hash)) = self.store.get_user_with_password(identifier).await?
        else {
            record_event("login", "failure");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password_hash, password.to_string()).await? {
            record_event("login", "failure");
            warn!("Failed login attempt for {}", identifier);
            return Err(AuthError::InvalidCredentials);
        }

        if !user.is_active {
            record_event("login", "inactive");
            return Err(AuthError::InactiveUser);
        }

        self.store.touch_user_last_login(user.id).await?;

        let pair = self
            .tokens
            .issue_pair(user.id, &user.username, user.refresh_token_version)?;

        record_event("login", "success");
        info!(user_id = user.id, "User {} logged in", user.username);
        Ok(pair)
    }

    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let claims = self.tokens.verify(refresh_token, TokenKind::Refresh)?;
        let user = self.load_active_user(claims.uid).await?;

        let stored = user.refresh_token_version;
        if claims.ver < stored {
            record_event("refresh", "revoked");
            warn!(
                user_id = user.id,
                token_version = claims.ver,
                stored_version = stored,
                "Rejected stale refresh token"
            );
            return Err(AuthError::TokenRevoked);
        }

        // Only one of several concurrent refreshes can move the version.
        if !self.store.rotate_refresh_version(user.id, stored).await? {
            record_event("refresh", "revoked");
            return Err(AuthError::TokenRevoked);
        }

        let pair = self
            .tokens
            .issue_pair(user.id, &user.username, stored + 1)?;

        record_event("refresh", "success");
        Ok(pair)
    }

    async fn authenticate(&self, access_token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.tokens.verify(access_token, TokenKind::Access)?;
        let user = self.load_active_user(claims.uid).await?;

        if claims.ver < user.refresh_token_version {
            return Err(AuthError::TokenRevoked);
        }

        Ok(CurrentUser {
            id: user.id,
            username: user.username,
        })
    }

    async fn logout(&self, user: &CurrentUser) -> Result<(), AuthError> {
        self.store.bump_refresh_version(user.id).await?;

        record_event("logout", "success");
        info!(user_id = user.id, "User {} logged out", user.username);
        Ok(())
    }

    fn refresh_ttl_secs(&self) -> i64 {
        self.tokens.refresh_ttl_secs()
    }
}
