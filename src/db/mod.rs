use anyhow::{Context, Result};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::config::{DatabaseConfig, SecurityConfig};
use crate::models::song::{NewSong, Song, SongChanges};
use crate::models::user::{NewUser, ProfileChanges, User};

pub mod migrator;
pub mod repositories;

/// Returns the constraint message when `err` was raised by a unique index.
#[must_use]
pub fn unique_violation(err: &anyhow::Error) -> Option<String> {
    match err.downcast_ref::<DbErr>()?.sql_err()? {
        SqlErr::UniqueConstraintViolation(message) => Some(message),
        _ => None,
    }
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn from_config(config: &DatabaseConfig) -> Result<Self> {
        Self::with_pool_options(
            &config.connection_url(),
            config.max_connections,
            config.min_connections,
        )
        .await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.ends_with(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            if let Some(parent) = Path::new(path_str).parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            if !tokio::fs::try_exists(path_str).await.unwrap_or(false) {
                tokio::fs::File::create(path_str)
                    .await
                    .with_context(|| format!("Failed to create database file {path_str}"))?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    fn song_repo(&self) -> repositories::song::SongRepository {
        repositories::song::SongRepository::new(self.conn.clone())
    }

    fn user_repo(&self) -> repositories::user::UserRepository {
        repositories::user::UserRepository::new(self.conn.clone())
    }

    // ========================================================================
    // Songs
    // ========================================================================

    pub async fn add_song(&self, owner_id: i32, song: NewSong) -> Result<Song> {
        self.song_repo().add(owner_id, song).await
    }

    pub async fn get_owned_song(&self, id: i32, owner_id: i32) -> Result<Option<Song>> {
        self.song_repo().get_owned(id, owner_id).await
    }

    pub async fn list_songs(&self, owner_id: Option<i32>) -> Result<Vec<Song>> {
        self.song_repo().list(owner_id).await
    }

    pub async fn find_duplicate_song(
        &self,
        owner_id: i32,
        title: &str,
        artist: &str,
    ) -> Result<Option<i32>> {
        self.song_repo().find_duplicate(owner_id, title, artist).await
    }

    pub async fn update_song(&self, id: i32, changes: SongChanges) -> Result<Option<Song>> {
        self.song_repo().update(id, changes).await
    }

    pub async fn remove_song(&self, id: i32) -> Result<bool> {
        self.song_repo().remove(id).await
    }

    pub async fn record_song_play(&self, id: i32) -> Result<Option<Song>> {
        self.song_repo().record_play(id).await
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn create_user(&self, user: NewUser, security: &SecurityConfig) -> Result<User> {
        self.user_repo().create(user, security).await
    }

    pub async fn get_user(&self, id: i32) -> Result<Option<User>> {
        self.user_repo().get_by_id(id).await
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        self.user_repo().get_by_username(username).await
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        self.user_repo().get_by_email(email).await
    }

    pub async fn get_user_with_password(&self, identifier: &str) -> Result<Option<(User, String)>> {
        self.user_repo().get_with_password(identifier).await
    }

    pub async fn list_users(&self) -> Result<Vec<User>> {
        self.user_repo().list().await
    }

    pub async fn update_user_profile(
        &self,
        id: i32,
        changes: ProfileChanges,
    ) -> Result<Option<User>> {
        self.user_repo().update_profile(id, changes).await
    }

    pub async fn delete_user(&self, id: i32) -> Result<bool> {
        self.user_repo().delete(id).await
    }

    pub async fn set_user_active(&self, username: &str, is_active: bool) -> Result<Option<User>> {
        self.user_repo().set_active(username, is_active).await
    }

    pub async fn touch_user_last_login(&self, id: i32) -> Result<()> {
        self.user_repo().touch_last_login(id).await
    }

    pub async fn rotate_refresh_version(&self, user_id: i32, expected: i64) -> Result<bool> {
        self.user_repo()
            .rotate_refresh_version(user_id, expected)
            .await
    }

    pub async fn bump_refresh_version(&self, user_id: i32) -> Result<()> {
        self.user_repo().bump_refresh_version(user_id).await
    }
}
