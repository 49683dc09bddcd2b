//! Domain service for song records.
//!
//! Reads (list, search) are global unless a user filter is given. Single-song
//! lookups and every mutation are scoped to the caller: a song owned by
//! someone else behaves as if it does not exist.

use thiserror::Error;

use crate::models::ValidationError;
use crate::models::song::{NewSong, Song, SongChanges, SongStats};
use crate::models::user::CurrentUser;

pub const MIN_SEARCH_LEN: usize = 2;

#[derive(Debug, Error)]
pub enum SongError {
    #[error("Song {0} not found")]
    NotFound(i32),

    #[error("User '{0}' not found")]
    UserNotFound(String),

    #[error("Song '{title}' by '{artist}' already exists")]
    Duplicate { title: String, artist: String },

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for SongError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SongError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<ValidationError> for SongError {
    fn from(err: ValidationError) -> Self {
        Self::Validation(err.0)
    }
}

#[async_trait::async_trait]
pub trait SongService: Send + Sync {
    async fn create(&self, owner: &CurrentUser, song: NewSong) -> Result<Song, SongError>;

    /// Lists songs newest first. `user` restricts to one owner's songs; an
    /// unknown username yields an empty list.
    async fn list(&self, user: Option<&str>) -> Result<Vec<Song>, SongError>;

    /// Case-insensitive substring match on title or artist.
    ///
    /// # Errors
    ///
    /// Returns [`SongError::Validation`] if the trimmed query is shorter than
    /// [`MIN_SEARCH_LEN`] characters.
    async fn search(&self, query: &str, user: Option<&str>) -> Result<Vec<Song>, SongError>;

    async fn get(&self, id: i32, owner: &CurrentUser) -> Result<Song, SongError>;

    /// Applies a partial update and returns the stored result.
    async fn update(
        &self,
        id: i32,
        owner: &CurrentUser,
        changes: SongChanges,
    ) -> Result<Song, SongError>;

    /// Deletes the song and returns it as it was.
    async fn delete(&self, id: i32, owner: &CurrentUser) -> Result<Song, SongError>;

    /// Bumps the play counter.
    async fn play(&self, id: i32, owner: &CurrentUser) -> Result<Song, SongError>;

    async fn stats(&self, username: &str) -> Result<SongStats, SongError>;
}
