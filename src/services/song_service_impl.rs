//! `SeaORM` implementation of the `SongService` trait.

use async_trait::async_trait;
use chrono::Datelike;
use tracing::info;

use crate::db::{Store, unique_violation};
use crate::models::song::{NewSong, Song, SongChanges, SongStats};
use crate::models::user::CurrentUser;
use crate::services::song_service::{MIN_SEARCH_LEN, SongError, SongService};

enum OwnerFilter {
    All,
    Only(i32),
    UnknownUser,
}

/// Maps a unique-index hit on `(user_id, title, artist)` to `Duplicate`.
fn duplicate_or(err: anyhow::Error, title: String, artist: String) -> SongError {
    if unique_violation(&err).is_some() {
        SongError::Duplicate { title, artist }
    } else {
        SongError::from(err)
    }
}

pub struct SeaOrmSongService {
    store: Store,
}

impl SeaOrmSongService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }

    fn current_year() -> i32 {
        chrono::Utc::now().year()
    }

    async fn resolve_owner(&self, user: Option<&str>) -> Result<OwnerFilter, SongError> {
        let Some(username) = user.map(str::trim).filter(|u| !u.is_empty()) else {
            return Ok(OwnerFilter::All);
        };

        Ok(self
            .store
            .get_user_by_username(username)
            .await?
            .map_or(OwnerFilter::UnknownUser, |u| OwnerFilter::Only(u.id)))
    }

    async fn owned(&self, id: i32, owner: &CurrentUser) -> Result<Song, SongError> {
        self.store
            .get_owned_song(id, owner.id)
            .await?
            .ok_or(SongError::NotFound(id))
    }
}

#[async_trait]
impl SongService for SeaOrmSongService {
    async fn create(&self, owner: &CurrentUser, song: NewSong) -> Result<Song, SongError> {
        let song = song.normalized(Self::current_year())?;

        if self
            .store
            .find_duplicate_song(owner.id, &song.title, &song.artist)
            .await?
            .is_some()
        {
            return Err(SongError::Duplicate {
                title: song.title,
                artist: song.artist,
            });
        }

        let (title, artist) = (song.title.clone(), song.artist.clone());
        let song = self
            .store
            .add_song(owner.id, song)
            .await
            .map_err(|err| duplicate_or(err, title, artist))?;
        info!(user_id = owner.id, song_id = song.id, "Created song: {}", song);
        Ok(song)
    }

    async fn list(&self, user: Option<&str>) -> Result<Vec<Song>, SongError> {
        match self.resolve_owner(user).await? {
            OwnerFilter::All => Ok(self.store.list_songs(None).await?),
            OwnerFilter::Only(owner_id) => Ok(self.store.list_songs(Some(owner_id)).await?),
            OwnerFilter::UnknownUser => Ok(Vec::new()),
        }
    }

    async fn search(&self, query: &str, user: Option<&str>) -> Result<Vec<Song>, SongError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SongError::Validation(
                "Search query cannot be empty".to_string(),
            ));
        }
        if query.chars().count() < MIN_SEARCH_LEN {
            return Err(SongError::Validation(format!(
                "Search query must be at least {MIN_SEARCH_LEN} characters"
            )));
        }

        let needle = query.to_lowercase();
        let songs = self.list(user).await?;

        Ok(songs
            .into_iter()
            .filter(|s| {
                s.title.to_lowercase().contains(&needle)
                    || s.artist.to_lowercase().contains(&needle)
            })
            .collect())
    }

    async fn get(&self, id: i32, owner: &CurrentUser) -> Result<Song, SongError> {
        self.owned(id, owner).await
    }

    async fn update(
        &self,
        id: i32,
        owner: &CurrentUser,
        changes: SongChanges,
    ) -> Result<Song, SongError> {
        let changes = changes.normalized(Self::current_year())?;
        let existing = self.owned(id, owner).await?;

        let title = changes.title.clone().unwrap_or(existing.title);
        let artist = changes.artist.clone().unwrap_or(existing.artist);

        if (changes.title.is_some() || changes.artist.is_some())
            && let Some(other) = self
                .store
                .find_duplicate_song(owner.id, &title, &artist)
                .await?
            && other != id
        {
            return Err(SongError::Duplicate { title, artist });
        }

        let song = self
            .store
            .update_song(id, changes)
            .await
            .map_err(|err| duplicate_or(err, title, artist))?
            .ok_or(SongError::NotFound(id))?;

        info!(user_id = owner.id, song_id = id, "Updated song: {}", song);
        Ok(song)
    }

    async fn delete(&self, id: i32, owner: &CurrentUser) -> Result<Song, SongError> {
        let song = self.owned(id, owner).await?;

        if !self.store.remove_song(id).await? {
            return Err(SongError::NotFound(id));
        }
        Ok(song)
    }

    async fn play(&self, id: i32, owner: &CurrentUser) -> Result<Song, SongError> {
        self.owned(id, owner).await?;

        self.store
            .record_song_play(id)
            .await?
            .ok_or(SongError::NotFound(id))
    }

    async fn stats(&self, username: &str) -> Result<SongStats, SongError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or_else(|| SongError::UserNotFound(username.to_string()))?;

        let songs = self.store.list_songs(Some(user.id)).await?;
        Ok(SongStats::from_songs(&user.username, &songs))
    }
}
