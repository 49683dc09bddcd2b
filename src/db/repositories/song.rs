use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    sea_query::Expr,
};
use tracing::info;

use crate::entities::{prelude::*, songs, users};
use crate::models::song::{NewSong, Song, SongChanges};

pub struct SongRepository {
    conn: DatabaseConnection,
}

impl SongRepository {
    #[must_use]
    pub const fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model_to_song(song: songs::Model, owner: Option<users::Model>) -> Song {
        Song {
            id: song.id,
            owner_id: song.user_id,
            owner: owner.map(|u| u.username).unwrap_or_default(),
            title: song.title,
            artist: song.artist,
            genre: song.genre,
            year: song.year,
            play_count: song.play_count,
            last_played_at: song.last_played_at,
            created_at: song.created_at,
            updated_at: song.updated_at,
        }
    }

    pub async fn add(&self, owner_id: i32, song: NewSong) -> Result<Song> {
        let active = songs::ActiveModel {
            user_id: Set(owner_id),
            title: Set(song.title),
            artist: Set(song.artist),
            genre: Set(song.genre),
            year: Set(song.year),
            play_count: Set(0),
            last_played_at: Set(None),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            updated_at: Set(None),
            ..Default::default()
        };

        let model = active
            .insert(&self.conn)
            .await
            .context("Failed to insert song")?;

        info!("Added song {} for user {}", model.id, owner_id);

        self.get(model.id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Song {} vanished after insert", model.id))
    }

    pub async fn get(&self, id: i32) -> Result<Option<Song>> {
        let result = Songs::find_by_id(id)
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query song")?;

        Ok(result.map(|(song, owner)| Self::map_model_to_song(song, owner)))
    }

    /// Returns the song only if `owner_id` owns it.
    pub async fn get_owned(&self, id: i32, owner_id: i32) -> Result<Option<Song>> {
        let result = Songs::find_by_id(id)
            .filter(songs::Column::UserId.eq(owner_id))
            .find_also_related(Users)
            .one(&self.conn)
            .await
            .context("Failed to query owned song")?;

        Ok(result.map(|(song, owner)| Self::map_model_to_song(song, owner)))
    }

    /// Lists songs newest first, optionally restricted to one owner.
    pub async fn list(&self, owner_id: Option<i32>) -> Result<Vec<Song>> {
        let mut query = Songs::find();
        if let Some(owner_id) = owner_id {
            query = query.filter(songs::Column::UserId.eq(owner_id));
        }

        let rows = query
            .order_by_desc(songs::Column::CreatedAt)
            .order_by_desc(songs::Column::Id)
            .find_also_related(Users)
            .all(&self.conn)
            .await
            .context("Failed to list songs")?;

        Ok(rows
            .into_iter()
            .map(|(song, owner)| Self::map_model_to_song(song, owner))
            .collect())
    }

    /// Finds a song with exactly this title and artist for the owner.
    pub async fn find_duplicate(
        &self,
        owner_id: i32,
        title: &str,
        artist: &str,
    ) -> Result<Option<i32>> {
        let existing = Songs::find()
            .filter(songs::Column::UserId.eq(owner_id))
            .filter(songs::Column::Title.eq(title))
            .filter(songs::Column::Artist.eq(artist))
            .one(&self.conn)
            .await
            .context("Failed to query duplicate song")?;

        Ok(existing.map(|s| s.id))
    }

    pub async fn update(&self, id: i32, changes: SongChanges) -> Result<Option<Song>> {
        let Some(model) = Songs::find_by_id(id).one(&self.conn).await? else {
            return Ok(None);
        };

        let mut active: songs::ActiveModel = model.into();
        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(artist) = changes.artist {
            active.artist = Set(artist);
        }
        if let Some(genre) = changes.genre {
            active.genre = Set(genre);
        }
        if let Some(year) = changes.year {
            active.year = Set(Some(year));
        }
        active.updated_at = Set(Some(chrono::Utc::now().to_rfc3339()));

        active
            .update(&self.conn)
            .await
            .context("Failed to update song")?;

        self.get(id).await
    }

    pub async fn remove(&self, id: i32) -> Result<bool> {
        let result = Songs::delete_by_id(id)
            .exec(&self.conn)
            .await
            .context("Failed to delete song")?;

        let removed = result.rows_affected > 0;
        if removed {
            info!("Removed song with ID: {}", id);
        }
        Ok(removed)
    }

    /// Increments the play counter in place and stamps the play time.
    pub async fn record_play(&self, id: i32) -> Result<Option<Song>> {
        let result = Songs::update_many()
            .col_expr(
                songs::Column::PlayCount,
                Expr::col(songs::Column::PlayCount).add(1),
            )
            .col_expr(
                songs::Column::LastPlayedAt,
                Expr::value(chrono::Utc::now().to_rfc3339()),
            )
            .filter(songs::Column::Id.eq(id))
            .exec(&self.conn)
            .await
            .context("Failed to record play")?;

        if result.rows_affected == 0 {
            return Ok(None);
        }
        self.get(id).await
    }
}
