use serde::{Deserialize, Serialize};

use crate::models::song::Song;
use crate::models::user::User;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            detail: None,
            error: None,
        }
    }

    pub fn error(code: &'static str, detail: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            detail: Some(detail.into()),
            error: Some(code),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of a user; never includes the password hash or token version.
#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub full_name: String,
    pub is_active: bool,
    pub last_login: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<User> for UserDto {
    fn from(user: User) -> Self {
        Self {
            full_name: user.full_name(),
            id: user.id,
            username: user.username,
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            is_active: user.is_active,
            last_login: user.last_login,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SongDto {
    pub id: i32,
    pub title: String,
    pub artist: String,
    /// Owner username
    pub user: String,
    pub genre: Option<String>,
    pub year: Option<i32>,
    pub play_count: i32,
    pub last_played_at: Option<String>,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<Song> for SongDto {
    fn from(song: Song) -> Self {
        Self {
            id: song.id,
            title: song.title,
            artist: song.artist,
            user: song.owner,
            genre: song.genre,
            year: song.year,
            play_count: song.play_count,
            last_played_at: song.last_played_at,
            created_at: song.created_at,
            updated_at: song.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub songs: Vec<SongDto>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SongDto>,
    pub count: usize,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct PlayResponse {
    pub message: String,
    pub song: SongDto,
}

#[derive(Debug, Deserialize)]
pub struct UserFilterQuery {
    pub user: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default, alias = "q")]
    pub query: String,
    pub user: Option<String>,
}
