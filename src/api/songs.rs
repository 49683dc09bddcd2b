use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use std::sync::Arc;

use super::validation::validate_song_id;
use super::{
    ApiError, ApiJson, ApiQuery, ApiResponse, AppState, MessageResponse, PlayResponse, SearchQuery, SearchResponse,
    SongDto, SongListResponse, UserFilterQuery,
};
use crate::models::song::{NewSong, SongChanges};
use crate::models::user::CurrentUser;
use crate::services::SongError;

impl From<SongError> for ApiError {
    fn from(err: SongError) -> Self {
        match err {
            SongError::NotFound(_) | SongError::UserNotFound(_) => Self::NotFound(err.to_string()),
            SongError::Duplicate { .. } => Self::Conflict(err.to_string()),
            SongError::Validation(msg) => Self::validation(msg),
            SongError::Database(msg) => Self::DatabaseError(msg),
            SongError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// POST /songs
pub async fn create_song(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    ApiJson(payload): ApiJson<NewSong>,
) -> Result<(StatusCode, Json<ApiResponse<SongDto>>), ApiError> {
    let song = state.song_service().create(&user, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(SongDto::from(song))),
    ))
}

/// GET /songs?user=
pub async fn list_songs(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<UserFilterQuery>,
) -> Result<Json<ApiResponse<SongListResponse>>, ApiError> {
    let songs: Vec<SongDto> = state
        .song_service()
        .list(query.user.as_deref())
        .await?
        .into_iter()
        .map(SongDto::from)
        .collect();

    Ok(Json(ApiResponse::success(SongListResponse {
        count: songs.len(),
        songs,
    })))
}

/// GET /songs/search?query=&user=
pub async fn search_songs(
    State(state): State<Arc<AppState>>,
    ApiQuery(query): ApiQuery<SearchQuery>,
) -> Result<Json<ApiResponse<SearchResponse>>, ApiError> {
    let results: Vec<SongDto> = state
        .song_service()
        .search(&query.query, query.user.as_deref())
        .await?
        .into_iter()
        .map(SongDto::from)
        .collect();

    Ok(Json(ApiResponse::success(SearchResponse {
        message: format!(
            "Found {} song(s) matching '{}'",
            results.len(),
            query.query.trim()
        ),
        count: results.len(),
        results,
    })))
}

/// GET /songs/{id}
pub async fn get_song(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<SongDto>>, ApiError> {
    let id = validate_song_id(&id)?;
    let song = state.song_service().get(id, &user).await?;

    Ok(Json(ApiResponse::success(SongDto::from(song))))
}

/// PUT /songs/{id}
pub async fn update_song(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    ApiJson(payload): ApiJson<SongChanges>,
) -> Result<Json<ApiResponse<SongDto>>, ApiError> {
    let id = validate_song_id(&id)?;
    let song = state.song_service().update(id, &user, payload).await?;

    Ok(Json(ApiResponse::success(SongDto::from(song))))
}

/// DELETE /songs/{id}
pub async fn delete_song(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    let id = validate_song_id(&id)?;
    let song = state.song_service().delete(id, &user).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "Song '{}' by '{}' deleted successfully",
        song.title, song.artist
    )))))
}

/// POST /songs/{id}/play
pub async fn play_song(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<PlayResponse>>, ApiError> {
    let id = validate_song_id(&id)?;
    let song = state.song_service().play(id, &user).await?;

    Ok(Json(ApiResponse::success(PlayResponse {
        message: format!("Now playing: '{}' by '{}'", song.title, song.artist),
        song: SongDto::from(song),
    })))
}
