use axum::{
    Extension, Json,
    extract::{Path, State},
};
use std::sync::Arc;

use super::{ApiError, ApiJson, ApiResponse, AppState, MessageResponse, UserDto};
use crate::models::song::SongStats;
use crate::models::user::{CurrentUser, ProfileChanges};
use crate::services::UserError;

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::NotFound(err.to_string()),
            UserError::Forbidden(msg) => Self::Forbidden(msg),
            UserError::EmailTaken => Self::Conflict(err.to_string()),
            UserError::Validation(msg) => Self::validation(msg),
            UserError::Database(msg) => Self::DatabaseError(msg),
            UserError::Internal(msg) => Self::internal(msg),
        }
    }
}

/// GET /users
pub async fn list_users(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<UserDto>>>, ApiError> {
    let users = state
        .user_service()
        .list()
        .await?
        .into_iter()
        .map(UserDto::from)
        .collect();

    Ok(Json(ApiResponse::success(users)))
}

/// GET /users/{username}
pub async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service().get(&username).await?;
    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// PUT /users/{username}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
    ApiJson(payload): ApiJson<ProfileChanges>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state
        .user_service()
        .update_profile(&current, &username, payload)
        .await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

/// DELETE /users/{username}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.user_service().delete(&current, &username).await?;

    Ok(Json(ApiResponse::success(MessageResponse::new(format!(
        "User '{username}' deleted successfully"
    )))))
}

/// GET /users/{username}/stats
pub async fn get_user_stats(
    State(state): State<Arc<AppState>>,
    Path(username): Path<String>,
) -> Result<Json<ApiResponse<SongStats>>, ApiError> {
    let stats = state.song_service().stats(&username).await?;
    Ok(Json(ApiResponse::success(stats)))
}
