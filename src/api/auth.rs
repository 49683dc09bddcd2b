use axum::{
    Extension, Json,
    extract::{Request, State, rejection::JsonRejection},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{AppendHeaders, IntoResponse, Response},
};
use cookie::Cookie;
use serde::Deserialize;
use std::sync::Arc;

use super::{ApiError, ApiForm, ApiJson, ApiResponse, AppState, MessageResponse, UserDto};
use crate::auth::{ACCESS_COOKIE, REFRESH_COOKIE, TokenPair, cleared_cookies, read_cookie, token_cookies};
use crate::models::user::{CurrentUser, NewUser};
use crate::services::AuthError;

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials
            | AuthError::InactiveUser
            | AuthError::InvalidToken
            | AuthError::TokenExpired
            | AuthError::TokenRevoked => Self::Unauthorized(err.to_string()),
            AuthError::UsernameTaken | AuthError::EmailTaken => Self::Conflict(err.to_string()),
            AuthError::Validation(msg) => Self::validation(msg),
            AuthError::Database(msg) => Self::DatabaseError(msg),
            AuthError::Internal(msg) => Self::internal(msg),
        }
    }
}

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct LoginRequest {
    /// Username or email
    #[serde(alias = "email")]
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

// ============================================================================
// Middleware
// ============================================================================

/// Resolves the caller from `Authorization: Bearer <token>` or, failing
/// that, the `access_token` cookie, and stores a [`CurrentUser`] in the
/// request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_access_token(request.headers())?
        .ok_or_else(|| ApiError::unauthorized("Not authenticated"))?;

    let user = state.auth_service().authenticate(&token).await?;

    tracing::Span::current().record("user_id", user.id);
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Header first, then cookie. A present but malformed header is an error
/// rather than a fallthrough to the cookie.
fn extract_access_token(headers: &HeaderMap) -> Result<Option<String>, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let token = auth_header
            .to_str()
            .ok()
            .and_then(|value| {
                value
                    .strip_prefix("Bearer ")
                    .or_else(|| value.strip_prefix("bearer "))
            })
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::unauthorized("Invalid authorization header format"))?;

        return Ok(Some(token.to_string()));
    }

    Ok(read_cookie(headers, ACCESS_COOKIE))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /auth/register
pub async fn register(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<ApiResponse<UserDto>>), ApiError> {
    let user = state.auth_service().register(payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(UserDto::from(user))),
    ))
}

/// POST /auth/login
/// Returns the token pair in the body and as HTTP-only cookies
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Result<Response, ApiError> {
    let pair = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    Ok(token_response(&state, pair))
}

/// POST /auth/login-form
/// Same as `/auth/login` for `application/x-www-form-urlencoded` clients
pub async fn login_form(
    State(state): State<Arc<AppState>>,
    ApiForm(payload): ApiForm<LoginRequest>,
) -> Result<Response, ApiError> {
    let pair = state
        .auth_service()
        .login(&payload.username, &payload.password)
        .await?;

    Ok(token_response(&state, pair))
}

/// POST /auth/refresh
/// Token comes from the JSON body or the `refresh_token` cookie
pub async fn refresh(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Option<Json<RefreshRequest>>, JsonRejection>,
) -> Result<Response, ApiError> {
    let refresh_token = payload?
        .and_then(|Json(body)| body.refresh_token)
        .filter(|token| !token.trim().is_empty())
        .or_else(|| read_cookie(&headers, REFRESH_COOKIE))
        .ok_or_else(|| ApiError::validation("Refresh token not provided"))?;

    let pair = state.auth_service().refresh(refresh_token.trim()).await?;

    Ok(token_response(&state, pair))
}

/// POST /auth/logout
/// Revokes outstanding tokens when the caller is authenticated; always
/// clears the cookies
pub async fn logout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    if let Ok(Some(token)) = extract_access_token(&headers)
        && let Ok(user) = state.auth_service().authenticate(&token).await
    {
        state.auth_service().logout(&user).await?;
    }

    let secure = state.config().server.secure_cookies;
    Ok((
        set_cookies(cleared_cookies(secure)),
        Json(ApiResponse::success(MessageResponse::new(
            "Successfully logged out",
        ))),
    )
        .into_response())
}

/// GET /auth/me
pub async fn get_current_user(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> Result<Json<ApiResponse<UserDto>>, ApiError> {
    let user = state.user_service().get(&current.username).await?;

    Ok(Json(ApiResponse::success(UserDto::from(user))))
}

// ============================================================================
// Helpers
// ============================================================================

fn set_cookies(cookies: [Cookie<'static>; 2]) -> AppendHeaders<[(header::HeaderName, String); 2]> {
    let [first, second] = cookies;
    AppendHeaders([
        (header::SET_COOKIE, first.to_string()),
        (header::SET_COOKIE, second.to_string()),
    ])
}

fn token_response(state: &AppState, pair: TokenPair) -> Response {
    let cookies = token_cookies(
        &pair,
        state.auth_service().refresh_ttl_secs(),
        state.config().server.secure_cookies,
    );

    (set_cookies(cookies), Json(ApiResponse::success(pair))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_prefers_header_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header-token"),
        );
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=cookie-token"),
        );

        assert_eq!(
            extract_access_token(&headers).unwrap().as_deref(),
            Some("header-token")
        );
    }

    #[test]
    fn test_extract_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("access_token=cookie-token"),
        );

        assert_eq!(
            extract_access_token(&headers).unwrap().as_deref(),
            Some("cookie-token")
        );
        assert_eq!(extract_access_token(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn test_extract_rejects_malformed_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        assert!(extract_access_token(&headers).is_err());

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer   "));
        assert!(extract_access_token(&headers).is_err());
    }
}
