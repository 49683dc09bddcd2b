use axum::http::{HeaderMap, header};
use cookie::{Cookie, SameSite, time::Duration};

use super::TokenPair;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

fn build(name: &'static str, value: String, max_age_secs: i64, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age_secs))
        .build()
}

/// Access and refresh cookies mirroring the JSON token pair.
#[must_use]
pub fn token_cookies(pair: &TokenPair, refresh_ttl_secs: i64, secure: bool) -> [Cookie<'static>; 2] {
    [
        build(
            ACCESS_COOKIE,
            pair.access_token.clone(),
            pair.expires_in,
            secure,
        ),
        build(
            REFRESH_COOKIE,
            pair.refresh_token.clone(),
            refresh_ttl_secs,
            secure,
        ),
    ]
}

/// Expired, empty cookies that make the browser drop both tokens.
#[must_use]
pub fn cleared_cookies(secure: bool) -> [Cookie<'static>; 2] {
    [
        build(ACCESS_COOKIE, String::new(), 0, secure),
        build(REFRESH_COOKIE, String::new(), 0, secure),
    ]
}

/// Reads a cookie value from the request's `Cookie` headers.
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name && !cookie.value().is_empty())
        .map(|cookie| cookie.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_cookie_attributes() {
        let pair = TokenPair {
            access_token: "aaa".to_string(),
            refresh_token: "rrr".to_string(),
            token_type: "bearer",
            expires_in: 1800,
        };
        let [access, refresh] = token_cookies(&pair, 604_800, true);

        let rendered = access.to_string();
        assert!(rendered.starts_with("access_token=aaa"));
        assert!(rendered.contains("HttpOnly"));
        assert!(rendered.contains("SameSite=Lax"));
        assert!(rendered.contains("Secure"));
        assert!(rendered.contains("Path=/"));
        assert!(rendered.contains("Max-Age=1800"));

        assert_eq!(refresh.value(), "rrr");
        assert_eq!(refresh.max_age(), Some(Duration::seconds(604_800)));
    }

    #[test]
    fn test_cleared_cookies_expire_immediately() {
        for cookie in cleared_cookies(false) {
            assert_eq!(cookie.value(), "");
            assert_eq!(cookie.max_age(), Some(Duration::ZERO));
            assert!(!cookie.to_string().contains("Secure"));
        }
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; access_token=abc.def.ghi; refresh_token="),
        );

        assert_eq!(
            read_cookie(&headers, ACCESS_COOKIE).as_deref(),
            Some("abc.def.ghi")
        );
        assert_eq!(read_cookie(&headers, REFRESH_COOKIE), None);
        assert_eq!(read_cookie(&HeaderMap::new(), ACCESS_COOKIE), None);
    }
}
