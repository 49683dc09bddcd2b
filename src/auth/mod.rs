//! Token issuance and cookie delivery.
//!
//! Tokens are stateless HMAC-signed JWTs. Revocation works by comparing the
//! `ver` claim with the user's stored `refresh_token_version`, which the
//! auth service bumps on every refresh rotation and on logout.

pub mod cookies;
pub mod jwt;

pub use cookies::{ACCESS_COOKIE, REFRESH_COOKIE, cleared_cookies, read_cookie, token_cookies};
pub use jwt::{Claims, TokenError, TokenIssuer, TokenKind, TokenPair};
