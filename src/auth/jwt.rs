use chrono::Utc;
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::config::AuthConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Username
    pub sub: String,
    pub uid: i32,
    pub typ: TokenKind,
    /// Refresh-token version the token was minted against.
    pub ver: i64,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token has expired")]
    Expired,

    #[error("Invalid token")]
    Invalid,

    #[error("Expected an {expected} token")]
    WrongKind { expected: TokenKind },

    #[error("Failed to encode token: {0}")]
    Encode(String),
}

/// Token pair handed to clients after login or refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct TokenIssuer {
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: chrono::Duration,
    refresh_ttl: chrono::Duration,
}

impl fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("refresh_ttl", &self.refresh_ttl)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        let algorithm = config.jwt_algorithm()?;
        let secret = config.secret_key.as_bytes();

        Ok(Self {
            algorithm,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            access_ttl: chrono::Duration::minutes(config.access_token_expire_minutes),
            refresh_ttl: chrono::Duration::days(config.refresh_token_expire_days),
        })
    }

    #[must_use]
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl.num_seconds()
    }

    #[must_use]
    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl.num_seconds()
    }

    pub fn issue(
        &self,
        user_id: i32,
        username: &str,
        kind: TokenKind,
        version: i64,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };

        let claims = Claims {
            sub: username.to_string(),
            uid: user_id,
            typ: kind,
            ver: version,
            jti: Uuid::new_v4().to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };

        self.encode_claims(&claims)
    }

    pub fn issue_pair(
        &self,
        user_id: i32,
        username: &str,
        version: i64,
    ) -> Result<TokenPair, TokenError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, username, TokenKind::Access, version)?,
            refresh_token: self.issue(user_id, username, TokenKind::Refresh, version)?,
            token_type: "bearer",
            expires_in: self.access_ttl_secs(),
        })
    }

    /// Verifies signature and expiry, then checks the token type.
    pub fn verify(&self, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.set_required_spec_claims(&["exp", "sub"]);

        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.typ != expected {
            return Err(TokenError::WrongKind { expected });
        }

        Ok(data.claims)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(self.algorithm), claims, &self.encoding)
            .map_err(|e| TokenError::Encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::from_config(&AuthConfig::default()).unwrap()
    }

    #[test]
    fn test_issue_pair_carries_version() {
        let issuer = issuer();
        let pair = issuer.issue_pair(7, "alice", 3).unwrap();

        assert_eq!(pair.token_type, "bearer");
        assert_eq!(pair.expires_in, 30 * 60);

        let access = issuer.verify(&pair.access_token, TokenKind::Access).unwrap();
        assert_eq!(access.sub, "alice");
        assert_eq!(access.uid, 7);
        assert_eq!(access.ver, 3);

        let refresh = issuer
            .verify(&pair.refresh_token, TokenKind::Refresh)
            .unwrap();
        assert_eq!(refresh.ver, 3);
        assert_ne!(access.jti, refresh.jti);
        assert!(refresh.exp > access.exp);
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let issuer = issuer();
        let pair = issuer.issue_pair(1, "alice", 0).unwrap();

        assert_eq!(
            issuer.verify(&pair.refresh_token, TokenKind::Access).unwrap_err(),
            TokenError::WrongKind {
                expected: TokenKind::Access
            }
        );
        assert!(issuer.verify(&pair.access_token, TokenKind::Refresh).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let issuer = issuer();
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: "alice".to_string(),
            uid: 1,
            typ: TokenKind::Access,
            ver: 0,
            jti: Uuid::new_v4().to_string(),
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = issuer.encode_claims(&claims).unwrap();

        assert_eq!(
            issuer.verify(&token, TokenKind::Access).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_foreign_signature_is_rejected() {
        let other = TokenIssuer::from_config(&AuthConfig {
            secret_key: "another-secret-that-is-long-enough-to-use".to_string(),
            ..AuthConfig::default()
        })
        .unwrap();
        let token = other.issue(1, "alice", TokenKind::Access, 0).unwrap();

        assert_eq!(
            issuer().verify(&token, TokenKind::Access).unwrap_err(),
            TokenError::Invalid
        );
        assert_eq!(
            issuer().verify("not-a-jwt", TokenKind::Access).unwrap_err(),
            TokenError::Invalid
        );
    }
}
