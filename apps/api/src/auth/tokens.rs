use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;
use crate::models::user::UserRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub kind: TokenKind,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Token has wrong type: expected {expected:?}")]
    WrongKind { expected: TokenKind },
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub fn issue_token(config: &Config, user: &UserRow, kind: TokenKind) -> Result<String, TokenError> {
    let now = Utc::now();
    let ttl = match kind {
        TokenKind::Access => Duration::minutes(config.access_token_ttl_minutes),
        TokenKind::Refresh => Duration::hours(config.refresh_token_ttl_hours),
    };
    let claims = Claims {
        sub: user.id,
        username: user.username.clone(),
        kind,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )?)
}

pub fn issue_pair(config: &Config, user: &UserRow) -> Result<TokenPair, TokenError> {
    Ok(TokenPair {
        access: issue_token(config, user, TokenKind::Access)?,
        refresh: issue_token(config, user, TokenKind::Refresh)?,
    })
}

/// Decodes and validates `token`, requiring it to be of kind `expected`.
pub fn verify_token(config: &Config, token: &str, expected: TokenKind) -> Result<Claims, TokenError> {
    let claims = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?
    .claims;
    if claims.kind != expected {
        return Err(TokenError::WrongKind { expected });
    }
    Ok(claims)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn user() -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            password_hash: String::new(),
            is_staff: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let config = Config::for_tests(PathBuf::from("media"));
        let user = user();
        let token = issue_token(&config, &user, TokenKind::Access).unwrap();
        let claims = verify_token(&config, &token, TokenKind::Access).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_kinds_are_not_interchangeable() {
        let config = Config::for_tests(PathBuf::from("media"));
        let pair = issue_pair(&config, &user()).unwrap();
        assert!(matches!(
            verify_token(&config, &pair.refresh, TokenKind::Access),
            Err(TokenError::WrongKind { .. })
        ));
        assert!(matches!(
            verify_token(&config, &pair.access, TokenKind::Refresh),
            Err(TokenError::WrongKind { .. })
        ));
    }

    #[test]
    fn test_foreign_secret_rejected() {
        let config = Config::for_tests(PathBuf::from("media"));
        let token = issue_token(&config, &user(), TokenKind::Access).unwrap();
        let mut other = config.clone();
        other.jwt_secret = "another-secret".to_string();
        assert!(matches!(
            verify_token(&other, &token, TokenKind::Access),
            Err(TokenError::Invalid(_))
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let mut config = Config::for_tests(PathBuf::from("media"));
        config.access_token_ttl_minutes = -10;
        let token = issue_token(&config, &user(), TokenKind::Access).unwrap();
        assert!(verify_token(&config, &token, TokenKind::Access).is_err());
    }
}
