use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::auth::tokens::{verify_token, TokenKind};
use crate::errors::AppError;
use crate::state::AppState;
use crate::store::Scope;

/// The caller, resolved from an `Authorization: Bearer <access token>` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub is_staff: bool,
}

impl AuthUser {
    pub fn scope(&self) -> Scope {
        Scope::for_user(self.id, self.is_staff)
    }
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                AppError::Unauthorized("Authentication credentials were not provided".to_string())
            })?;

        let claims = verify_token(&state.config, token, TokenKind::Access).map_err(|e| {
            tracing::debug!("rejected access token: {e}");
            AppError::Unauthorized("Given token not valid for any token type".to_string())
        })?;

        // the account may have been removed since the token was issued
        let user = state
            .store
            .find_user(claims.sub)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

        Ok(AuthUser {
            id: user.id,
            username: user.username,
            is_staff: user.is_staff,
        })
    }
}
