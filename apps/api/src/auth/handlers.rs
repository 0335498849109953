use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::create_account;
use crate::auth::password::verify_password;
use crate::auth::tokens::{issue_pair, issue_token, verify_token, TokenKind, TokenPair};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Serialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub username: String,
}

#[derive(Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Serialize)]
pub struct AccessToken {
    pub access: String,
}

/// POST /api/register/
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<(StatusCode, Json<RegisteredUser>), AppError> {
    let user = create_account(state.store.as_ref(), &req.username, &req.password, false).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisteredUser {
            id: user.id,
            username: user.username,
        }),
    ))
}

/// POST /api/token/
pub async fn handle_obtain_token(
    State(state): State<AppState>,
    Json(req): Json<Credentials>,
) -> Result<Json<TokenPair>, AppError> {
    let rejected =
        || AppError::Unauthorized("No active account found with the given credentials".to_string());
    let user = state
        .store
        .find_user_by_username(&req.username)
        .await?
        .ok_or_else(rejected)?;
    if !verify_password(&req.password, &user.password_hash) {
        return Err(rejected());
    }
    let pair = issue_pair(&state.config, &user).map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(pair))
}

/// POST /api/token/refresh/
pub async fn handle_refresh_token(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<AccessToken>, AppError> {
    let claims = verify_token(&state.config, &req.refresh, TokenKind::Refresh)
        .map_err(|e| AppError::Unauthorized(e.to_string()))?;
    let user = state
        .store
        .find_user(claims.sub)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    let access =
        issue_token(&state.config, &user, TokenKind::Access).map_err(|e| AppError::Internal(e.into()))?;
    Ok(Json(AccessToken { access }))
}
