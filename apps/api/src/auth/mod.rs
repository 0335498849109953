pub mod extractor;
pub mod handlers;
pub mod password;
pub mod tokens;

pub use extractor::AuthUser;

use crate::errors::AppError;
use crate::models::user::UserRow;
use crate::store::{NewUser, Store};

pub const MIN_PASSWORD_LEN: usize = 8;

/// Validates credentials and stores a new account.
pub async fn create_account(
    store: &dyn Store,
    username: &str,
    password: &str,
    is_staff: bool,
) -> Result<UserRow, AppError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AppError::Validation("username: this field may not be blank".to_string()));
    }
    if username.chars().count() > 150 {
        return Err(AppError::Validation(
            "username: ensure this field has no more than 150 characters".to_string(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password: must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    let user = store
        .create_user(NewUser {
            username: username.to_string(),
            password_hash: password::hash_password(password),
            is_staff,
        })
        .await?;
    tracing::info!("Created user {} (staff: {})", user.username, user.is_staff);
    Ok(user)
}
