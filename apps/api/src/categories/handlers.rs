use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::category::{CategoryView, MAX_CATEGORY_NAME_CHARS};
use crate::models::classification::ClassificationView;
use crate::pagination::{Page, PageParams};
use crate::state::AppState;
use crate::store::{CategoryPatch, NewCategory};

#[derive(Deserialize, Default)]
pub struct CategoryPayload {
    pub name: Option<String>,
    pub keywords: Option<String>,
}

fn checked_name(name: String) -> Result<String, AppError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name: this field may not be blank".to_string()));
    }
    if name.chars().count() > MAX_CATEGORY_NAME_CHARS {
        return Err(AppError::Validation(format!(
            "name: ensure this field has no more than {MAX_CATEGORY_NAME_CHARS} characters"
        )));
    }
    Ok(name)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Category {id} not found"))
}

/// GET /api/categories/
pub async fn handle_list_categories(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<CategoryView>>, AppError> {
    let page_size = state.config.page_size;
    let paged = state
        .store
        .list_categories(params.request(page_size)?)
        .await?;
    Ok(Json(params.into_page(paged, page_size)?))
}

/// POST /api/categories/
pub async fn handle_create_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<CategoryPayload>,
) -> Result<(StatusCode, Json<CategoryView>), AppError> {
    let name = req
        .name
        .ok_or_else(|| AppError::Validation("name: this field is required".to_string()))?;
    let view = state
        .store
        .create_category(NewCategory {
            name: checked_name(name)?,
            keywords: req.keywords.unwrap_or_default(),
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/categories/:id/
pub async fn handle_get_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<CategoryView>, AppError> {
    let view = state.store.get_category(id).await?.ok_or_else(|| not_found(id))?;
    Ok(Json(view))
}

/// PUT /api/categories/:id/
pub async fn handle_replace_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryPayload>,
) -> Result<Json<CategoryView>, AppError> {
    let name = req
        .name
        .ok_or_else(|| AppError::Validation("name: this field is required".to_string()))?;
    let patch = CategoryPatch {
        name: Some(checked_name(name)?),
        keywords: Some(req.keywords.unwrap_or_default()),
    };
    let view = state
        .store
        .update_category(id, patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(view))
}

/// PATCH /api/categories/:id/
pub async fn handle_update_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CategoryPayload>,
) -> Result<Json<CategoryView>, AppError> {
    let patch = CategoryPatch {
        name: req.name.map(checked_name).transpose()?,
        keywords: req.keywords,
    };
    let view = state
        .store
        .update_category(id, patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(view))
}

/// DELETE /api/categories/:id/
pub async fn handle_delete_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_category(id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/categories/:id/resumes/
pub async fn handle_category_resumes(
    State(state): State<AppState>,
    _user: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ClassificationView>>, AppError> {
    state.store.get_category(id).await?.ok_or_else(|| not_found(id))?;
    let page_size = state.config.page_size;
    let paged = state
        .store
        .category_classifications(id, params.request(page_size)?)
        .await?;
    Ok(Json(params.into_page(paged, page_size)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_name() {
        assert_eq!(checked_name("  Data Science ".to_string()).unwrap(), "Data Science");
        assert!(checked_name("   ".to_string()).is_err());
        assert!(checked_name("x".repeat(101)).is_err());
        assert!(checked_name("x".repeat(100)).is_ok());
    }
}
