use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::classification::service::classify_resume;
use crate::errors::AppError;
use crate::models::classification::{ClassificationStats, ClassificationView, ConfidenceScore};
use crate::pagination::{Page, PageParams};
use crate::resumes::handlers::owned_resume;
use crate::state::AppState;
use crate::store::NewClassification;

#[derive(Deserialize)]
pub struct CreateClassificationRequest {
    pub resume: Uuid,
    pub category: Uuid,
    pub confidence_score: f64,
}

#[derive(Serialize)]
pub struct ClassifierCategories {
    pub loaded: bool,
    pub categories: Vec<String>,
}

/// POST /api/resumes/:id/classify/
pub async fn handle_classify_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<ClassificationView>), AppError> {
    let resume = owned_resume(&state, &user, id).await?;
    let view = classify_resume(state.store.as_ref(), &state.classifier, &resume).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/classifications/
pub async fn handle_list_classifications(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ClassificationView>>, AppError> {
    let page_size = state.config.page_size;
    let paged = state
        .store
        .list_classifications(user.scope(), params.request(page_size)?)
        .await?;
    Ok(Json(params.into_page(paged, page_size)?))
}

/// POST /api/classifications/
pub async fn handle_create_classification(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateClassificationRequest>,
) -> Result<(StatusCode, Json<ClassificationView>), AppError> {
    let confidence = ConfidenceScore::new(req.confidence_score)?;
    let resume = state
        .store
        .get_resume(req.resume, user.id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("resume: object {} does not exist", req.resume)))?;
    state
        .store
        .get_category(req.category)
        .await?
        .ok_or_else(|| {
            AppError::Validation(format!("category: object {} does not exist", req.category))
        })?;
    let view = state
        .store
        .create_classification(NewClassification {
            resume_id: resume.id,
            category_id: req.category,
            confidence,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/classifications/:id/
pub async fn handle_get_classification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ClassificationView>, AppError> {
    let view = state
        .store
        .get_classification(id, user.scope())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Classification {id} not found")))?;
    Ok(Json(view))
}

/// DELETE /api/classifications/:id/
pub async fn handle_delete_classification(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if !state.store.delete_classification(id, user.scope()).await? {
        return Err(AppError::NotFound(format!("Classification {id} not found")));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/classifications/stats/
pub async fn handle_classification_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<ClassificationStats>, AppError> {
    Ok(Json(state.store.classification_stats(user.scope()).await?))
}

/// GET /api/classifier/categories/
pub async fn handle_classifier_categories(
    State(state): State<AppState>,
    _user: AuthUser,
) -> Json<ClassifierCategories> {
    Json(ClassifierCategories {
        loaded: state.classifier.is_loaded(),
        categories: state.classifier.list_categories(),
    })
}
