use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::job_posting::JobPostingView;
use crate::pagination::{Page, PageParams};
use crate::state::AppState;
use crate::store::{JobPostingPatch, NewJobPosting};

const MAX_TITLE_CHARS: usize = 200;

#[derive(Deserialize, Default)]
pub struct JobPostingPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<Uuid>,
    pub is_active: Option<bool>,
}

impl JobPostingPayload {
    fn into_new(self) -> Result<NewJobPosting, AppError> {
        let required = |field: &str| AppError::Validation(format!("{field}: this field is required"));
        Ok(NewJobPosting {
            title: checked_title(self.title.ok_or_else(|| required("title"))?)?,
            description: self.description.ok_or_else(|| required("description"))?,
            category_id: self.category.ok_or_else(|| required("category"))?,
            is_active: self.is_active.unwrap_or(true),
        })
    }

    fn into_patch(self) -> Result<JobPostingPatch, AppError> {
        Ok(JobPostingPatch {
            title: self.title.map(checked_title).transpose()?,
            description: self.description,
            category_id: self.category,
            is_active: self.is_active,
        })
    }
}

fn checked_title(title: String) -> Result<String, AppError> {
    let title = title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation("title: this field may not be blank".to_string()));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        return Err(AppError::Validation(format!(
            "title: ensure this field has no more than {MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title)
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Job posting {id} not found"))
}

/// Non-staff users cannot see, and so cannot touch, inactive postings.
async fn visible_posting(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<JobPostingView, AppError> {
    state
        .store
        .get_job_posting(id, user.is_staff)
        .await?
        .ok_or_else(|| not_found(id))
}

/// GET /api/jobpostings/
pub async fn handle_list_job_postings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<JobPostingView>>, AppError> {
    let page_size = state.config.page_size;
    let paged = state
        .store
        .list_job_postings(user.is_staff, params.request(page_size)?)
        .await?;
    Ok(Json(params.into_page(paged, page_size)?))
}

/// POST /api/jobpostings/
pub async fn handle_create_job_posting(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(req): Json<JobPostingPayload>,
) -> Result<(StatusCode, Json<JobPostingView>), AppError> {
    let view = state.store.create_job_posting(req.into_new()?).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /api/jobpostings/:id/
pub async fn handle_get_job_posting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<JobPostingView>, AppError> {
    Ok(Json(visible_posting(&state, &user, id).await?))
}

/// PUT /api/jobpostings/:id/
pub async fn handle_replace_job_posting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<JobPostingPayload>,
) -> Result<Json<JobPostingView>, AppError> {
    visible_posting(&state, &user, id).await?;
    let new = req.into_new()?;
    let patch = JobPostingPatch {
        title: Some(new.title),
        description: Some(new.description),
        category_id: Some(new.category_id),
        is_active: Some(new.is_active),
    };
    let view = state
        .store
        .update_job_posting(id, patch)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(view))
}

/// PATCH /api/jobpostings/:id/
pub async fn handle_update_job_posting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<JobPostingPayload>,
) -> Result<Json<JobPostingView>, AppError> {
    visible_posting(&state, &user, id).await?;
    let view = state
        .store
        .update_job_posting(id, req.into_patch()?)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(view))
}

/// DELETE /api/jobpostings/:id/
pub async fn handle_delete_job_posting(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    visible_posting(&state, &user, id).await?;
    if !state.store.delete_job_posting(id).await? {
        return Err(not_found(id));
    }
    Ok(StatusCode::NO_CONTENT)
}
