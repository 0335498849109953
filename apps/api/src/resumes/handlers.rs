use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;
use crate::models::classification::{round_confidence, CategoryMatch};
use crate::models::resume::{ResumeDetail, ResumeRow, ResumeSummary};
use crate::pagination::{Page, PageParams};
use crate::resumes::upload::{remove_stored_file, stage_upload, validate_upload};
use crate::state::AppState;
use crate::store::NewResume;
use crate::text::skills::sorted_skills;

#[derive(Serialize)]
pub struct SkillsResponse {
    pub resume_id: Uuid,
    pub skills_found: usize,
    pub skills: Vec<&'static str>,
}

#[derive(Deserialize)]
pub struct ByCategoryQuery {
    pub category: Option<String>,
}

#[derive(Serialize)]
pub struct ByCategoryEntry {
    pub resume_id: Uuid,
    pub user: String,
    pub category: String,
    pub confidence: f64,
    pub uploaded_at: DateTime<Utc>,
    pub classified_at: DateTime<Utc>,
}

impl From<CategoryMatch> for ByCategoryEntry {
    fn from(m: CategoryMatch) -> Self {
        Self {
            resume_id: m.resume_id,
            user: m.user,
            category: m.category,
            confidence: round_confidence(m.confidence),
            uploaded_at: m.uploaded_at,
            classified_at: m.classified_at,
        }
    }
}

#[derive(Serialize)]
pub struct ByCategoryResponse {
    pub category: String,
    pub count: usize,
    pub results: Vec<ByCategoryEntry>,
}

/// Loads a resume owned by `user`, or 404.
pub async fn owned_resume(state: &AppState, user: &AuthUser, id: Uuid) -> Result<ResumeRow, AppError> {
    state
        .store
        .get_resume(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))
}

/// GET /api/resumes/
pub async fn handle_list_resumes(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<PageParams>,
) -> Result<Json<Page<ResumeSummary>>, AppError> {
    let page_size = state.config.page_size;
    let paged = state
        .store
        .list_resumes(user.id, params.request(page_size)?)
        .await?;
    Ok(Json(params.into_page(paged, page_size)?))
}

/// POST /api/resumes/
///
/// Multipart upload with a single `file` field. Text is extracted before the
/// resume is stored; if extraction fails nothing is kept.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    user: AuthUser,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<ResumeDetail>), AppError> {
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("file: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("file: {e}")))?;
        upload = Some((file_name, bytes));
    }
    let (file_name, bytes) =
        upload.ok_or_else(|| AppError::Validation("file: no file was submitted".to_string()))?;

    let kind = validate_upload(&file_name, bytes.len())?;

    let media_dir = state.config.media_dir.clone();
    let staged = tokio::task::spawn_blocking(move || stage_upload(&media_dir, kind, &bytes))
        .await
        .map_err(|e| AppError::Internal(e.into()))??;

    let id = staged.id;
    let relative = staged.relative_path();
    let text = staged.text.clone();
    let media_dir = state.config.media_dir.clone();
    tokio::task::spawn_blocking(move || staged.persist(&media_dir))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Internal(anyhow::Error::new(e).context("could not store upload")))?;

    let inserted = state
        .store
        .insert_resume(NewResume {
            id,
            user_id: user.id,
            file: relative.clone(),
            original_filename: file_name,
            text_content: Some(text),
        })
        .await;
    let row = match inserted {
        Ok(row) => row,
        Err(e) => {
            remove_stored_file(&state.config.media_dir, &relative);
            return Err(e.into());
        }
    };

    info!("Stored resume {} for {} ({})", row.id, user.username, row.file);
    Ok((
        StatusCode::CREATED,
        Json(ResumeDetail::new(row, user.username, Vec::new())),
    ))
}

/// GET /api/resumes/:id/
pub async fn handle_get_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeDetail>, AppError> {
    let row = owned_resume(&state, &user, id).await?;
    let classifications = state.store.resume_classifications(row.id).await?;
    Ok(Json(ResumeDetail::new(row, user.username, classifications)))
}

/// DELETE /api/resumes/:id/
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let row = state
        .store
        .delete_resume(id, user.id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    remove_stored_file(&state.config.media_dir, &row.file);
    info!("Deleted resume {id}");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/resumes/:id/extract-skills/
pub async fn handle_extract_skills(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<SkillsResponse>, AppError> {
    let row = owned_resume(&state, &user, id).await?;
    let text = row
        .usable_text()
        .ok_or_else(|| AppError::Validation("No text extracted from this resume".to_string()))?;
    let skills = sorted_skills(text);
    Ok(Json(SkillsResponse {
        resume_id: row.id,
        skills_found: skills.len(),
        skills,
    }))
}

/// GET /api/resumes/by-category/?category=
pub async fn handle_by_category(
    State(state): State<AppState>,
    _user: AuthUser,
    Query(query): Query<ByCategoryQuery>,
) -> Result<Json<ByCategoryResponse>, AppError> {
    let category = query
        .category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation("category: query parameter is required".to_string()))?;
    let results: Vec<ByCategoryEntry> = state
        .store
        .classifications_by_category_name(&category)
        .await?
        .into_iter()
        .map(ByCategoryEntry::from)
        .collect();
    Ok(Json(ByCategoryResponse {
        category,
        count: results.len(),
        results,
    }))
}
