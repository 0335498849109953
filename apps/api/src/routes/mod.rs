pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::auth::handlers as auth;
use crate::categories::handlers as categories;
use crate::classification::handlers as classification;
use crate::jobs::handlers as jobs;
use crate::resumes::handlers as resumes;
use crate::resumes::upload::MAX_UPLOAD_BYTES;
use crate::state::AppState;

/// Room for multipart framing around a maximum-size file; anything past this
/// is cut off and reported as a validation error.
const BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/register/", post(auth::handle_register))
        .route("/api/token/", post(auth::handle_obtain_token))
        .route("/api/token/refresh/", post(auth::handle_refresh_token))
        // Categories
        .route(
            "/api/categories/",
            get(categories::handle_list_categories).post(categories::handle_create_category),
        )
        .route(
            "/api/categories/:id/",
            get(categories::handle_get_category)
                .put(categories::handle_replace_category)
                .patch(categories::handle_update_category)
                .delete(categories::handle_delete_category),
        )
        .route(
            "/api/categories/:id/resumes/",
            get(categories::handle_category_resumes),
        )
        // Resumes
        .route(
            "/api/resumes/",
            get(resumes::handle_list_resumes).post(resumes::handle_upload_resume),
        )
        .route("/api/resumes/by-category/", get(resumes::handle_by_category))
        .route(
            "/api/resumes/:id/",
            get(resumes::handle_get_resume).delete(resumes::handle_delete_resume),
        )
        .route(
            "/api/resumes/:id/classify/",
            post(classification::handle_classify_resume),
        )
        .route(
            "/api/resumes/:id/extract-skills/",
            get(resumes::handle_extract_skills),
        )
        // Classifications
        .route(
            "/api/classifications/",
            get(classification::handle_list_classifications)
                .post(classification::handle_create_classification),
        )
        .route(
            "/api/classifications/stats/",
            get(classification::handle_classification_stats),
        )
        .route(
            "/api/classifications/:id/",
            get(classification::handle_get_classification)
                .delete(classification::handle_delete_classification),
        )
        .route(
            "/api/classifier/categories/",
            get(classification::handle_classifier_categories),
        )
        // Job postings
        .route(
            "/api/jobpostings/",
            get(jobs::handle_list_job_postings).post(jobs::handle_create_job_posting),
        )
        .route(
            "/api/jobpostings/:id/",
            get(jobs::handle_get_job_posting)
                .put(jobs::handle_replace_job_posting)
                .patch(jobs::handle_update_job_posting)
                .delete(jobs::handle_delete_job_posting),
        )
        .layer(DefaultBodyLimit::max(BODY_LIMIT))
        .with_state(state)
}
