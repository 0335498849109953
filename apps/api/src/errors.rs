use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ml::classifier::ClassifierError;
use crate::store::StoreError;
use crate::text::extract::ExtractionError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Classification error: {0}")]
    Classification(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Extraction(msg) => (StatusCode::BAD_REQUEST, "EXTRACTION_ERROR", msg.clone()),
            AppError::ModelUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "MODEL_UNAVAILABLE",
                msg.clone(),
            ),
            AppError::Classification(msg) => {
                tracing::error!("Classification error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CLASSIFICATION_ERROR",
                    format!("Classification failed: {msg}"),
                )
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) | StoreError::InvalidReference(msg) => {
                AppError::Validation(msg)
            }
            StoreError::Database(e) => AppError::Database(e),
        }
    }
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedFormat(_) => AppError::Validation(err.to_string()),
            ExtractionError::Io(e) => {
                AppError::Internal(anyhow::Error::new(e).context("could not read stored document"))
            }
            other => AppError::Extraction(format!("Failed to extract text from file: {other}")),
        }
    }
}

impl From<ClassifierError> for AppError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::NotLoaded => AppError::ModelUnavailable(err.to_string()),
            other => AppError::Classification(other.to_string()),
        }
    }
}
