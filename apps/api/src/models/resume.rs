use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::classification::ClassificationView;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Path of the stored upload, relative to the media directory.
    pub file: String,
    pub original_filename: String,
    pub text_content: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

impl ResumeRow {
    /// The extracted text, if there is any non-blank text to work with.
    pub fn usable_text(&self) -> Option<&str> {
        self.text_content
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }
}

/// List entry for a resume; leaves out the text body.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeSummary {
    pub id: Uuid,
    pub file: String,
    pub original_filename: String,
    pub uploaded_at: DateTime<Utc>,
    pub user_name: String,
    pub classification_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDetail {
    pub id: Uuid,
    pub file: String,
    pub original_filename: String,
    pub text_content: Option<String>,
    pub uploaded_at: DateTime<Utc>,
    pub user_name: String,
    pub classifications: Vec<ClassificationView>,
}

impl ResumeDetail {
    pub fn new(row: ResumeRow, user_name: String, classifications: Vec<ClassificationView>) -> Self {
        Self {
            id: row.id,
            file: row.file,
            original_filename: row.original_filename,
            text_content: row.text_content,
            uploaded_at: row.uploaded_at,
            user_name,
            classifications,
        }
    }
}
