use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPostingView {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub category: Uuid,
    pub category_name: String,
    pub created_at: DateTime<Utc>,
    pub is_active: bool,
}
