use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Width of `categories.name`.
pub const MAX_CATEGORY_NAME_CHARS: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub keywords: String,
    pub created_at: DateTime<Utc>,
}

/// Category as returned by the API, with the number of classifications
/// pointing at it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryView {
    pub id: Uuid,
    pub name: String,
    pub keywords: String,
    pub created_at: DateTime<Utc>,
    pub resume_count: i64,
}
