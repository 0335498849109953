use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::errors::AppError;

/// A classification confidence, guaranteed to lie in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct ConfidenceScore(f64);

impl ConfidenceScore {
    pub fn new(value: f64) -> Result<Self, AppError> {
        if (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(AppError::Validation(
                "confidence_score: must be between 0 and 1".to_string(),
            ))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ClassificationView {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub user_name: String,
    pub resume_file: String,
    pub category: Uuid,
    pub category_name: String,
    pub confidence_score: f64,
    pub classified_at: DateTime<Utc>,
}

/// One row of a by-category lookup.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CategoryMatch {
    pub resume_id: Uuid,
    pub user: String,
    pub category: String,
    pub confidence: f64,
    pub uploaded_at: DateTime<Utc>,
    pub classified_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationStats {
    pub total_classifications: i64,
    pub average_confidence: f64,
    /// Category name → classification count; categories with none are absent.
    pub categories_distribution: BTreeMap<String, i64>,
}

/// Rounds a confidence to two decimals for display.
pub fn round_confidence(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
