//! Resume classification in two steps: [`predict_category`] runs the model,
//! [`record_prediction`] reconciles the label with the category table and
//! replaces the resume's classification.

use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::ml::classifier::{Prediction, ResumeClassifier};
use crate::models::category::MAX_CATEGORY_NAME_CHARS;
use crate::models::classification::{ClassificationView, ConfidenceScore};
use crate::models::resume::ResumeRow;
use crate::store::{NewClassification, Store};

pub fn predict_category(classifier: &ResumeClassifier, text: &str) -> Result<Prediction, AppError> {
    Ok(classifier.predict(text)?)
}

pub async fn record_prediction(
    store: &dyn Store,
    resume_id: Uuid,
    prediction: &Prediction,
) -> Result<ClassificationView, AppError> {
    let confidence = ConfidenceScore::new(prediction.confidence).map_err(|_| {
        AppError::Classification(format!(
            "model returned confidence {} outside [0, 1]",
            prediction.confidence
        ))
    })?;
    if prediction.label.chars().count() > MAX_CATEGORY_NAME_CHARS {
        return Err(AppError::Classification(format!(
            "model returned a label longer than {MAX_CATEGORY_NAME_CHARS} characters"
        )));
    }
    let category = store.get_or_create_category(&prediction.label).await?;
    let view = store
        .replace_classification(NewClassification {
            resume_id,
            category_id: category.id,
            confidence,
        })
        .await?;
    Ok(view)
}

/// Classifies a stored resume, leaving exactly one classification for it.
pub async fn classify_resume(
    store: &dyn Store,
    classifier: &ResumeClassifier,
    resume: &ResumeRow,
) -> Result<ClassificationView, AppError> {
    let text = resume
        .usable_text()
        .ok_or_else(|| AppError::Validation("No text extracted from this resume".to_string()))?;
    let prediction = predict_category(classifier, text)?;
    let view = record_prediction(store, resume.id, &prediction).await?;
    info!(
        "Classified resume {} as {} ({:.2})",
        resume.id, view.category_name, view.confidence_score
    );
    Ok(view)
}
