use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::ml::artifacts::{load_artifacts, ArtifactError, ModelArtifacts};

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classification model is not loaded; run the `train` command and restart")]
    NotLoaded,

    #[error(transparent)]
    Artifact(#[from] ArtifactError),

    #[error("model expects {model} features but the vectorizer produces {vectorizer}")]
    FeatureMismatch { model: usize, vectorizer: usize },
}

/// Predicted category label with its probability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    /// Maximum per-class probability, in [0, 1].
    pub confidence: f64,
}

/// Read-only resume classifier, built once at startup and shared via `AppState`.
///
/// Either holds a full artifact set or is "not loaded", in which case every
/// prediction fails with [`ClassifierError::NotLoaded`].
#[derive(Debug, Clone)]
pub struct ResumeClassifier {
    artifacts: Option<ModelArtifacts>,
}

impl ResumeClassifier {
    /// Loads artifacts from `dir`. Missing artifacts produce a not-loaded
    /// classifier; unreadable ones are an error.
    pub fn load(dir: &Path) -> Result<Self, ClassifierError> {
        match load_artifacts(dir)? {
            Some(artifacts) => {
                let (model, vectorizer) = (
                    artifacts.model.n_features(),
                    artifacts.vectorizer.n_features(),
                );
                if model != vectorizer {
                    return Err(ClassifierError::FeatureMismatch { model, vectorizer });
                }
                if artifacts.categories != artifacts.model.classes() {
                    warn!(
                        "categories artifact disagrees with model classes; using the model's {} classes",
                        artifacts.model.classes().len()
                    );
                }
                info!(
                    "Classifier loaded from {} ({} categories, {} features)",
                    dir.display(),
                    artifacts.model.classes().len(),
                    artifacts.vectorizer.n_features()
                );
                Ok(Self::from_artifacts(artifacts))
            }
            None => {
                warn!(
                    "No model artifacts in {}; classification is unavailable",
                    dir.display()
                );
                Ok(Self::not_loaded())
            }
        }
    }

    pub fn from_artifacts(artifacts: ModelArtifacts) -> Self {
        Self {
            artifacts: Some(artifacts),
        }
    }

    pub fn not_loaded() -> Self {
        Self { artifacts: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.artifacts.is_some()
    }

    /// Classifies `text`. Deterministic for a given artifact set.
    pub fn predict(&self, text: &str) -> Result<Prediction, ClassifierError> {
        let artifacts = self.artifacts.as_ref().ok_or(ClassifierError::NotLoaded)?;
        let row = artifacts.vectorizer.transform(text);
        let (label, confidence) = artifacts.model.predict(&row);
        Ok(Prediction {
            label: label.to_string(),
            confidence,
        })
    }

    /// Labels the model was trained on, sorted; empty when not loaded.
    pub fn list_categories(&self) -> Vec<String> {
        self.artifacts
            .as_ref()
            .map(|a| a.model.classes().to_vec())
            .unwrap_or_default()
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::toy_classifier;
    use super::*;
    use crate::ml::artifacts::save_artifacts;
    use crate::ml::vectorizer::{TfidfParams, TfidfVectorizer};

    #[test]
    fn test_not_loaded_predict_fails() {
        let classifier = ResumeClassifier::not_loaded();
        assert!(!classifier.is_loaded());
        assert!(matches!(
            classifier.predict("python developer"),
            Err(ClassifierError::NotLoaded)
        ));
        assert!(classifier.list_categories().is_empty());
    }

    #[test]
    fn test_load_from_empty_dir_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let classifier = ResumeClassifier::load(dir.path()).unwrap();
        assert!(!classifier.is_loaded());
    }

    #[test]
    fn test_predicts_expected_labels() {
        let classifier = toy_classifier();
        let p = classifier.predict("Senior Python backend developer").unwrap();
        assert_eq!(p.label, "Engineering");
        let p = classifier.predict("Account executive beating sales quota").unwrap();
        assert_eq!(p.label, "Sales");
        assert!(p.confidence > 0.5 && p.confidence <= 1.0);
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let classifier = toy_classifier();
        let text = "python developer with crm experience";
        let first = classifier.predict(text).unwrap();
        for _ in 0..10 {
            assert_eq!(classifier.predict(text).unwrap(), first);
        }
    }

    #[test]
    fn test_unknown_text_uses_priors() {
        let p = toy_classifier().predict("").unwrap();
        // equal priors: tie goes to the first sorted label
        assert_eq!(p.label, "Engineering");
        assert!((p.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_list_categories_sorted() {
        assert_eq!(toy_classifier().list_categories(), vec!["Engineering", "Sales"]);
    }

    #[test]
    fn test_loaded_from_disk_matches_in_memory() {
        let dir = tempfile::tempdir().unwrap();
        let in_memory = toy_classifier();
        let artifacts = in_memory.artifacts.clone().unwrap();
        save_artifacts(dir.path(), &artifacts).unwrap();
        let loaded = ResumeClassifier::load(dir.path()).unwrap();
        assert!(loaded.is_loaded());
        let text = "rust developer closing sales";
        assert_eq!(loaded.predict(text).unwrap(), in_memory.predict(text).unwrap());
    }

    #[test]
    fn test_mismatched_artifacts_fail_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut artifacts = toy_classifier().artifacts.unwrap();
        let params = TfidfParams {
            max_features: 100,
            min_df: 1,
            max_df: 1.0,
        };
        artifacts.vectorizer = TfidfVectorizer::fit(&["rust tokio"], params).unwrap();
        save_artifacts(dir.path(), &artifacts).unwrap();
        let err = ResumeClassifier::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            ClassifierError::FeatureMismatch { vectorizer: 2, .. }
        ));
    }
}
