//! On-disk model artifacts. The three files are written together by training
//! and read together by the classifier.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::ml::naive_bayes::MultinomialNb;
use crate::ml::vectorizer::TfidfVectorizer;

pub const MODEL_FILE: &str = "resume_classifier.bin";
pub const VECTORIZER_FILE: &str = "vectorizer.bin";
pub const CATEGORIES_FILE: &str = "categories.bin";

#[derive(Debug, Error)]
pub enum ArtifactError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot (de)serialize {}: {source}", path.display())]
    Codec {
        path: PathBuf,
        source: bincode::Error,
    },
}

/// A trained vectorizer/model pair plus its sorted label list.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelArtifacts {
    pub model: MultinomialNb,
    pub vectorizer: TfidfVectorizer,
    pub categories: Vec<String>,
}

pub fn artifact_paths(dir: &Path) -> [PathBuf; 3] {
    [
        dir.join(MODEL_FILE),
        dir.join(VECTORIZER_FILE),
        dir.join(CATEGORIES_FILE),
    ]
}

/// Writes all three artifacts into `dir`, creating it if needed.
pub fn save_artifacts(dir: &Path, artifacts: &ModelArtifacts) -> Result<(), ArtifactError> {
    std::fs::create_dir_all(dir).map_err(|source| ArtifactError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let [model_path, vectorizer_path, categories_path] = artifact_paths(dir);
    write_bin(&model_path, &artifacts.model)?;
    write_bin(&vectorizer_path, &artifacts.vectorizer)?;
    write_bin(&categories_path, &artifacts.categories)?;
    Ok(())
}

/// Reads the artifacts from `dir`. Returns `Ok(None)` unless all three files exist.
pub fn load_artifacts(dir: &Path) -> Result<Option<ModelArtifacts>, ArtifactError> {
    let paths = artifact_paths(dir);
    if !paths.iter().all(|p| p.is_file()) {
        return Ok(None);
    }
    let [model_path, vectorizer_path, categories_path] = paths;
    Ok(Some(ModelArtifacts {
        model: read_bin(&model_path)?,
        vectorizer: read_bin(&vectorizer_path)?,
        categories: read_bin(&categories_path)?,
    }))
}

fn write_bin<T: Serialize>(path: &Path, value: &T) -> Result<(), ArtifactError> {
    let file = File::create(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);
    bincode::serialize_into(&mut writer, value).map_err(|source| ArtifactError::Codec {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_bin<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let file = File::open(path).map_err(|source| ArtifactError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    bincode::deserialize_from(BufReader::new(file)).map_err(|source| ArtifactError::Codec {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml::vectorizer::TfidfParams;

    fn sample() -> ModelArtifacts {
        let docs = ["rust tokio axum", "rust serde", "sales crm pipeline", "sales quota"];
        let labels: Vec<String> = ["Eng", "Eng", "Sales", "Sales"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let params = TfidfParams {
            max_features: 50,
            min_df: 1,
            max_df: 1.0,
        };
        let vectorizer = TfidfVectorizer::fit(&docs, params).unwrap();
        let rows: Vec<_> = docs.iter().map(|d| vectorizer.transform(d)).collect();
        let model =
            MultinomialNb::fit(&rows, &labels, vectorizer.n_features(), 1.0).unwrap();
        let categories = model.classes().to_vec();
        ModelArtifacts {
            model,
            vectorizer,
            categories,
        }
    }

    #[test]
    fn test_missing_dir_is_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_artifacts(&dir.path().join("nope")).unwrap().is_none());
    }

    #[test]
    fn test_partial_artifacts_are_not_loaded() {
        let dir = tempfile::tempdir().unwrap();
        save_artifacts(dir.path(), &sample()).unwrap();
        std::fs::remove_file(dir.path().join(VECTORIZER_FILE)).unwrap();
        assert!(load_artifacts(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_save_then_load_restores_everything() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = sample();
        save_artifacts(&dir.path().join("models"), &artifacts).unwrap();
        let loaded = load_artifacts(&dir.path().join("models")).unwrap().unwrap();
        assert_eq!(loaded, artifacts);
    }

    #[test]
    fn test_corrupt_artifact_is_codec_error() {
        let dir = tempfile::tempdir().unwrap();
        save_artifacts(dir.path(), &sample()).unwrap();
        std::fs::write(dir.path().join(MODEL_FILE), b"\x01\x02").unwrap();
        assert!(matches!(
            load_artifacts(dir.path()),
            Err(ArtifactError::Codec { .. })
        ));
    }
}
