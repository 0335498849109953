//! Offline training pipeline: labeled CSV → TF-IDF + Naive-Bayes artifacts.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::ml::artifacts::{save_artifacts, ArtifactError, ModelArtifacts};
use crate::ml::naive_bayes::{MultinomialNb, NaiveBayesError};
use crate::ml::split::train_test_split;
use crate::ml::vectorizer::{TfidfParams, TfidfVectorizer, VectorizerError};

pub const TEST_FRACTION: f64 = 0.2;
pub const SPLIT_SEED: u64 = 42;
const SAMPLE_PREDICTIONS: usize = 5;

#[derive(Debug, Error)]
pub enum TrainingError {
    #[error("cannot read dataset: {0}")]
    Dataset(#[from] csv::Error),

    #[error("dataset has no {0:?} column")]
    MissingColumn(String),

    #[error("need at least 2 labeled rows to train, found {0}")]
    NotEnoughRows(usize),

    #[error(transparent)]
    Vectorizer(#[from] VectorizerError),

    #[error(transparent)]
    Model(#[from] NaiveBayesError),

    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

#[derive(Debug, Clone)]
pub struct LabeledResume {
    pub text: String,
    pub label: String,
}

/// Loaded dataset plus how many rows were read before cleanup.
#[derive(Debug)]
pub struct Dataset {
    pub total_rows: usize,
    pub rows: Vec<LabeledResume>,
}

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub text_column: String,
    pub label_column: String,
    pub params: TfidfParams,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            text_column: "Resume_str".to_string(),
            label_column: "Category".to_string(),
            params: TfidfParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SamplePrediction {
    pub excerpt: String,
    pub predicted: String,
    pub confidence: f64,
    pub actual: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub dataset_rows: usize,
    pub usable_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub stratified: bool,
    pub vocabulary_size: usize,
    pub accuracy: f64,
    /// Rows per label in the cleaned dataset.
    pub distribution: BTreeMap<String, usize>,
    pub samples: Vec<SamplePrediction>,
}

/// Reads a CSV dataset, dropping rows whose text or label is empty.
pub fn load_dataset(path: &Path, options: &TrainingOptions) -> Result<Dataset, TrainingError> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    read_dataset(reader, options)
}

fn read_dataset<R: std::io::Read>(
    mut reader: csv::Reader<R>,
    options: &TrainingOptions,
) -> Result<Dataset, TrainingError> {
    let headers = reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| TrainingError::MissingColumn(name.to_string()))
    };
    let text_idx = column(&options.text_column)?;
    let label_idx = column(&options.label_column)?;

    let mut total_rows = 0;
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        total_rows += 1;
        let text = record.get(text_idx).unwrap_or_default();
        let label = record.get(label_idx).unwrap_or_default();
        if text.is_empty() || label.is_empty() {
            continue;
        }
        rows.push(LabeledResume {
            text: text.to_string(),
            label: label.to_string(),
        });
    }
    Ok(Dataset { total_rows, rows })
}

/// Splits, fits and evaluates a model. Accuracy is reported, never enforced.
pub fn train(
    dataset: &Dataset,
    params: TfidfParams,
) -> Result<(ModelArtifacts, TrainingReport), TrainingError> {
    let rows = &dataset.rows;
    let labels: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();

    let mut distribution: BTreeMap<String, usize> = BTreeMap::new();
    for label in &labels {
        *distribution.entry(label.clone()).or_default() += 1;
    }
    info!("{} usable rows across {} categories", rows.len(), distribution.len());

    let split = train_test_split(&labels, TEST_FRACTION, SPLIT_SEED)
        .ok_or(TrainingError::NotEnoughRows(rows.len()))?;
    if !split.stratified {
        info!("Stratified split impossible, using a plain shuffle split");
    }
    info!("Train: {} rows, test: {} rows", split.train.len(), split.test.len());

    let train_docs: Vec<&str> = split.train.iter().map(|&i| rows[i].text.as_str()).collect();
    let train_labels: Vec<String> = split.train.iter().map(|&i| labels[i].clone()).collect();

    let vectorizer = TfidfVectorizer::fit(&train_docs, params)?;
    info!("Vocabulary: {} terms", vectorizer.n_features());

    let train_rows: Vec<_> = train_docs.iter().map(|d| vectorizer.transform(d)).collect();
    let model = MultinomialNb::fit(
        &train_rows,
        &train_labels,
        vectorizer.n_features(),
        MultinomialNb::DEFAULT_ALPHA,
    )?;

    let categories = model.classes().to_vec();
    let artifacts = ModelArtifacts {
        model,
        vectorizer,
        categories,
    };

    let mut correct = 0;
    let mut samples = Vec::new();
    for &i in &split.test {
        let row = artifacts.vectorizer.transform(&rows[i].text);
        let (predicted, confidence) = artifacts.model.predict(&row);
        if predicted == rows[i].label {
            correct += 1;
        }
        if samples.len() < SAMPLE_PREDICTIONS {
            samples.push(SamplePrediction {
                excerpt: rows[i].text.chars().take(100).collect(),
                predicted: predicted.to_string(),
                confidence,
                actual: rows[i].label.clone(),
            });
        }
    }
    let accuracy = correct as f64 / split.test.len() as f64;

    let report = TrainingReport {
        dataset_rows: dataset.total_rows,
        usable_rows: rows.len(),
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        stratified: split.stratified,
        vocabulary_size: artifacts.vectorizer.n_features(),
        accuracy,
        distribution,
        samples,
    };
    Ok((artifacts, report))
}

/// Full pipeline: load, train, evaluate and write the artifacts to `model_dir`.
pub fn run_training(
    dataset_path: &Path,
    model_dir: &Path,
    options: &TrainingOptions,
) -> Result<TrainingReport, TrainingError> {
    info!("Loading dataset from {}", dataset_path.display());
    let dataset = load_dataset(dataset_path, options)?;
    info!(
        "Dataset: {} rows read, {} kept after dropping incomplete rows",
        dataset.total_rows,
        dataset.rows.len()
    );

    let (artifacts, report) = train(&dataset, options.params.clone())?;
    info!("Held-out accuracy: {:.2}%", report.accuracy * 100.0);
    for (n, sample) in report.samples.iter().enumerate() {
        info!(
            "Sample {}: predicted {} ({:.2}%), actual {} | {}...",
            n + 1,
            sample.predicted,
            sample.confidence * 100.0,
            sample.actual,
            sample.excerpt
        );
    }

    save_artifacts(model_dir, &artifacts)?;
    info!("Artifacts written to {}", model_dir.display());
    Ok(report)
}
