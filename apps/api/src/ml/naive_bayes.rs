use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ml::SparseRow;

#[derive(Debug, Error, PartialEq)]
pub enum NaiveBayesError {
    #[error("cannot fit on zero samples")]
    NoSamples,

    #[error("got {rows} feature rows but {labels} labels")]
    LengthMismatch { rows: usize, labels: usize },

    #[error("feature index {index} out of range for {n_features} features")]
    FeatureOutOfRange { index: usize, n_features: usize },
}

/// Multinomial Naive-Bayes over non-negative feature rows, with Laplace
/// smoothing and empirical class priors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultinomialNb {
    /// Sorted class labels; every per-class vector below follows this order.
    classes: Vec<String>,
    class_log_prior: Vec<f64>,
    /// `[class][feature]` smoothed log-probabilities.
    feature_log_prob: Vec<Vec<f64>>,
}

impl MultinomialNb {
    pub const DEFAULT_ALPHA: f64 = 1.0;

    pub fn fit(
        rows: &[SparseRow],
        labels: &[String],
        n_features: usize,
        alpha: f64,
    ) -> Result<Self, NaiveBayesError> {
        if rows.is_empty() {
            return Err(NaiveBayesError::NoSamples);
        }
        if rows.len() != labels.len() {
            return Err(NaiveBayesError::LengthMismatch {
                rows: rows.len(),
                labels: labels.len(),
            });
        }

        let classes: Vec<String> = labels
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let class_index: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, class)| (class.as_str(), i))
            .collect();

        let mut class_count = vec![0usize; classes.len()];
        let mut feature_count = vec![vec![0.0_f64; n_features]; classes.len()];
        for (row, label) in rows.iter().zip(labels) {
            let class = class_index[label.as_str()];
            class_count[class] += 1;
            for &(index, value) in row {
                if index >= n_features {
                    return Err(NaiveBayesError::FeatureOutOfRange { index, n_features });
                }
                feature_count[class][index] += value;
            }
        }

        let total = rows.len() as f64;
        let class_log_prior = class_count
            .iter()
            .map(|&count| (count as f64 / total).ln())
            .collect();
        let feature_log_prob = feature_count
            .iter()
            .map(|counts| {
                let denominator = (counts.iter().sum::<f64>() + alpha * n_features as f64).ln();
                counts
                    .iter()
                    .map(|&c| (c + alpha).ln() - denominator)
                    .collect()
            })
            .collect();

        Ok(Self {
            classes,
            class_log_prior,
            feature_log_prob,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn n_features(&self) -> usize {
        self.feature_log_prob.first().map_or(0, Vec::len)
    }

    /// Per-class posterior probabilities, in [`classes`](Self::classes) order.
    /// Features outside the trained range are ignored.
    pub fn predict_proba(&self, row: &SparseRow) -> Vec<f64> {
        let joint: Vec<f64> = self
            .class_log_prior
            .iter()
            .zip(&self.feature_log_prob)
            .map(|(prior, log_probs)| {
                prior
                    + row
                        .iter()
                        .filter_map(|&(index, value)| log_probs.get(index).map(|lp| lp * value))
                        .sum::<f64>()
            })
            .collect();

        let max = joint.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let log_norm = max + joint.iter().map(|j| (j - max).exp()).sum::<f64>().ln();
        joint.iter().map(|j| (j - log_norm).exp()).collect()
    }

    /// Most probable class and its probability. Ties go to the first class
    /// in sorted order.
    pub fn predict(&self, row: &SparseRow) -> (&str, f64) {
        let proba = self.predict_proba(row);
        let mut best = 0;
        for (i, p) in proba.iter().enumerate() {
            if *p > proba[best] {
                best = i;
            }
        }
        (&self.classes[best], proba[best])
    }
}
