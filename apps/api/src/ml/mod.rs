//! Resume category classification: a TF-IDF vectorizer feeding a multinomial
//! Naive-Bayes model, trained offline and served read-only.

pub mod analyzer;
pub mod artifacts;
pub mod classifier;
pub mod naive_bayes;
pub mod split;
pub mod training;
pub mod vectorizer;

/// A sparse feature row: `(feature index, value)` pairs sorted by index.
pub type SparseRow = Vec<(usize, f64)>;
