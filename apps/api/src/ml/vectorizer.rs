use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ml::analyzer::analyze;
use crate::ml::SparseRow;

#[derive(Debug, Error, PartialEq)]
pub enum VectorizerError {
    #[error("cannot fit a vectorizer on zero documents")]
    NoDocuments,

    #[error("max_df ({max_doc_count:.1} documents) is below min_df ({min_df} documents)")]
    DfBoundsConflict { max_doc_count: f64, min_df: usize },

    #[error("empty vocabulary after document frequency filtering")]
    EmptyVocabulary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfParams {
    /// Vocabulary cap, keeping the terms with the highest corpus frequency.
    pub max_features: usize,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum share of documents a term may appear in.
    pub max_df: f64,
}

impl Default for TfidfParams {
    fn default() -> Self {
        Self {
            max_features: 1500,
            min_df: 2,
            max_df: 0.8,
        }
    }
}

/// TF-IDF vectorizer with smoothed IDF and L2-normalized rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    params: TfidfParams,
    /// term → feature index; indices follow the terms' sorted order.
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Learns vocabulary and IDF weights from `documents`.
    pub fn fit<S: AsRef<str>>(
        documents: &[S],
        params: TfidfParams,
    ) -> Result<Self, VectorizerError> {
        if documents.is_empty() {
            return Err(VectorizerError::NoDocuments);
        }
        let n_docs = documents.len();

        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut corpus_freq: HashMap<String, usize> = HashMap::new();
        for doc in documents {
            let tokens = analyze(doc.as_ref());
            let mut seen = HashSet::new();
            for token in tokens {
                *corpus_freq.entry(token.clone()).or_default() += 1;
                if seen.insert(token.clone()) {
                    *doc_freq.entry(token).or_default() += 1;
                }
            }
        }

        let max_doc_count = params.max_df * n_docs as f64;
        if max_doc_count < params.min_df as f64 {
            return Err(VectorizerError::DfBoundsConflict {
                max_doc_count,
                min_df: params.min_df,
            });
        }

        let mut kept: Vec<(String, usize)> = doc_freq
            .iter()
            .filter(|&(_, &df)| df >= params.min_df && df as f64 <= max_doc_count)
            .map(|(term, _)| (term.clone(), corpus_freq[term]))
            .collect();
        if kept.len() > params.max_features {
            kept.sort_by(|(a_term, a_freq), (b_term, b_freq)| {
                b_freq.cmp(a_freq).then_with(|| a_term.cmp(b_term))
            });
            kept.truncate(params.max_features);
        }
        if kept.is_empty() {
            return Err(VectorizerError::EmptyVocabulary);
        }

        let mut terms: Vec<String> = kept.into_iter().map(|(term, _)| term).collect();
        terms.sort();

        let n = n_docs as f64;
        let idf = terms
            .iter()
            .map(|term| ((1.0 + n) / (1.0 + doc_freq[term] as f64)).ln() + 1.0)
            .collect();
        let vocabulary = terms
            .into_iter()
            .enumerate()
            .map(|(index, term)| (term, index))
            .collect();

        Ok(Self {
            params,
            vocabulary,
            idf,
        })
    }

    /// Maps `text` to an L2-normalized TF-IDF row. Unknown terms are ignored;
    /// text with no known terms yields an empty row.
    pub fn transform(&self, text: &str) -> SparseRow {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for token in analyze(text) {
            if let Some(&index) = self.vocabulary.get(&token) {
                *counts.entry(index).or_default() += 1.0;
            }
        }

        let mut row: SparseRow = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        let norm = row.iter().map(|(_, v)| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for (_, value) in &mut row {
                *value /= norm;
            }
        }
        row
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }
}
