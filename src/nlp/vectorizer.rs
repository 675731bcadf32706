//! TF-IDF vectorization
//!
//! Maps normalized text onto a fixed vocabulary of word n-grams weighted by
//! term frequency times inverse document frequency. Rows are sparse because
//! the vocabulary usually runs into thousands of terms.

use ndarray::ArrayView1;
use std::collections::{HashMap, HashSet};

/// Sparse row: sorted column indices with their values
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    /// Number of stored entries
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Dot product with a dense vector
    pub fn dot(&self, dense: &ArrayView1<f64>) -> f64 {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&i, &v)| v * dense[i])
            .sum()
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }
}

/// TF-IDF vectorizer over word n-grams
#[derive(Debug, Clone)]
pub struct TfIdfVectorizer {
    /// Inclusive n-gram range
    ngram_range: (usize, usize),
    /// Vocabulary cap (None = keep every term)
    max_features: Option<usize>,
    /// Shorter tokens are dropped before n-grams are formed
    min_token_length: usize,
    /// Term -> column index
    vocabulary: HashMap<String, usize>,
    /// Column index -> term
    terms: Vec<String>,
    /// IDF per column
    idf: Vec<f64>,
    /// Number of documents seen by fit
    n_documents: usize,
}

impl TfIdfVectorizer {
    pub fn new() -> Self {
        Self {
            ngram_range: (1, 1),
            max_features: None,
            min_token_length: 2,
            vocabulary: HashMap::new(),
            terms: Vec::new(),
            idf: Vec::new(),
            n_documents: 0,
        }
    }

    /// Set the inclusive n-gram range, e.g. `(1, 2)` for unigrams and bigrams
    pub fn with_ngram_range(mut self, min_n: usize, max_n: usize) -> Self {
        let min_n = min_n.max(1);
        self.ngram_range = (min_n, max_n.max(min_n));
        self
    }

    /// Keep only the most frequent terms
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    pub fn with_min_token_length(mut self, len: usize) -> Self {
        self.min_token_length = len;
        self
    }

    /// Number of columns
    pub fn n_terms(&self) -> usize {
        self.terms.len()
    }

    pub fn vocabulary(&self) -> &HashMap<String, usize> {
        &self.vocabulary
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn idf(&self) -> &[f64] {
        &self.idf
    }

    pub fn n_documents(&self) -> usize {
        self.n_documents
    }

    /// Word n-grams of a normalized text
    pub fn ngrams(&self, text: &str) -> Vec<String> {
        let tokens: Vec<&str> = text
            .split_whitespace()
            .filter(|t| t.chars().count() >= self.min_token_length)
            .collect();

        let (min_n, max_n) = self.ngram_range;
        let mut grams = Vec::new();
        for n in min_n..=max_n {
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    /// Build the vocabulary and IDF weights from a corpus
    pub fn fit<S: AsRef<str>>(&mut self, documents: &[S]) {
        let mut term_freq: HashMap<String, usize> = HashMap::new();
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let grams = self.ngrams(doc.as_ref());
            {
                let unique: HashSet<&String> = grams.iter().collect();
                for term in unique {
                    *doc_freq.entry(term.clone()).or_insert(0) += 1;
                }
            }
            for term in grams {
                *term_freq.entry(term).or_insert(0) += 1;
            }
        }

        // Most frequent first; ties broken alphabetically for a stable cut
        let mut ranked: Vec<(String, usize)> = term_freq.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        if let Some(limit) = self.max_features {
            ranked.truncate(limit);
        }

        let mut kept: Vec<String> = ranked.into_iter().map(|(term, _)| term).collect();
        kept.sort();

        let n_docs = documents.len() as f64;
        self.idf = kept
            .iter()
            .map(|term| {
                let df = doc_freq.get(term).copied().unwrap_or(0) as f64;
                ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0
            })
            .collect();

        self.vocabulary = kept
            .iter()
            .enumerate()
            .map(|(idx, term)| (term.clone(), idx))
            .collect();
        self.terms = kept;
        self.n_documents = documents.len();
    }

    /// L2-normalized TF-IDF row; out-of-vocabulary terms are skipped
    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<usize, f64> = HashMap::new();
        for gram in self.ngrams(text) {
            if let Some(&idx) = self.vocabulary.get(&gram) {
                *counts.entry(idx).or_insert(0.0) += 1.0;
            }
        }

        let mut entries: Vec<(usize, f64)> = counts
            .into_iter()
            .map(|(idx, tf)| (idx, tf * self.idf[idx]))
            .collect();
        entries.sort_by_key(|&(idx, _)| idx);

        let mut row = SparseVector {
            indices: entries.iter().map(|&(i, _)| i).collect(),
            values: entries.iter().map(|&(_, v)| v).collect(),
        };

        let norm = row.norm();
        if norm > 0.0 {
            for v in row.values.iter_mut() {
                *v /= norm;
            }
        }

        row
    }

    pub fn transform_batch<S: AsRef<str>>(&self, documents: &[S]) -> Vec<SparseVector> {
        documents.iter().map(|d| self.transform(d.as_ref())).collect()
    }
}

impl Default for TfIdfVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
