//! Text processing
//!
//! Includes:
//! - Normalization (lowercasing, URL and non-letter stripping)
//! - TF-IDF vectorization over word n-grams

mod normalizer;
mod vectorizer;

pub use normalizer::{normalize, normalize_text, TextStats};
pub use vectorizer::{SparseVector, TfIdfVectorizer};
