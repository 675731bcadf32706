//! Feature builder
//!
//! Fit phase (training documents only) produces [`FeatureArtifacts`]; the
//! transform phase maps any document through those frozen artifacts.

use super::{FeatureError, NumericScaler, Projection, TruncatedSvd};
use crate::data::Document;
use crate::nlp::TfIdfVectorizer;
use crate::utils::config::PipelineConfig;
use ndarray::{s, Array1, Array2};
use tracing::info;

/// Feature construction settings
#[derive(Debug, Clone)]
pub struct FeatureConfig {
    pub max_vocabulary_terms: usize,
    pub ngram_range: (usize, usize),
    pub reduced_dimensionality: usize,
    pub seed: u64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            max_vocabulary_terms: 5000,
            ngram_range: (1, 2),
            reduced_dimensionality: 300,
            seed: 42,
        }
    }
}

impl From<&PipelineConfig> for FeatureConfig {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            max_vocabulary_terms: config.max_vocabulary_terms,
            ngram_range: config.ngram_range,
            reduced_dimensionality: config.reduced_dimensionality,
            seed: config.random_seed,
        }
    }
}

/// Fits feature artifacts on training documents
#[derive(Debug, Clone, Default)]
pub struct FeatureBuilder {
    config: FeatureConfig,
}

impl FeatureBuilder {
    pub fn new(config: FeatureConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Fit vocabulary, projection and scaler on training documents
    pub fn fit(&self, documents: &[Document]) -> Result<FeatureArtifacts, FeatureError> {
        if documents.is_empty() {
            return Err(FeatureError::EmptyTrainingSet);
        }
        if self.config.reduced_dimensionality == 0 {
            return Err(FeatureError::InvalidDimensionality);
        }

        let texts: Vec<&str> = documents.iter().map(|d| d.normalized_text()).collect();

        let (min_n, max_n) = self.config.ngram_range;
        let mut vectorizer = TfIdfVectorizer::new()
            .with_ngram_range(min_n, max_n)
            .with_max_features(self.config.max_vocabulary_terms);
        vectorizer.fit(&texts);

        let tfidf = vectorizer.transform_batch(&texts);
        let projection = TruncatedSvd::new(self.config.reduced_dimensionality)
            .with_seed(self.config.seed)
            .fit(&tfidf, vectorizer.n_terms())?;

        let scaler = NumericScaler::fit(&raw_numeric(documents))?;

        info!(
            documents = documents.len(),
            vocabulary = vectorizer.n_terms(),
            components = projection.n_components(),
            explained_variance = projection.explained_variance_ratio().sum(),
            "Fitted feature artifacts"
        );

        Ok(FeatureArtifacts {
            vectorizer,
            projection,
            scaler,
        })
    }
}

/// Frozen vocabulary, projection and scaler
#[derive(Debug, Clone)]
pub struct FeatureArtifacts {
    vectorizer: TfIdfVectorizer,
    projection: Projection,
    scaler: NumericScaler,
}

impl FeatureArtifacts {
    pub fn vectorizer(&self) -> &TfIdfVectorizer {
        &self.vectorizer
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn scaler(&self) -> &NumericScaler {
        &self.scaler
    }

    /// Width of every feature vector
    pub fn width(&self) -> usize {
        self.projection.n_components() + self.scaler.n_features()
    }

    /// Column names: `svd_<i>` then the two numeric signals
    pub fn feature_names(&self) -> Vec<String> {
        (0..self.projection.n_components())
            .map(|i| format!("svd_{}", i))
            .chain(["word_count".to_string(), "char_count".to_string()])
            .collect()
    }

    /// Feature vector of one document
    pub fn transform_one(&self, document: &Document) -> Result<Array1<f64>, FeatureError> {
        let tfidf = self.vectorizer.transform(document.normalized_text());
        let reduced = self.projection.transform(&tfidf);

        let numeric = Array1::from_vec(vec![document.word_count() as f64, document.char_count() as f64]);
        let scaled = self.scaler.transform_row(numeric.view())?;

        let n_reduced = reduced.len();
        let mut out = Array1::<f64>::zeros(self.width());
        out.slice_mut(s![..n_reduced]).assign(&reduced);
        out.slice_mut(s![n_reduced..]).assign(&scaled);
        Ok(out)
    }

    /// Feature matrix, one row per document
    pub fn transform(&self, documents: &[Document]) -> Result<Array2<f64>, FeatureError> {
        let mut out = Array2::<f64>::zeros((documents.len(), self.width()));
        for (i, doc) in documents.iter().enumerate() {
            out.row_mut(i).assign(&self.transform_one(doc)?);
        }
        Ok(out)
    }
}

fn raw_numeric(documents: &[Document]) -> Array2<f64> {
    Array2::from_shape_fn((documents.len(), 2), |(i, j)| match j {
        0 => documents[i].word_count() as f64,
        _ => documents[i].char_count() as f64,
    })
}
