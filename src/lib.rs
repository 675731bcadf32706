//! # Fake News ML
//!
//! Classifies news articles as real or fake from their title and body.
//!
//! ## Modules
//!
//! - `data` - Dataset loading, preprocessing and stratified splitting
//! - `nlp` - Text normalization and TF-IDF vectorization
//! - `features` - Truncated SVD projection, numeric scaling, feature fusion
//! - `models` - Logistic regression, random forest, voting ensemble
//! - `selection` - Stratified k-fold and grid search
//! - `metrics` - Classification report, confusion matrix, ROC/AUC
//! - `pipeline` - End-to-end training and evaluation
//! - `utils` - Configuration

pub mod data;
pub mod features;
pub mod metrics;
pub mod models;
pub mod nlp;
pub mod pipeline;
pub mod selection;
pub mod utils;

pub use data::{Corpus, DataError, Document, Label, RawRecord, Split, StratifiedSplit};
pub use features::{FeatureArtifacts, FeatureBuilder, FeatureError};
pub use metrics::{ClassificationReport, ConfusionMatrix, RocCurve};
pub use models::{Capability, Classifier, LogisticRegression, Model, ModelError, RandomForest, VotingClassifier};
pub use nlp::{normalize, normalize_text, TextStats, TfIdfVectorizer};
pub use pipeline::{EvaluationRecord, Evaluator, Pipeline, PipelineError, PipelineReport, TrainedModels};
pub use selection::{GridSearch, GridSearchResult, ParamGrid, StratifiedKFold};
pub use utils::config::{load_config, ConfigError, PipelineConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::data::{Corpus, Document, Label, Split, StratifiedSplit};
    pub use crate::features::{FeatureArtifacts, FeatureBuilder};
    pub use crate::models::{Capability, Classifier, Model};
    pub use crate::pipeline::{Evaluator, Pipeline, PipelineReport};
    pub use crate::utils::config::PipelineConfig;
}
