//! End-to-end training and evaluation
//!
//! Stages run strictly in order: split document indices, fit features on
//! the training documents, transform both partitions, train, evaluate.

mod evaluator;
mod report;
mod trainer;

pub use evaluator::{EvaluationRecord, Evaluator};
pub use report::PipelineReport;
pub use trainer::{SearchSummary, TrainedModels, Trainer};

use crate::data::{Corpus, DataError, Document, StratifiedSplit};
use crate::features::{FeatureBuilder, FeatureConfig, FeatureError};
use crate::models::{Classifier, ModelError};
use crate::selection::SelectionError;
use crate::utils::config::{ConfigError, PipelineConfig};
use ndarray::Array1;
use thiserror::Error;
use tracing::info;

/// Any failure that aborts a run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("Feature error: {0}")]
    Feature(#[from] FeatureError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Model selection error: {0}")]
    Selection(#[from] SelectionError),
}

/// Configured pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Train every model on the training partition and score it on the rest
    pub fn run(&self, corpus: &Corpus) -> Result<PipelineReport, PipelineError> {
        let config = &self.config;

        let split = StratifiedSplit::new(config.test_fraction, config.random_seed)?
            .split_indices(&corpus.labels())?;
        let train_docs = corpus.subset(&split.train);
        let test_docs = corpus.subset(&split.test);
        info!(train = train_docs.len(), test = test_docs.len(), "Split corpus");

        let artifacts = FeatureBuilder::new(FeatureConfig::from(config)).fit(&train_docs)?;
        let x_train = artifacts.transform(&train_docs)?;
        let x_test = artifacts.transform(&test_docs)?;
        let y_train = targets(&train_docs);
        let y_test = targets(&test_docs);

        let trained = Trainer::from(config).train(&x_train, &y_train)?;

        let evaluator = Evaluator::new();
        let mut records = Vec::new();
        for model in trained.models() {
            let record = evaluator.evaluate(&model, &x_test, &y_test)?;
            info!(
                model = model.name(),
                accuracy = record.accuracy,
                f1 = record.f1,
                auc = ?record.auc,
                "Evaluated model"
            );
            records.push(record);
        }

        Ok(PipelineReport {
            preprocessing: corpus.stats(),
            n_documents: corpus.len(),
            n_train: train_docs.len(),
            n_test: test_docs.len(),
            feature_width: artifacts.width(),
            vocabulary_size: artifacts.vectorizer().n_terms(),
            explained_variance: artifacts.projection().explained_variance_ratio().sum(),
            baseline_converged: trained.baseline.converged(),
            search: trained.search,
            records,
            roc_points: config.report.roc_points,
        })
    }
}

fn targets(documents: &[Document]) -> Array1<f64> {
    documents.iter().map(|d| d.label().as_target()).collect()
}
