//! Configuration management
//!
//! Every option has a default, so an empty file (or no file at all) yields
//! the standard pipeline.

use crate::models::{LogisticConfig, TieBreak};
use crate::selection::ParamGrid;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Vocabulary cap (top-K terms by corpus frequency)
    pub max_vocabulary_terms: usize,
    /// Inclusive n-gram range, `(1, 2)` = unigrams and bigrams
    pub ngram_range: (usize, usize),
    /// Width of the SVD projection
    pub reduced_dimensionality: usize,
    /// Fraction of rows held out for evaluation
    pub test_fraction: f64,
    /// Seed for the split, the projection and the forests
    pub random_seed: u64,
    /// Folds used by the grid search
    pub cv_folds: usize,
    /// Random forest hyperparameter grid
    pub rf_param_grid: ParamGrid,
    /// Baseline classifier settings
    pub logistic: LogisticConfig,
    /// Ensemble tie-break when the constituents disagree
    pub voting_tie_break: TieBreak,
    /// Report settings
    pub report: ReportSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_vocabulary_terms: 5000,
            ngram_range: (1, 2),
            reduced_dimensionality: 300,
            test_fraction: 0.2,
            random_seed: 42,
            cv_folds: 3,
            rf_param_grid: ParamGrid::default(),
            logistic: LogisticConfig::default(),
            voting_tie_break: TieBreak::default(),
            report: ReportSettings::default(),
        }
    }
}

/// Report settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Print every ROC point, not only the AUC
    pub roc_points: bool,
}

impl PipelineConfig {
    /// Reject values no pipeline run could succeed with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_vocabulary_terms == 0 {
            return Err(ConfigError::Invalid("max_vocabulary_terms must be positive".into()));
        }
        let (min_n, max_n) = self.ngram_range;
        if min_n == 0 || min_n > max_n {
            return Err(ConfigError::Invalid(format!(
                "ngram_range must satisfy 1 <= min <= max, got ({}, {})",
                min_n, max_n
            )));
        }
        if self.reduced_dimensionality == 0 {
            return Err(ConfigError::Invalid("reduced_dimensionality must be positive".into()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.cv_folds < 2 {
            return Err(ConfigError::Invalid(format!(
                "cv_folds must be at least 2, got {}",
                self.cv_folds
            )));
        }
        if self.rf_param_grid.is_empty() {
            return Err(ConfigError::Invalid("rf_param_grid has no candidates".into()));
        }
        if self.rf_param_grid.n_trees.iter().any(|&n| n == 0) {
            return Err(ConfigError::Invalid("rf_param_grid.n_trees entries must be positive".into()));
        }
        if self.rf_param_grid.max_depth.iter().any(|d| *d == Some(0)) {
            return Err(ConfigError::Invalid("rf_param_grid.max_depth entries must be positive".into()));
        }
        if self.logistic.max_iter == 0 || self.logistic.c <= 0.0 || self.logistic.learning_rate <= 0.0 {
            return Err(ConfigError::Invalid(
                "logistic.max_iter, logistic.c and logistic.learning_rate must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Load configuration from a `.toml` or `.json` file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let content = std::fs::read_to_string(path.as_ref())
        .map_err(|e| ConfigError::FileError(e.to_string()))?;

    let ext = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    let config: PipelineConfig = match ext {
        "json" => serde_json::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?,
        "toml" => toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?,
        _ => return Err(ConfigError::UnsupportedFormat(ext.to_string())),
    };

    config.validate()?;
    Ok(config)
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File I/O error
    #[error("File error: {0}")]
    FileError(String),
    /// Parse error
    #[error("Parse error: {0}")]
    ParseError(String),
    /// Unsupported format
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),
    /// Value out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
