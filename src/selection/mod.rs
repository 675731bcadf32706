//! Model selection: stratified folds and hyperparameter search

mod cross_validation;
mod grid_search;

pub use cross_validation::{CVScores, CVSplit, StratifiedKFold};
pub use grid_search::{CandidateScore, ForestParams, GridSearch, GridSearchResult, ParamGrid};

use crate::models::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectionError {
    #[error("Parameter grid has no candidates")]
    EmptyGrid,

    #[error("Cross-validation needs at least 2 folds, got {0}")]
    InvalidFolds(usize),

    #[error("{n_samples} training rows cannot fill {n_folds} folds")]
    TooFewSamples { n_samples: usize, n_folds: usize },

    #[error("Feature matrix has {rows} rows but {labels} labels")]
    DimensionMismatch { rows: usize, labels: usize },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
