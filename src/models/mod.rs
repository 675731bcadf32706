//! Machine learning models module
//!
//! The model space is closed: a logistic regression baseline, a random
//! forest tuned by grid search, and a hard-voting ensemble over both.

mod decision_tree;
mod logistic;
mod random_forest;
mod voting;

pub use decision_tree::{DecisionTree, TreeConfig, TreeNode};
pub use logistic::{LogisticConfig, LogisticRegression};
pub use random_forest::{ForestConfig, RandomForest};
pub use voting::{TieBreak, VotingClassifier};

use ndarray::{Array1, Array2};
use std::sync::Arc;
use thiserror::Error;

/// Errors for model fitting and prediction
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model has not been fitted yet")]
    NotFitted,

    #[error("Model is already fitted; build a new instance to retrain")]
    AlreadyFitted,

    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot fit on empty training data")]
    EmptyTrainingData,

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Model {0} does not produce probabilities")]
    ProbabilityUnsupported(String),
}

/// What a fitted model can output besides hard labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Calibrated positive-class probabilities are available
    Probabilistic,
    /// Only discrete predictions
    DiscreteOnly,
}

/// A fitted binary classifier over dense feature rows
///
/// Targets and predictions use `0.0` for real and `1.0` for fake.
pub trait Classifier: Send + Sync {
    fn name(&self) -> &str;

    /// Declared once at construction
    fn capability(&self) -> Capability;

    fn supports_probability(&self) -> bool {
        self.capability() == Capability::Probabilistic
    }

    /// Hard predictions
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError>;

    /// Probability of the positive (fake) class
    fn predict_proba(&self, _x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        Err(ModelError::ProbabilityUnsupported(self.name().to_string()))
    }
}

/// The trained model variants
#[derive(Debug, Clone)]
pub enum Model {
    Baseline(Arc<LogisticRegression>),
    Tuned(Arc<RandomForest>),
    Voting(VotingClassifier),
}

impl Classifier for Model {
    fn name(&self) -> &str {
        match self {
            Model::Baseline(m) => m.name(),
            Model::Tuned(m) => m.name(),
            Model::Voting(m) => m.name(),
        }
    }

    fn capability(&self) -> Capability {
        match self {
            Model::Baseline(m) => m.capability(),
            Model::Tuned(m) => m.capability(),
            Model::Voting(m) => m.capability(),
        }
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        match self {
            Model::Baseline(m) => m.predict(x),
            Model::Tuned(m) => m.predict(x),
            Model::Voting(m) => m.predict(x),
        }
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        match self {
            Model::Baseline(m) => m.predict_proba(x),
            Model::Tuned(m) => m.predict_proba(x),
            Model::Voting(m) => m.predict_proba(x),
        }
    }
}

/// Shared input checks for `fit`
pub(crate) fn check_training_data(x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
    if x.nrows() == 0 {
        return Err(ModelError::EmptyTrainingData);
    }
    if x.nrows() != y.len() {
        return Err(ModelError::DimensionMismatch {
            expected: x.nrows(),
            got: y.len(),
        });
    }
    Ok(())
}
