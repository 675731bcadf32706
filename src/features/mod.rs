//! Feature construction
//!
//! Dense document features = truncated SVD of TF-IDF rows, followed by the
//! standardized word and character counts. Everything here is fit once on
//! training documents and then only read.

mod builder;
mod projection;
mod scaler;

pub use builder::{FeatureArtifacts, FeatureBuilder, FeatureConfig};
pub use projection::{Projection, TruncatedSvd};
pub use scaler::NumericScaler;

use thiserror::Error;

/// Errors raised while fitting feature artifacts
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Cannot fit features on an empty training set")]
    EmptyTrainingSet,

    #[error("Target dimensionality must be positive")]
    InvalidDimensionality,

    #[error("Dimension mismatch: expected {expected} columns, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}
