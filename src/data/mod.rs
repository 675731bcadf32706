//! Data structures and preprocessing module
//!
//! Provides the labeled document type, CSV ingestion with missing-value and
//! duplicate removal, and the stratified train/test split.

mod corpus;
mod document;
mod split;

pub use corpus::{Corpus, PreprocessStats};
pub use document::{Document, Label, RawRecord};
pub use split::{Split, SplitIndices, StratifiedSplit};

use thiserror::Error;

/// Errors raised while loading, cleaning or splitting data
#[derive(Error, Debug)]
pub enum DataError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input is missing the required {0:?} column")]
    MissingColumn(String),

    #[error("Unknown label {value:?} in record {row}")]
    UnknownLabel { row: usize, value: String },

    #[error("Corpus is empty after removing missing and duplicate rows")]
    EmptyCorpus,

    #[error("Class {label} has {count} member(s), at least {required} are needed to stratify")]
    InsufficientClassMembers {
        label: Label,
        count: usize,
        required: usize,
    },

    #[error("Split of {n_samples} rows leaves a partition smaller than the number of classes")]
    SplitTooSmall { n_samples: usize },

    #[error("Invalid test fraction: {0}")]
    InvalidFraction(f64),

    #[error("Dimension mismatch: {rows} feature rows but {labels} labels")]
    DimensionMismatch { rows: usize, labels: usize },
}
