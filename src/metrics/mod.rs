//! Evaluation metrics

mod classification;
mod roc;

pub use classification::{
    accuracy, f1_score, AverageMetrics, ClassMetrics, ClassificationReport, ConfusionMatrix,
};
pub use roc::RocCurve;
