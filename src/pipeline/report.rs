//! Text report of a pipeline run

use super::{EvaluationRecord, SearchSummary};
use crate::data::PreprocessStats;
use std::fmt;

/// Everything a run produced, ready to print
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub preprocessing: PreprocessStats,
    pub n_documents: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub feature_width: usize,
    pub vocabulary_size: usize,
    /// Share of training TF-IDF variance kept by the projection
    pub explained_variance: f64,
    pub baseline_converged: bool,
    pub search: SearchSummary,
    /// Baseline, tuned forest, ensemble
    pub records: Vec<EvaluationRecord>,
    /// Print every ROC point, not only the AUC
    pub roc_points: bool,
}

impl PipelineReport {
    pub fn record(&self, model_name: &str) -> Option<&EvaluationRecord> {
        self.records.iter().find(|r| r.model_name == model_name)
    }
}

impl fmt::Display for PipelineReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stats = &self.preprocessing;
        writeln!(f, "=== Dataset ===\n")?;
        writeln!(f, "Rows read:          {}", stats.rows_read)?;
        writeln!(f, "Dropped (missing):  {}", stats.missing_dropped)?;
        writeln!(f, "Dropped (dupes):    {}", stats.duplicates_dropped)?;
        writeln!(f, "Documents:          {}", self.n_documents)?;
        writeln!(f, "Train / test:       {} / {}", self.n_train, self.n_test)?;
        writeln!(f, "Vocabulary terms:   {}", self.vocabulary_size)?;
        writeln!(f, "Feature width:      {}", self.feature_width)?;
        writeln!(f, "Explained variance: {:.4}", self.explained_variance)?;

        writeln!(f, "\n=== Grid Search (F1, fake) ===\n")?;
        for candidate in &self.search.candidates {
            let marker = if candidate.params == self.search.best_params { "*" } else { " " };
            writeln!(f, "{} {:32} {}", marker, candidate.params.to_string(), candidate.scores.summary())?;
        }
        writeln!(f, "\nBest: {} (mean F1 {:.4})", self.search.best_params, self.search.best_score)?;
        if !self.baseline_converged {
            writeln!(f, "Note: logistic regression stopped at its iteration limit")?;
        }

        for record in &self.records {
            writeln!(f, "\n=== {} ===\n", record.model_name)?;
            writeln!(f, "Accuracy: {:.4}", record.accuracy)?;
            writeln!(f, "F1:       {:.4}", record.f1)?;
            match record.auc {
                Some(auc) => writeln!(f, "AUC:      {:.4}", auc)?,
                None => writeln!(f, "AUC:      n/a")?,
            }
            writeln!(f)?;
            write!(f, "{}", record.report.report())?;
            writeln!(f)?;
            write!(f, "{}", record.confusion_matrix.display())?;

            if self.roc_points {
                if let Some(roc) = &record.roc {
                    writeln!(f, "\n{:>10} {:>10} {:>10}", "threshold", "fpr", "tpr")?;
                    for ((t, fpr), tpr) in roc.thresholds.iter().zip(&roc.fpr).zip(&roc.tpr) {
                        writeln!(f, "{:>10.4} {:>10.4} {:>10.4}", t, fpr, tpr)?;
                    }
                }
            }
        }

        Ok(())
    }
}
