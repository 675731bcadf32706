//! Classification metrics for the real/fake task
//!
//! The positive class is `Fake` (target `1.0`).

use crate::data::Label;
use ndarray::Array1;
use serde::Serialize;

/// Confusion matrix for binary classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ConfusionMatrix {
    /// Fake predicted as fake
    pub tp: usize,
    /// Real predicted as real
    pub tn: usize,
    /// Real predicted as fake
    pub fp: usize,
    /// Fake predicted as real
    pub fn_: usize,
}

impl ConfusionMatrix {
    /// Calculate confusion matrix from predictions
    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        let mut cm = Self::default();

        for (&t, &p) in y_true.iter().zip(y_pred.iter()) {
            match (Label::from_target(t), Label::from_target(p)) {
                (Label::Fake, Label::Fake) => cm.tp += 1,
                (Label::Real, Label::Real) => cm.tn += 1,
                (Label::Real, Label::Fake) => cm.fp += 1,
                (Label::Fake, Label::Real) => cm.fn_ += 1,
            }
        }

        cm
    }

    /// Rows are actual `[Real, Fake]`, columns predicted `[Real, Fake]`
    pub fn matrix(&self) -> [[usize; 2]; 2] {
        [[self.tn, self.fp], [self.fn_, self.tp]]
    }

    /// Total samples
    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// Number of samples whose actual label is `label`
    pub fn support(&self, label: Label) -> usize {
        self.matrix()[label.index()].iter().sum()
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.tp + self.tn, self.total())
    }

    /// Precision, recall and F1 treating `label` as the positive class
    pub fn class_metrics(&self, label: Label) -> ClassMetrics {
        let m = self.matrix();
        let k = label.index();
        let other = 1 - k;

        let hits = m[k][k];
        let precision = ratio(hits, hits + m[other][k]);
        let recall = ratio(hits, hits + m[k][other]);

        ClassMetrics {
            label,
            precision,
            recall,
            f1: harmonic_mean(precision, recall),
            support: self.support(label),
        }
    }

    /// Render as a small table
    pub fn display(&self) -> String {
        format!(
            "                Pred Real   Pred Fake\n\
             Actual Real     {:>9}   {:>9}\n\
             Actual Fake     {:>9}   {:>9}\n",
            self.tn, self.fp, self.fn_, self.tp
        )
    }
}

fn ratio(num: usize, denom: usize) -> f64 {
    if denom == 0 {
        0.0
    } else {
        num as f64 / denom as f64
    }
}

fn harmonic_mean(precision: f64, recall: f64) -> f64 {
    let denom = precision + recall;
    if denom < 1e-10 {
        0.0
    } else {
        2.0 * precision * recall / denom
    }
}

/// Fraction of matching predictions
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    ConfusionMatrix::from_predictions(y_true, y_pred).accuracy()
}

/// F1 score with `Fake` as the positive class
pub fn f1_score(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    ConfusionMatrix::from_predictions(y_true, y_pred)
        .class_metrics(Label::Fake)
        .f1
}

/// Per-class row of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassMetrics {
    pub label: Label,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Averaged row of a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Per-class precision, recall, F1 and support with averages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationReport {
    /// Ordered `[Real, Fake]`
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
}

impl ClassificationReport {
    pub fn from_confusion(cm: &ConfusionMatrix) -> Self {
        let classes: Vec<ClassMetrics> = Label::ALL.iter().map(|&l| cm.class_metrics(l)).collect();
        let total = cm.total();
        let n_classes = classes.len() as f64;

        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
            f1: classes.iter().map(|c| c.f1).sum::<f64>() / n_classes,
            support: total,
        };

        let weighted = |metric: fn(&ClassMetrics) -> f64| {
            if total == 0 {
                0.0
            } else {
                classes.iter().map(|c| metric(c) * c.support as f64).sum::<f64>() / total as f64
            }
        };
        let weighted_avg = AverageMetrics {
            precision: weighted(|c| c.precision),
            recall: weighted(|c| c.recall),
            f1: weighted(|c| c.f1),
            support: total,
        };

        Self {
            accuracy: cm.accuracy(),
            classes,
            macro_avg,
            weighted_avg,
        }
    }

    pub fn from_predictions(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> Self {
        Self::from_confusion(&ConfusionMatrix::from_predictions(y_true, y_pred))
    }

    pub fn class(&self, label: Label) -> &ClassMetrics {
        &self.classes[label.index()]
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        let mut s = String::new();
        s.push_str(&format!(
            "{:>14} {:>10} {:>10} {:>10} {:>10}\n",
            "", "precision", "recall", "f1-score", "support"
        ));
        for c in &self.classes {
            s.push_str(&format!(
                "{:>14} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
                c.label.to_string(),
                c.precision,
                c.recall,
                c.f1,
                c.support
            ));
        }
        s.push('\n');
        s.push_str(&format!(
            "{:>14} {:>10} {:>10} {:>10.4} {:>10}\n",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        ));
        for (name, avg) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            s.push_str(&format!(
                "{:>14} {:>10.4} {:>10.4} {:>10.4} {:>10}\n",
                name, avg.precision, avg.recall, avg.f1, avg.support
            ));
        }
        s
    }
}
