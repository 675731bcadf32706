//! Held-out evaluation of fitted models

use crate::data::Label;
use crate::metrics::{ClassificationReport, ConfusionMatrix, RocCurve};
use crate::models::{Capability, Classifier, ModelError};
use ndarray::{Array1, Array2};
use serde::Serialize;
use tracing::warn;

/// Metrics of one model on the held-out partition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationRecord {
    pub model_name: String,
    pub accuracy: f64,
    /// F1 with fake as the positive class
    pub f1: f64,
    pub report: ClassificationReport,
    pub confusion_matrix: ConfusionMatrix,
    /// Present only for probabilistic models on two-class test sets
    pub roc: Option<RocCurve>,
    pub auc: Option<f64>,
}

/// Stateless metric computation
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        model: &dyn Classifier,
        x_test: &Array2<f64>,
        y_test: &Array1<f64>,
    ) -> Result<EvaluationRecord, ModelError> {
        if x_test.nrows() != y_test.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x_test.nrows(),
                got: y_test.len(),
            });
        }

        let predictions = model.predict(x_test)?;
        let confusion_matrix = ConfusionMatrix::from_predictions(y_test, &predictions);
        let report = ClassificationReport::from_confusion(&confusion_matrix);

        let roc = match model.capability() {
            Capability::Probabilistic => {
                let scores = model.predict_proba(x_test)?;
                let roc = RocCurve::compute(y_test, &scores);
                if roc.is_none() {
                    warn!(
                        model = model.name(),
                        "Single-class test labels or non-finite scores; ROC curve omitted"
                    );
                }
                roc
            }
            Capability::DiscreteOnly => None,
        };

        Ok(EvaluationRecord {
            model_name: model.name().to_string(),
            accuracy: report.accuracy,
            f1: report.class(Label::Fake).f1,
            auc: roc.as_ref().map(RocCurve::auc),
            roc,
            report,
            confusion_matrix,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LogisticConfig, LogisticRegression};
    use ndarray::array;

    struct Constant(f64);

    impl Classifier for Constant {
        fn name(&self) -> &str {
            "Constant"
        }

        fn capability(&self) -> Capability {
            Capability::DiscreteOnly
        }

        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
            Ok(Array1::from_elem(x.nrows(), self.0))
        }
    }

    struct Diverged;

    impl Classifier for Diverged {
        fn name(&self) -> &str {
            "Diverged"
        }

        fn capability(&self) -> Capability {
            Capability::Probabilistic
        }

        fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
            Ok(Array1::zeros(x.nrows()))
        }

        fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
            Ok(Array1::from_elem(x.nrows(), f64::NAN))
        }
    }

    fn fitted_logistic() -> LogisticRegression {
        let x = array![[0.0], [0.1], [0.9], [1.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];
        let mut lr = LogisticRegression::new(LogisticConfig::default());
        lr.fit(&x, &y).unwrap();
        lr
    }

    #[test]
    fn test_probabilistic_model_gets_roc() {
        let lr = fitted_logistic();
        let x = array![[0.0], [0.2], [0.8], [1.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let record = Evaluator::new().evaluate(&lr, &x, &y).unwrap();
        assert_eq!(record.model_name, "LogisticRegression");
        assert!(record.roc.is_some());
        assert!((record.auc.unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_discrete_model_has_no_roc() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![0.0, 1.0, 1.0];

        let record = Evaluator::new().evaluate(&Constant(1.0), &x, &y).unwrap();
        assert!(record.roc.is_none());
        assert!(record.auc.is_none());
        assert!((record.accuracy - 2.0 / 3.0).abs() < 1e-10);
        assert!((record.f1 - 0.8).abs() < 1e-10);
    }

    #[test]
    fn test_single_class_test_set_omits_roc() {
        let lr = fitted_logistic();
        let x = array![[0.9], [1.0]];
        let y = array![1.0, 1.0];

        let record = Evaluator::new().evaluate(&lr, &x, &y).unwrap();
        assert!(record.roc.is_none());
        assert_eq!(record.confusion_matrix.support(Label::Fake), 2);
    }

    #[test]
    fn test_nan_scores_omit_roc() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 1.0];

        let record = Evaluator::new().evaluate(&Diverged, &x, &y).unwrap();
        assert!(record.roc.is_none());
        assert!(record.auc.is_none());
        assert_eq!(record.accuracy, 0.5);
    }

    #[test]
    fn test_repeatable() {
        let lr = fitted_logistic();
        let x = array![[0.3], [0.6], [0.95]];
        let y = array![0.0, 1.0, 1.0];

        let evaluator = Evaluator::new();
        assert_eq!(
            evaluator.evaluate(&lr, &x, &y).unwrap(),
            evaluator.evaluate(&lr, &x, &y).unwrap()
        );
    }
}
