//! ROC curve and area under it

use ndarray::Array1;
use serde::Serialize;

/// ROC curve points ordered by decreasing threshold
///
/// The first point is always `(0, 0)` at threshold `+inf`. Samples with
/// tied scores enter the curve together as one point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RocCurve {
    pub fpr: Vec<f64>,
    pub tpr: Vec<f64>,
    pub thresholds: Vec<f64>,
}

impl RocCurve {
    /// Build from true targets and positive-class scores
    ///
    /// Returns `None` when `y_true` holds a single class, since one of the
    /// rates is then undefined, or when any score is not finite.
    pub fn compute(y_true: &Array1<f64>, scores: &Array1<f64>) -> Option<Self> {
        let mut pairs: Vec<(f64, bool)> = scores
            .iter()
            .zip(y_true.iter())
            .map(|(&s, &t)| (s, t >= 0.5))
            .collect();

        if pairs.iter().any(|(s, _)| !s.is_finite()) {
            return None;
        }

        let n_pos = pairs.iter().filter(|(_, t)| *t).count() as f64;
        let n_neg = pairs.len() as f64 - n_pos;
        if n_pos == 0.0 || n_neg == 0.0 {
            return None;
        }

        pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

        let mut fpr = vec![0.0];
        let mut tpr = vec![0.0];
        let mut thresholds = vec![f64::INFINITY];

        let mut tp = 0.0;
        let mut fp = 0.0;
        let mut i = 0;
        while i < pairs.len() {
            let score = pairs[i].0;
            while i < pairs.len() && pairs[i].0.total_cmp(&score).is_eq() {
                if pairs[i].1 {
                    tp += 1.0;
                } else {
                    fp += 1.0;
                }
                i += 1;
            }

            fpr.push(fp / n_neg);
            tpr.push(tp / n_pos);
            thresholds.push(score);
        }

        Some(Self { fpr, tpr, thresholds })
    }

    pub fn len(&self) -> usize {
        self.fpr.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fpr.is_empty()
    }

    /// Trapezoidal area under the curve
    pub fn auc(&self) -> f64 {
        self.fpr
            .windows(2)
            .zip(self.tpr.windows(2))
            .map(|(f, t)| (f[1] - f[0]) * (t[1] + t[0]) / 2.0)
            .sum()
    }
}
