//! Hard-voting ensemble over the baseline and the tuned forest

use super::{Capability, Classifier, LogisticRegression, ModelError, RandomForest};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Which constituent decides when the votes split evenly
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    #[default]
    PreferTuned,
    PreferBaseline,
}

/// Majority vote over fitted constituents
///
/// Constituents are shared, never refit. The ensemble exposes no
/// probabilities, so its capability is [`Capability::DiscreteOnly`].
#[derive(Debug, Clone)]
pub struct VotingClassifier {
    baseline: Arc<LogisticRegression>,
    tuned: Arc<RandomForest>,
    tie_break: TieBreak,
}

impl VotingClassifier {
    pub fn new(baseline: Arc<LogisticRegression>, tuned: Arc<RandomForest>) -> Self {
        Self {
            baseline,
            tuned,
            tie_break: TieBreak::default(),
        }
    }

    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    pub fn baseline(&self) -> &Arc<LogisticRegression> {
        &self.baseline
    }

    pub fn tuned(&self) -> &Arc<RandomForest> {
        &self.tuned
    }

    /// Voters in precedence order
    fn voters(&self) -> [&dyn Classifier; 2] {
        match self.tie_break {
            TieBreak::PreferTuned => [&*self.tuned as &dyn Classifier, &*self.baseline],
            TieBreak::PreferBaseline => [&*self.baseline as &dyn Classifier, &*self.tuned],
        }
    }
}

impl Classifier for VotingClassifier {
    fn name(&self) -> &str {
        "VotingClassifier"
    }

    fn capability(&self) -> Capability {
        Capability::DiscreteOnly
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let votes = self
            .voters()
            .iter()
            .map(|voter| voter.predict(x))
            .collect::<Result<Vec<_>, _>>()?;

        let n_voters = votes.len();
        let decided = Array1::from_shape_fn(x.nrows(), |i| {
            let fake_votes = votes.iter().filter(|v| v[i] >= 0.5).count();
            let real_votes = n_voters - fake_votes;
            if fake_votes > real_votes {
                1.0
            } else if real_votes > fake_votes {
                0.0
            } else {
                votes[0][i]
            }
        });
        Ok(decided)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ForestConfig, LogisticConfig};
    use ndarray::array;

    fn fitted() -> (Arc<LogisticRegression>, Arc<RandomForest>) {
        let x = array![[0.0, 1.0], [0.0, 1.0], [1.0, 0.0], [1.0, 0.0]];
        let y = array![0.0, 0.0, 1.0, 1.0];

        let mut lr = LogisticRegression::new(LogisticConfig::default());
        lr.fit(&x, &y).unwrap();

        let mut rf = RandomForest::new(ForestConfig {
            n_trees: 5,
            bootstrap: false,
            max_features: Some(2),
            ..Default::default()
        });
        rf.fit(&x, &y).unwrap();

        (Arc::new(lr), Arc::new(rf))
    }

    #[test]
    fn test_agreement_passes_through() {
        let (lr, rf) = fitted();
        let x = array![[0.0, 1.0], [1.0, 0.0]];
        let voting = VotingClassifier::new(lr, rf);

        assert_eq!(voting.predict(&x).unwrap(), array![0.0, 1.0]);
        assert_eq!(voting.capability(), Capability::DiscreteOnly);
        assert!(!voting.supports_probability());
        assert!(matches!(
            voting.predict_proba(&x),
            Err(ModelError::ProbabilityUnsupported(_))
        ));
    }

    #[test]
    fn test_tie_break_follows_precedence() {
        let (lr, rf) = fitted();
        let x = array![[1.0, 1.0], [0.0, 0.0], [0.0, 1.0]];

        let lr_pred = lr.predict(&x).unwrap();
        let rf_pred = rf.predict(&x).unwrap();

        let prefer_tuned = VotingClassifier::new(lr.clone(), rf.clone());
        let prefer_baseline = VotingClassifier::new(lr, rf).with_tie_break(TieBreak::PreferBaseline);

        assert_eq!(prefer_tuned.predict(&x).unwrap(), rf_pred);
        assert_eq!(prefer_baseline.predict(&x).unwrap(), lr_pred);
    }

    #[test]
    fn test_constituents_are_shared() {
        let (lr, rf) = fitted();
        let voting = VotingClassifier::new(lr.clone(), rf.clone());

        assert!(Arc::ptr_eq(voting.baseline(), &lr));
        assert!(Arc::ptr_eq(voting.tuned(), &rf));
    }
}
