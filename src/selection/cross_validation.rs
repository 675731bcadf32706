//! Stratified k-fold cross-validation

use super::SelectionError;
use crate::data::Label;
use serde::Serialize;
use tracing::warn;

/// Cross-validation split
#[derive(Debug, Clone, PartialEq)]
pub struct CVSplit {
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// Deterministic stratified k-fold (no shuffling)
///
/// Each class is cut into contiguous chunks in original row order. Chunk
/// sizes come from dealing the label-sorted rows round-robin over the
/// folds, so fold sizes differ by at most one and class proportions stay
/// as even as the counts allow.
#[derive(Debug, Clone, Copy)]
pub struct StratifiedKFold {
    n_folds: usize,
}

impl StratifiedKFold {
    pub fn new(n_folds: usize) -> Result<Self, SelectionError> {
        if n_folds < 2 {
            return Err(SelectionError::InvalidFolds(n_folds));
        }
        Ok(Self { n_folds })
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    pub fn split(&self, labels: &[Label]) -> Result<Vec<CVSplit>, SelectionError> {
        let k = self.n_folds;
        let n_samples = labels.len();
        if n_samples < k {
            return Err(SelectionError::TooFewSamples {
                n_samples,
                n_folds: k,
            });
        }

        let by_class: Vec<Vec<usize>> = Label::ALL
            .iter()
            .map(|&label| (0..n_samples).filter(|&i| labels[i] == label).collect())
            .collect();

        for (label, members) in Label::ALL.iter().zip(&by_class) {
            if !members.is_empty() && members.len() < k {
                warn!(
                    label = %label,
                    members = members.len(),
                    folds = k,
                    "Class has fewer members than folds"
                );
            }
        }

        // allocation[fold][class] from dealing label-sorted positions round-robin
        let mut allocation = vec![[0usize; 2]; k];
        let mut position = 0;
        for (class, members) in by_class.iter().enumerate() {
            for _ in 0..members.len() {
                allocation[position % k][class] += 1;
                position += 1;
            }
        }

        let mut fold_of = vec![0usize; n_samples];
        for (class, members) in by_class.iter().enumerate() {
            let mut cursor = 0;
            for (fold, counts) in allocation.iter().enumerate() {
                for &idx in &members[cursor..cursor + counts[class]] {
                    fold_of[idx] = fold;
                }
                cursor += counts[class];
            }
        }

        Ok((0..k)
            .map(|fold| {
                let (test_indices, train_indices): (Vec<usize>, Vec<usize>) =
                    (0..n_samples).partition(|&i| fold_of[i] == fold);
                CVSplit {
                    train_indices,
                    test_indices,
                }
            })
            .collect())
    }
}

/// Summary of per-fold scores
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CVScores {
    pub scores: Vec<f64>,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub max: f64,
}

impl CVScores {
    /// Calculate summary statistics from scores
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let variance = scores.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
        let min = scores.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

        Self {
            scores,
            mean,
            std: variance.sqrt(),
            min,
            max,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "mean={:.4} (+/- {:.4}), min={:.4}, max={:.4}",
            self.mean,
            self.std * 2.0,
            self.min,
            self.max
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn labels(real: usize, fake: usize) -> Vec<Label> {
        // Interleave so class order differs from row order
        let mut out = Vec::new();
        let (mut r, mut f) = (real, fake);
        while r > 0 || f > 0 {
            if r > 0 {
                out.push(Label::Real);
                r -= 1;
            }
            if f > 0 {
                out.push(Label::Fake);
                f -= 1;
            }
        }
        out
    }

    #[test]
    fn test_folds_partition_rows() {
        let y = labels(10, 8);
        let splits = StratifiedKFold::new(3).unwrap().split(&y).unwrap();
        assert_eq!(splits.len(), 3);

        let mut seen = HashSet::new();
        for split in &splits {
            assert_eq!(split.train_indices.len() + split.test_indices.len(), y.len());
            for &i in &split.test_indices {
                assert!(seen.insert(i), "row {} tested twice", i);
                assert!(!split.train_indices.contains(&i));
            }
        }
        assert_eq!(seen.len(), y.len());
    }

    #[test]
    fn test_class_balance_per_fold() {
        let y = labels(9, 6);
        let splits = StratifiedKFold::new(3).unwrap().split(&y).unwrap();

        for split in &splits {
            let fake = split.test_indices.iter().filter(|&&i| y[i] == Label::Fake).count();
            let real = split.test_indices.len() - fake;
            assert_eq!(real, 3);
            assert_eq!(fake, 2);
        }
    }

    #[test]
    fn test_fold_sizes_differ_by_at_most_one() {
        let y = labels(1, 3);
        let splits = StratifiedKFold::new(3).unwrap().split(&y).unwrap();
        let sizes: Vec<usize> = splits.iter().map(|s| s.test_indices.len()).collect();

        assert!(sizes.iter().all(|&s| s >= 1));
        assert!(sizes.iter().max().unwrap() - sizes.iter().min().unwrap() <= 1);
    }

    #[test]
    fn test_deterministic() {
        let y = labels(7, 5);
        let cv = StratifiedKFold::new(3).unwrap();
        assert_eq!(cv.split(&y).unwrap(), cv.split(&y).unwrap());
    }

    #[test]
    fn test_errors() {
        assert!(matches!(StratifiedKFold::new(1), Err(SelectionError::InvalidFolds(1))));
        let cv = StratifiedKFold::new(3).unwrap();
        assert!(matches!(
            cv.split(&labels(1, 1)),
            Err(SelectionError::TooFewSamples { n_samples: 2, n_folds: 3 })
        ));
    }

    #[test]
    fn test_cv_scores() {
        let scores = CVScores::from_scores(vec![0.5, 0.7, 0.9]);
        assert!((scores.mean - 0.7).abs() < 1e-10);
        assert_eq!(scores.min, 0.5);
        assert_eq!(scores.max, 0.9);
        assert!(scores.std > 0.0);
    }
}
