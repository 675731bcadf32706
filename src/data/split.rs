//! Stratified train/test split

use super::{DataError, Label};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitIndices {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Train/test split of a feature matrix and its targets
#[derive(Debug, Clone)]
pub struct Split {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_test: Array2<f64>,
    pub y_test: Array1<f64>,
}

/// Seeded stratified splitter
#[derive(Debug, Clone, Copy)]
pub struct StratifiedSplit {
    test_fraction: f64,
    seed: u64,
}

impl StratifiedSplit {
    pub fn new(test_fraction: f64, seed: u64) -> Result<Self, DataError> {
        if !(test_fraction > 0.0 && test_fraction < 1.0) {
            return Err(DataError::InvalidFraction(test_fraction));
        }
        Ok(Self { test_fraction, seed })
    }

    /// Partition row indices so each class keeps its share in both halves
    pub fn split_indices(&self, labels: &[Label]) -> Result<SplitIndices, DataError> {
        let n = labels.len();

        let mut by_class: [Vec<usize>; 2] = [Vec::new(), Vec::new()];
        for (i, label) in labels.iter().enumerate() {
            by_class[label.index()].push(i);
        }

        for label in Label::ALL {
            let count = by_class[label.index()].len();
            if count < 2 {
                return Err(DataError::InsufficientClassMembers {
                    label,
                    count,
                    required: 2,
                });
            }
        }

        let n_test = (self.test_fraction * n as f64).ceil() as usize;
        let n_train = n - n_test;
        if n_test < Label::ALL.len() || n_train < Label::ALL.len() {
            return Err(DataError::SplitTooSmall { n_samples: n });
        }

        let counts = [by_class[0].len(), by_class[1].len()];
        let allocation = allocate(n_test, &counts);

        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut train = Vec::with_capacity(n_train);
        let mut test = Vec::with_capacity(n_test);

        for (class_indices, &n_class_test) in by_class.iter_mut().zip(allocation.iter()) {
            class_indices.shuffle(&mut rng);
            let (class_test, class_train) = class_indices.split_at(n_class_test);
            test.extend_from_slice(class_test);
            train.extend_from_slice(class_train);
        }

        train.shuffle(&mut rng);
        test.shuffle(&mut rng);

        Ok(SplitIndices { train, test })
    }

    /// Split a feature matrix and 0/1 targets
    pub fn split(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<Split, DataError> {
        if x.nrows() != y.len() {
            return Err(DataError::DimensionMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }

        let labels: Vec<Label> = y.iter().map(|&v| Label::from_target(v)).collect();
        let indices = self.split_indices(&labels)?;

        Ok(Split {
            x_train: x.select(Axis(0), &indices.train),
            y_train: indices.train.iter().map(|&i| y[i]).collect(),
            x_test: x.select(Axis(0), &indices.test),
            y_test: indices.test.iter().map(|&i| y[i]).collect(),
        })
    }
}

/// Proportional allocation of `total` slots over classes
///
/// Floors each quota, then hands the leftover slots out by largest
/// fractional part; ties go to the larger class, then the earlier one.
fn allocate(total: usize, counts: &[usize; 2]) -> [usize; 2] {
    let n: usize = counts.iter().sum();
    let quotas: Vec<f64> = counts
        .iter()
        .map(|&c| total as f64 * c as f64 / n as f64)
        .collect();

    let mut allocation = [quotas[0].floor() as usize, quotas[1].floor() as usize];
    let mut remaining = total - allocation.iter().sum::<usize>();

    let mut order: Vec<usize> = (0..counts.len()).collect();
    order.sort_by(|&a, &b| {
        let frac_a = quotas[a] - quotas[a].floor();
        let frac_b = quotas[b] - quotas[b].floor();
        frac_b
            .partial_cmp(&frac_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(counts[b].cmp(&counts[a]))
            .then(a.cmp(&b))
    });

    for &class in order.iter().cycle() {
        if remaining == 0 {
            break;
        }
        if allocation[class] < counts[class] {
            allocation[class] += 1;
            remaining -= 1;
        }
    }

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(n_real: usize, n_fake: usize) -> Vec<Label> {
        let mut labels = vec![Label::Real; n_real];
        labels.extend(vec![Label::Fake; n_fake]);
        labels
    }

    #[test]
    fn test_partition_sizes() {
        let splitter = StratifiedSplit::new(0.2, 42).unwrap();
        let labels = labels(60, 40);
        let split = splitter.split_indices(&labels).unwrap();

        assert_eq!(split.train.len() + split.test.len(), 100);
        assert_eq!(split.test.len(), 20);

        let fake_test = split.test.iter().filter(|&&i| labels[i] == Label::Fake).count();
        assert_eq!(fake_test, 8);
    }

    #[test]
    fn test_partitions_disjoint_and_complete() {
        let splitter = StratifiedSplit::new(0.25, 7).unwrap();
        let labels = labels(13, 9);
        let split = splitter.split_indices(&labels).unwrap();

        let mut all: Vec<usize> = split.train.iter().chain(split.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..22).collect::<Vec<_>>());
    }

    #[test]
    fn test_proportions_within_tolerance() {
        let splitter = StratifiedSplit::new(0.2, 3).unwrap();
        let labels = labels(37, 18);
        let split = splitter.split_indices(&labels).unwrap();

        let expected_fake = split.test.len() as f64 * 18.0 / 55.0;
        let fake_test = split.test.iter().filter(|&&i| labels[i] == Label::Fake).count() as f64;
        assert!((fake_test - expected_fake).abs() <= 1.0);
    }

    #[test]
    fn test_deterministic_for_seed() {
        let labels = labels(30, 30);
        let a = StratifiedSplit::new(0.2, 11).unwrap().split_indices(&labels).unwrap();
        let b = StratifiedSplit::new(0.2, 11).unwrap().split_indices(&labels).unwrap();
        let c = StratifiedSplit::new(0.2, 12).unwrap().split_indices(&labels).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_single_member_class_rejected() {
        let splitter = StratifiedSplit::new(0.2, 42).unwrap();
        let result = splitter.split_indices(&labels(10, 1));

        assert!(matches!(
            result,
            Err(DataError::InsufficientClassMembers { label: Label::Fake, count: 1, .. })
        ));
    }

    #[test]
    fn test_invalid_fraction() {
        assert!(StratifiedSplit::new(0.0, 1).is_err());
        assert!(StratifiedSplit::new(1.5, 1).is_err());
    }

    #[test]
    fn test_split_arrays() {
        let x = Array2::from_shape_fn((20, 3), |(i, j)| (i * 3 + j) as f64);
        let y: Array1<f64> = (0..20).map(|i| if i % 2 == 0 { 1.0 } else { 0.0 }).collect();

        let split = StratifiedSplit::new(0.2, 42).unwrap().split(&x, &y).unwrap();

        assert_eq!(split.x_train.nrows(), 16);
        assert_eq!(split.x_test.nrows(), 4);
        assert_eq!(split.x_test.ncols(), 3);
        assert_eq!(split.y_test.sum(), 2.0);

        for (row, &target) in split.x_test.rows().into_iter().zip(split.y_test.iter()) {
            let original = (row[0] / 3.0) as usize;
            assert_eq!(y[original], target);
        }
    }

    #[test]
    fn test_allocate() {
        assert_eq!(allocate(20, &[60, 40]), [12, 8]);
        assert_eq!(allocate(3, &[5, 5]), [2, 1]);
        assert_eq!(allocate(11, &[37, 18]).iter().sum::<usize>(), 11);
    }
}
