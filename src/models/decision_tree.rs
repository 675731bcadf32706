//! Binary classification tree (CART, Gini impurity)
//!
//! Nodes live in a flat arena and the tree is grown with an explicit work
//! stack, so unbounded depth cannot overflow the call stack.

use super::ModelError;
use ndarray::{ArrayView1, ArrayView2};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Maximum depth of tree (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for reproducibility
    pub seed: u64,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

/// Tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    /// Feature index for split
    pub feature_idx: Option<usize>,
    /// Samples with `x[feature] <= threshold` go left
    pub threshold: Option<f64>,
    /// Fraction of positive samples reaching this node
    pub value: f64,
    /// Number of samples in this node
    pub n_samples: usize,
    /// Arena index of the left child
    pub left: Option<usize>,
    /// Arena index of the right child
    pub right: Option<usize>,
    /// Gini impurity at this node
    pub impurity: f64,
}

impl TreeNode {
    fn leaf(value: f64, n_samples: usize, impurity: f64) -> Self {
        Self {
            feature_idx: None,
            threshold: None,
            value,
            n_samples,
            left: None,
            right: None,
            impurity,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    gain: f64,
}

/// Decision Tree model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    config: TreeConfig,
    nodes: Vec<TreeNode>,
    n_features: usize,
}

impl DecisionTree {
    /// Create a new decision tree with config
    pub fn new(config: TreeConfig) -> Self {
        Self {
            config,
            nodes: Vec::new(),
            n_features: 0,
        }
    }

    /// Fit on the rows of `x` named by `sample_indices`
    ///
    /// Indices may repeat, which is how bootstrap samples are passed in
    /// without copying rows. Targets are `0.0` or `1.0`.
    pub fn fit(&mut self, x: ArrayView2<f64>, y: ArrayView1<f64>, sample_indices: &[usize]) -> Result<(), ModelError> {
        if !self.nodes.is_empty() {
            return Err(ModelError::AlreadyFitted);
        }
        if sample_indices.is_empty() {
            return Err(ModelError::EmptyTrainingData);
        }
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }

        self.n_features = x.ncols();
        let mut rng = ChaCha8Rng::seed_from_u64(self.config.seed);

        let root_indices = sample_indices.to_vec();
        let root = self.push_leaf(&y, &root_indices);
        let mut stack = vec![(root, root_indices, 0usize)];

        while let Some((node_id, indices, depth)) = stack.pop() {
            let node = &self.nodes[node_id];
            let depth_reached = self.config.max_depth.is_some_and(|d| depth >= d);
            if depth_reached || node.impurity == 0.0 || indices.len() < self.config.min_samples_split {
                continue;
            }

            let Some(split) = self.find_best_split(&x, &y, &indices, &mut rng) else {
                continue;
            };

            let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                .iter()
                .partition(|&&i| x[[i, split.feature]] <= split.threshold);

            let left = self.push_leaf(&y, &left_idx);
            let right = self.push_leaf(&y, &right_idx);

            let node = &mut self.nodes[node_id];
            node.feature_idx = Some(split.feature);
            node.threshold = Some(split.threshold);
            node.left = Some(left);
            node.right = Some(right);

            stack.push((right, right_idx, depth + 1));
            stack.push((left, left_idx, depth + 1));
        }

        Ok(())
    }

    fn push_leaf(&mut self, y: &ArrayView1<f64>, indices: &[usize]) -> usize {
        let n = indices.len();
        let positives = indices.iter().filter(|&&i| y[i] >= 0.5).count();
        let p = if n > 0 { positives as f64 / n as f64 } else { 0.0 };
        self.nodes.push(TreeNode::leaf(p, n, gini(p)));
        self.nodes.len() - 1
    }

    /// Scan each candidate feature in sorted order for the best Gini gain
    ///
    /// A split with zero gain is still taken when it is the best available,
    /// so patterns like XOR can be separated deeper down.
    fn find_best_split(
        &self,
        x: &ArrayView2<f64>,
        y: &ArrayView1<f64>,
        indices: &[usize],
        rng: &mut ChaCha8Rng,
    ) -> Option<BestSplit> {
        let n = indices.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let total_pos = indices.iter().filter(|&&i| y[i] >= 0.5).count();
        let parent_impurity = gini(total_pos as f64 / n as f64);

        let mut features: Vec<usize> = (0..self.n_features).collect();
        features.shuffle(rng);
        let k = self.config.max_features.unwrap_or(self.n_features).clamp(1, self.n_features.max(1));
        features.truncate(k);

        let mut best: Option<BestSplit> = None;
        let mut sorted = indices.to_vec();

        for &feature in &features {
            sorted.sort_unstable_by(|&a, &b| x[[a, feature]].total_cmp(&x[[b, feature]]));

            let mut left_pos = 0usize;
            for pos in 0..n - 1 {
                if y[sorted[pos]] >= 0.5 {
                    left_pos += 1;
                }
                let left_n = pos + 1;
                let right_n = n - left_n;
                if left_n < min_leaf || right_n < min_leaf {
                    continue;
                }

                let current = x[[sorted[pos], feature]];
                let next = x[[sorted[pos + 1], feature]];
                if current >= next {
                    continue;
                }

                let left_gini = gini(left_pos as f64 / left_n as f64);
                let right_gini = gini((total_pos - left_pos) as f64 / right_n as f64);
                let weighted = (left_n as f64 * left_gini + right_n as f64 * right_gini) / n as f64;
                let gain = parent_impurity - weighted;

                if gain > best.as_ref().map_or(f64::NEG_INFINITY, |b| b.gain) {
                    let mut threshold = (current + next) / 2.0;
                    if threshold >= next {
                        threshold = current;
                    }
                    best = Some(BestSplit {
                        feature,
                        threshold,
                        gain,
                    });
                }
            }
        }

        best
    }

    /// Positive-class fraction of the leaf reached by `features`
    pub fn predict_proba_one(&self, features: ArrayView1<f64>) -> Result<f64, ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::NotFitted);
        }
        if features.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                got: features.len(),
            });
        }

        let mut node = &self.nodes[0];
        while let (Some(feature), Some(threshold), Some(left), Some(right)) =
            (node.feature_idx, node.threshold, node.left, node.right)
        {
            node = if features[feature] <= threshold {
                &self.nodes[left]
            } else {
                &self.nodes[right]
            };
        }
        Ok(node.value)
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    /// Depth counted in edges from the root
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            max_depth = max_depth.max(depth);
            if let (Some(l), Some(r)) = (node.left, node.right) {
                stack.push((l, depth + 1));
                stack.push((r, depth + 1));
            }
        }
        max_depth
    }
}

/// Binary Gini impurity from the positive fraction
fn gini(p: f64) -> f64 {
    2.0 * p * (1.0 - p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array1, Array2};

    fn xor_like() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.0],
            [0.0, 1.0],
            [1.0, 0.0],
            [1.0, 1.0],
            [0.1, 0.1],
            [0.1, 0.9],
            [0.9, 0.1],
            [0.9, 0.9],
        ];
        let y = array![0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0];
        (x, y)
    }

    #[test]
    fn test_unbounded_tree_fits_training_data() {
        let (x, y) = xor_like();
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(x.view(), y.view(), &indices).unwrap();

        for (row, &target) in x.rows().into_iter().zip(y.iter()) {
            assert_eq!(tree.predict_proba_one(row).unwrap(), target);
        }
        assert!(tree.n_leaves() >= 4);
    }

    #[test]
    fn test_max_depth_respected() {
        let (x, y) = xor_like();
        let indices: Vec<usize> = (0..x.nrows()).collect();
        let mut tree = DecisionTree::new(TreeConfig {
            max_depth: Some(1),
            ..Default::default()
        });
        tree.fit(x.view(), y.view(), &indices).unwrap();

        assert!(tree.depth() <= 1);
    }

    #[test]
    fn test_pure_node_is_leaf() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 1.0, 1.0];
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(x.view(), y.view(), &[0, 1, 2]).unwrap();

        assert_eq!(tree.nodes().len(), 1);
        assert_eq!(tree.predict_proba_one(array![5.0].view()).unwrap(), 1.0);
    }

    #[test]
    fn test_repeated_indices() {
        let x = array![[0.0], [1.0]];
        let y = array![0.0, 1.0];
        let mut tree = DecisionTree::new(TreeConfig::default());
        tree.fit(x.view(), y.view(), &[0, 0, 0, 1]).unwrap();

        assert_eq!(tree.nodes()[0].n_samples, 4);
        assert_eq!(tree.predict_proba_one(array![0.0].view()).unwrap(), 0.0);
        assert_eq!(tree.predict_proba_one(array![1.0].view()).unwrap(), 1.0);
    }

    #[test]
    fn test_errors() {
        let (x, y) = xor_like();
        let mut tree = DecisionTree::new(TreeConfig::default());
        assert!(matches!(tree.predict_proba_one(x.row(0)), Err(ModelError::NotFitted)));
        assert!(matches!(
            tree.fit(x.view(), y.view(), &[]),
            Err(ModelError::EmptyTrainingData)
        ));

        tree.fit(x.view(), y.view(), &[0, 1, 2, 3]).unwrap();
        assert!(matches!(
            tree.predict_proba_one(array![1.0].view()),
            Err(ModelError::DimensionMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            tree.fit(x.view(), y.view(), &[0, 1]),
            Err(ModelError::AlreadyFitted)
        ));
    }
}
