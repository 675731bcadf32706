//! Random Forest classifier
//!
//! Bagged Gini trees with random feature subsets. Probabilities are the
//! mean of the leaf positive fractions across trees.

use super::decision_tree::{DecisionTree, TreeConfig};
use super::{check_training_data, Capability, Classifier, ModelError};
use ndarray::{Array1, Array2};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Random Forest configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the forest
    pub n_trees: usize,
    /// Maximum depth of each tree (None = unbounded)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features tried per split (ceil of sqrt of total if None)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Random seed
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            seed: 42,
        }
    }
}

/// Random Forest model
#[derive(Debug, Clone)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl RandomForest {
    /// Create a new random forest
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    /// Train the random forest
    ///
    /// Tree `i` draws its bootstrap sample and feature subsets from
    /// `seed + i`, so the fitted forest depends only on the data and config.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        if !self.trees.is_empty() {
            return Err(ModelError::AlreadyFitted);
        }
        check_training_data(x, y)?;
        if self.config.n_trees == 0 {
            return Err(ModelError::InvalidParameter("n_trees must be at least 1".to_string()));
        }
        if self.config.max_depth == Some(0) {
            return Err(ModelError::InvalidParameter("max_depth must be at least 1".to_string()));
        }

        let n_samples = x.nrows();
        let n_features = x.ncols();
        let max_features = self
            .config
            .max_features
            .unwrap_or_else(|| (n_features as f64).sqrt().ceil() as usize)
            .max(1);

        let mut trees = Vec::with_capacity(self.config.n_trees);
        for i in 0..self.config.n_trees {
            let tree_seed = self.config.seed.wrapping_add(i as u64);
            let tree_config = TreeConfig {
                max_depth: self.config.max_depth,
                min_samples_split: self.config.min_samples_split,
                min_samples_leaf: self.config.min_samples_leaf,
                max_features: Some(max_features),
                seed: tree_seed,
            };

            let indices = if self.config.bootstrap {
                bootstrap_indices(n_samples, tree_seed)
            } else {
                (0..n_samples).collect()
            };

            let mut tree = DecisionTree::new(tree_config);
            tree.fit(x.view(), y.view(), &indices)?;
            trees.push(tree);
        }

        debug!(
            n_trees = trees.len(),
            max_depth = ?self.config.max_depth,
            mean_leaves = trees.iter().map(|t| t.n_leaves()).sum::<usize>() as f64 / trees.len() as f64,
            "Fitted random forest"
        );

        self.trees = trees;
        self.n_features = n_features;
        Ok(())
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Sample `n` row indices with replacement
fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    // Separate stream from the tree's own feature sampling
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(1);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}

impl Classifier for RandomForest {
    fn name(&self) -> &str {
        "RandomForest"
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        if x.ncols() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                got: x.ncols(),
            });
        }

        let n_trees = self.trees.len() as f64;
        let mut proba = Array1::<f64>::zeros(x.nrows());
        for (row, p) in x.rows().into_iter().zip(proba.iter_mut()) {
            let mut sum = 0.0;
            for tree in &self.trees {
                sum += tree.predict_proba_one(row)?;
            }
            *p = sum / n_trees;
        }
        Ok(proba)
    }
}
