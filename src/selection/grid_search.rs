//! Exhaustive grid search for the random forest
//!
//! Candidates are scored by mean F1 (fake as positive) over stratified
//! folds of the training partition. Fold evaluations run on the rayon
//! pool but are gathered in enumeration order.

use super::cross_validation::{CVScores, StratifiedKFold};
use super::SelectionError;
use crate::data::Label;
use crate::metrics::f1_score;
use crate::models::{Classifier, ForestConfig, RandomForest};
use ndarray::{Array1, Array2, Axis};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Random forest hyperparameter grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParamGrid {
    pub n_trees: Vec<usize>,
    /// `None` grows trees until their leaves are pure
    #[serde(with = "depth_list")]
    pub max_depth: Vec<Option<usize>>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_trees: vec![100, 200],
            max_depth: vec![None, Some(10), Some(20)],
        }
    }
}

impl ParamGrid {
    pub fn len(&self) -> usize {
        self.n_trees.len() * self.max_depth.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Candidates with `max_depth` as the outer loop and `n_trees` inner
    pub fn candidates(&self) -> Vec<ForestParams> {
        self.max_depth
            .iter()
            .flat_map(|&max_depth| {
                self.n_trees
                    .iter()
                    .map(move |&n_trees| ForestParams { n_trees, max_depth })
            })
            .collect()
    }
}

/// Depth lists accept integers, `"none"`/`"unbounded"` or `null`
mod depth_list {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Depth {
        Limit(usize),
        Keyword(String),
        Null(()),
    }

    pub fn serialize<S: Serializer>(depths: &[Option<usize>], serializer: S) -> Result<S::Ok, S::Error> {
        depths
            .iter()
            .map(|d| match d {
                Some(limit) => Depth::Limit(*limit),
                None => Depth::Keyword("none".to_string()),
            })
            .collect::<Vec<_>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Option<usize>>, D::Error> {
        Vec::<Depth>::deserialize(deserializer)?
            .into_iter()
            .map(|d| match d {
                Depth::Limit(limit) => Ok(Some(limit)),
                Depth::Null(()) => Ok(None),
                Depth::Keyword(k) if k.eq_ignore_ascii_case("none") || k.eq_ignore_ascii_case("unbounded") => Ok(None),
                Depth::Keyword(k) => Err(D::Error::custom(format!("invalid max_depth entry: {:?}", k))),
            })
            .collect()
    }
}

/// One point of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_depth: Option<usize>,
}

impl ForestParams {
    pub fn forest_config(&self, seed: u64) -> ForestConfig {
        ForestConfig {
            n_trees: self.n_trees,
            max_depth: self.max_depth,
            seed,
            ..Default::default()
        }
    }
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max_depth {
            Some(d) => write!(f, "n_trees={}, max_depth={}", self.n_trees, d),
            None => write!(f, "n_trees={}, max_depth=None", self.n_trees),
        }
    }
}

/// Cross-validated score of one candidate
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub scores: CVScores,
}

/// Outcome of a grid search
#[derive(Debug, Clone)]
pub struct GridSearchResult {
    pub best_params: ForestParams,
    pub best_score: f64,
    /// Every candidate in enumeration order
    pub candidates: Vec<CandidateScore>,
    /// Best configuration refit on all training rows
    pub best_model: RandomForest,
}

/// Grid search over [`ParamGrid`] with stratified k-fold scoring
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    n_folds: usize,
    seed: u64,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, n_folds: usize, seed: u64) -> Self {
        Self { grid, n_folds, seed }
    }

    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    pub fn fit(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<GridSearchResult, SelectionError> {
        if self.grid.is_empty() {
            return Err(SelectionError::EmptyGrid);
        }
        if x.nrows() != y.len() {
            return Err(SelectionError::DimensionMismatch {
                rows: x.nrows(),
                labels: y.len(),
            });
        }

        let labels: Vec<Label> = y.iter().map(|&t| Label::from_target(t)).collect();
        let folds = StratifiedKFold::new(self.n_folds)?.split(&labels)?;
        let candidates = self.grid.candidates();

        info!(
            candidates = candidates.len(),
            folds = folds.len(),
            rows = x.nrows(),
            "Starting grid search"
        );

        let tasks: Vec<(usize, usize)> = (0..candidates.len())
            .flat_map(|c| (0..folds.len()).map(move |f| (c, f)))
            .collect();

        let fold_scores = tasks
            .par_iter()
            .map(|&(c, f)| -> Result<f64, SelectionError> {
                let split = &folds[f];
                let x_train = x.select(Axis(0), &split.train_indices);
                let y_train = y.select(Axis(0), &split.train_indices);
                let x_val = x.select(Axis(0), &split.test_indices);
                let y_val = y.select(Axis(0), &split.test_indices);

                let mut forest = RandomForest::new(candidates[c].forest_config(self.seed));
                forest.fit(&x_train, &y_train)?;
                let predictions = forest.predict(&x_val)?;
                Ok(f1_score(&y_val, &predictions))
            })
            .collect::<Result<Vec<f64>, SelectionError>>()?;

        let scored: Vec<CandidateScore> = candidates
            .iter()
            .zip(fold_scores.chunks(folds.len()))
            .map(|(&params, chunk)| CandidateScore {
                params,
                scores: CVScores::from_scores(chunk.to_vec()),
            })
            .collect();

        let mut best = 0;
        for (i, candidate) in scored.iter().enumerate() {
            debug!(params = %candidate.params, cv = %candidate.scores.summary(), "Scored candidate");
            if candidate.scores.mean > scored[best].scores.mean {
                best = i;
            }
        }

        let best_params = scored[best].params;
        let best_score = scored[best].scores.mean;
        info!(params = %best_params, f1 = best_score, "Selected best candidate");

        let mut best_model = RandomForest::new(best_params.forest_config(self.seed));
        best_model.fit(x, y)?;

        Ok(GridSearchResult {
            best_params,
            best_score,
            candidates: scored,
            best_model,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn data() -> (Array2<f64>, Array1<f64>) {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 36;
        let mut x = Array2::<f64>::zeros((n, 2));
        let mut y = Array1::<f64>::zeros(n);
        for i in 0..n {
            let fake = i % 3 == 0;
            let center = if fake { 1.5 } else { -1.5 };
            x[[i, 0]] = center + rng.gen_range(-1.0..1.0);
            x[[i, 1]] = rng.gen_range(-1.0..1.0);
            y[i] = if fake { 1.0 } else { 0.0 };
        }
        (x, y)
    }

    fn small_grid() -> ParamGrid {
        ParamGrid {
            n_trees: vec![3, 5],
            max_depth: vec![None, Some(2)],
        }
    }

    #[test]
    fn test_candidate_order() {
        let candidates = ParamGrid::default().candidates();
        assert_eq!(candidates.len(), 6);
        assert_eq!(candidates[0], ForestParams { n_trees: 100, max_depth: None });
        assert_eq!(candidates[1], ForestParams { n_trees: 200, max_depth: None });
        assert_eq!(candidates[2], ForestParams { n_trees: 100, max_depth: Some(10) });
        assert_eq!(candidates[5], ForestParams { n_trees: 200, max_depth: Some(20) });
    }

    #[test]
    fn test_grid_search_selects_best_mean() {
        let (x, y) = data();
        let result = GridSearch::new(small_grid(), 3, 42).fit(&x, &y).unwrap();

        assert_eq!(result.candidates.len(), 4);
        assert!(result.candidates.iter().all(|c| c.scores.scores.len() == 3));

        let max_mean = result
            .candidates
            .iter()
            .map(|c| c.scores.mean)
            .fold(f64::NEG_INFINITY, f64::max);
        let first_best = result
            .candidates
            .iter()
            .find(|c| c.scores.mean == max_mean)
            .unwrap();

        assert_eq!(result.best_params, first_best.params);
        assert_eq!(result.best_score, max_mean);
        assert_eq!(result.best_model.n_trees(), result.best_params.n_trees);
    }

    #[test]
    fn test_grid_search_deterministic() {
        let (x, y) = data();
        let search = GridSearch::new(small_grid(), 3, 7);
        let a = search.fit(&x, &y).unwrap();
        let b = search.fit(&x, &y).unwrap();

        assert_eq!(a.best_params, b.best_params);
        let a_scores: Vec<f64> = a.candidates.iter().map(|c| c.scores.mean).collect();
        let b_scores: Vec<f64> = b.candidates.iter().map(|c| c.scores.mean).collect();
        assert_eq!(a_scores, b_scores);
    }

    #[test]
    fn test_errors() {
        let (x, y) = data();
        let empty = ParamGrid {
            n_trees: vec![],
            max_depth: vec![None],
        };
        assert!(matches!(
            GridSearch::new(empty, 3, 1).fit(&x, &y),
            Err(SelectionError::EmptyGrid)
        ));
        assert!(matches!(
            GridSearch::new(small_grid(), 1, 1).fit(&x, &y),
            Err(SelectionError::InvalidFolds(1))
        ));

        let tiny_x = x.slice(ndarray::s![..2, ..]).to_owned();
        let tiny_y = y.slice(ndarray::s![..2]).to_owned();
        assert!(matches!(
            GridSearch::new(small_grid(), 3, 1).fit(&tiny_x, &tiny_y),
            Err(SelectionError::TooFewSamples { .. })
        ));
    }

    #[test]
    fn test_depth_serde() {
        let grid: ParamGrid = serde_json::from_str(r#"{"max_depth": [null, "none", 4]}"#).unwrap();
        assert_eq!(grid.max_depth, vec![None, None, Some(4)]);
        assert_eq!(grid.n_trees, vec![100, 200]);

        let json = serde_json::to_string(&grid).unwrap();
        assert!(json.contains(r#""none""#));

        assert!(serde_json::from_str::<ParamGrid>(r#"{"max_depth": ["deep"]}"#).is_err());
    }
}
