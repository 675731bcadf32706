//! Model trainer: baseline, tuned forest and voting ensemble

use crate::models::{LogisticConfig, LogisticRegression, Model, RandomForest, TieBreak, VotingClassifier};
use crate::selection::{CandidateScore, ForestParams, GridSearch, GridSearchResult, ParamGrid};
use crate::utils::config::PipelineConfig;
use ndarray::{Array1, Array2};
use std::sync::Arc;
use tracing::info;

use super::PipelineError;

/// Training settings
#[derive(Debug, Clone)]
pub struct Trainer {
    logistic: LogisticConfig,
    grid: ParamGrid,
    cv_folds: usize,
    seed: u64,
    tie_break: TieBreak,
}

impl From<&PipelineConfig> for Trainer {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            logistic: config.logistic.clone(),
            grid: config.rf_param_grid.clone(),
            cv_folds: config.cv_folds,
            seed: config.random_seed,
            tie_break: config.voting_tie_break,
        }
    }
}

impl Trainer {
    /// Fit every model exactly once on the training partition
    pub fn train(&self, x: &Array2<f64>, y: &Array1<f64>) -> Result<TrainedModels, PipelineError> {
        info!(rows = x.nrows(), features = x.ncols(), "Training baseline logistic regression");
        let mut baseline = LogisticRegression::new(self.logistic.clone());
        baseline.fit(x, y)?;

        info!("Tuning random forest");
        let GridSearchResult {
            best_params,
            best_score,
            candidates,
            best_model,
        } = GridSearch::new(self.grid.clone(), self.cv_folds, self.seed).fit(x, y)?;

        let baseline = Arc::new(baseline);
        let tuned = Arc::new(best_model);
        let voting = VotingClassifier::new(Arc::clone(&baseline), Arc::clone(&tuned)).with_tie_break(self.tie_break);

        Ok(TrainedModels {
            baseline,
            tuned,
            voting,
            search: SearchSummary {
                best_params,
                best_score,
                candidates,
            },
        })
    }
}

/// Grid search outcome without the refit model
#[derive(Debug, Clone)]
pub struct SearchSummary {
    pub best_params: ForestParams,
    pub best_score: f64,
    pub candidates: Vec<CandidateScore>,
}

/// The fitted models
#[derive(Debug, Clone)]
pub struct TrainedModels {
    pub baseline: Arc<LogisticRegression>,
    pub tuned: Arc<RandomForest>,
    pub voting: VotingClassifier,
    pub search: SearchSummary,
}

impl TrainedModels {
    /// Models in report order: baseline, tuned, ensemble
    pub fn models(&self) -> Vec<Model> {
        vec![
            Model::Baseline(Arc::clone(&self.baseline)),
            Model::Tuned(Arc::clone(&self.tuned)),
            Model::Voting(self.voting.clone()),
        ]
    }
}
