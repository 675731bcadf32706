//! Logistic Regression for binary classification
//!
//! Batch gradient descent on the L2-penalized log loss. The penalty follows
//! the inverse-regularization convention: larger `c` means weaker shrinkage.

use super::{check_training_data, Capability, Classifier, ModelError};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Logistic regression settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogisticConfig {
    /// Inverse regularization strength
    pub c: f64,
    /// Iteration budget
    pub max_iter: usize,
    /// Gradient descent step size
    pub learning_rate: f64,
    /// Stop once the loss changes by less than this
    pub tolerance: f64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 1000,
            learning_rate: 0.5,
            tolerance: 1e-6,
        }
    }
}

/// Logistic Regression classifier
#[derive(Debug, Clone)]
pub struct LogisticRegression {
    config: LogisticConfig,
    /// Fitted coefficients
    coefficients: Option<Array1<f64>>,
    /// Intercept term
    intercept: Option<f64>,
    /// Penalized loss per iteration
    cost_history: Vec<f64>,
    converged: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new(LogisticConfig::default())
    }
}

impl LogisticRegression {
    pub fn new(config: LogisticConfig) -> Self {
        Self {
            config,
            coefficients: None,
            intercept: None,
            cost_history: Vec::new(),
            converged: false,
        }
    }

    /// Sigmoid activation function
    fn sigmoid(z: f64) -> f64 {
        if z >= 0.0 {
            1.0 / (1.0 + (-z).exp())
        } else {
            let exp_z = z.exp();
            exp_z / (1.0 + exp_z)
        }
    }

    /// Compute log loss (binary cross-entropy)
    fn log_loss(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
        let eps = 1e-15;
        let n = y_true.len() as f64;

        -y_true
            .iter()
            .zip(y_pred.iter())
            .map(|(&y, &p)| {
                let p_clipped = p.clamp(eps, 1.0 - eps);
                y * p_clipped.ln() + (1.0 - y) * (1.0 - p_clipped).ln()
            })
            .sum::<f64>()
            / n
    }

    /// Fit using gradient descent
    ///
    /// Running out of iterations is not an error: a warning is logged and
    /// the last parameters are kept.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), ModelError> {
        if self.coefficients.is_some() {
            return Err(ModelError::AlreadyFitted);
        }
        check_training_data(x, y)?;
        if self.config.c <= 0.0 || self.config.learning_rate <= 0.0 {
            return Err(ModelError::InvalidParameter(
                "c and learning_rate must be positive".to_string(),
            ));
        }

        let n_samples = x.nrows() as f64;
        let alpha = 1.0 / (self.config.c * n_samples);

        let mut weights = Array1::<f64>::zeros(x.ncols());
        let mut bias = 0.0;
        self.cost_history.clear();
        self.converged = false;

        for iter in 0..self.config.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = linear.mapv(Self::sigmoid);

            let cost = Self::log_loss(y, &predictions) + 0.5 * alpha * weights.dot(&weights);
            if let Some(&previous) = self.cost_history.last() {
                if (previous - cost).abs() < self.config.tolerance {
                    self.cost_history.push(cost);
                    self.converged = true;
                    debug!("Converged at iteration {}", iter);
                    break;
                }
            }
            self.cost_history.push(cost);

            let errors = &predictions - y;
            let dw = x.t().dot(&errors) / n_samples + &weights * alpha;
            let db = errors.sum() / n_samples;

            weights.scaled_add(-self.config.learning_rate, &dw);
            bias -= self.config.learning_rate * db;
        }

        if !self.converged {
            warn!(
                max_iter = self.config.max_iter,
                final_cost = self.cost_history.last().copied().unwrap_or(f64::NAN),
                "Logistic regression did not converge; keeping last parameters"
            );
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);

        Ok(())
    }

    pub fn coefficients(&self) -> Option<&Array1<f64>> {
        self.coefficients.as_ref()
    }

    pub fn intercept(&self) -> Option<f64> {
        self.intercept
    }

    pub fn cost_history(&self) -> &[f64] {
        &self.cost_history
    }

    /// Whether the loss settled within the iteration budget
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Get decision function values (log-odds)
    pub fn decision_function(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let weights = self.coefficients.as_ref().ok_or(ModelError::NotFitted)?;
        let bias = self.intercept.ok_or(ModelError::NotFitted)?;

        if x.ncols() != weights.len() {
            return Err(ModelError::DimensionMismatch {
                expected: weights.len(),
                got: x.ncols(),
            });
        }

        Ok(x.dot(weights) + bias)
    }
}

impl Classifier for LogisticRegression {
    fn name(&self) -> &str {
        "LogisticRegression"
    }

    fn capability(&self) -> Capability {
        Capability::Probabilistic
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p >= 0.5 { 1.0 } else { 0.0 }))
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>, ModelError> {
        Ok(self.decision_function(x)?.mapv(Self::sigmoid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable() -> (Array2<f64>, Array1<f64>) {
        let x = Array2::from_shape_vec(
            (6, 2),
            vec![0.0, 0.0, 0.5, 0.5, 1.0, 1.0, 5.0, 5.0, 5.5, 5.5, 6.0, 6.0],
        )
        .unwrap();
        let y = Array1::from_vec(vec![0.0, 0.0, 0.0, 1.0, 1.0, 1.0]);
        (x, y)
    }

    #[test]
    fn test_sigmoid() {
        assert!((LogisticRegression::sigmoid(0.0) - 0.5).abs() < 1e-10);
        assert!(LogisticRegression::sigmoid(100.0) > 0.99);
        assert!(LogisticRegression::sigmoid(-100.0) < 0.01);
    }

    #[test]
    fn test_logistic_regression_fit() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(LogisticConfig {
            learning_rate: 0.1,
            max_iter: 5000,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        let accuracy = predictions
            .iter()
            .zip(y.iter())
            .filter(|(&p, &a)| (p - a).abs() < 0.5)
            .count() as f64
            / y.len() as f64;

        assert!(accuracy >= 0.8);

        let proba = model.predict_proba(&x).unwrap();
        assert!(proba.iter().all(|&p| (0.0..=1.0).contains(&p)));
    }

    #[test]
    fn test_non_convergence_keeps_parameters() {
        let (x, y) = separable();
        let mut model = LogisticRegression::new(LogisticConfig {
            max_iter: 2,
            tolerance: 0.0,
            learning_rate: 0.01,
            ..Default::default()
        });
        model.fit(&x, &y).unwrap();

        assert!(!model.converged());
        assert!(model.coefficients().is_some());
        assert!(model.predict(&x).is_ok());
    }

    #[test]
    fn test_regularization_shrinks_coefficients() {
        let (x, y) = separable();

        let mut weak = LogisticRegression::new(LogisticConfig {
            c: 100.0,
            learning_rate: 0.05,
            ..Default::default()
        });
        let mut strong = LogisticRegression::new(LogisticConfig {
            c: 0.01,
            learning_rate: 0.05,
            ..Default::default()
        });
        weak.fit(&x, &y).unwrap();
        strong.fit(&x, &y).unwrap();

        let norm = |m: &LogisticRegression| m.coefficients().unwrap().dot(m.coefficients().unwrap()).sqrt();
        assert!(norm(&strong) < norm(&weak));
    }

    #[test]
    fn test_not_fitted_and_refit() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        assert!(matches!(model.predict(&x), Err(ModelError::NotFitted)));

        model.fit(&x, &y).unwrap();
        assert!(matches!(model.fit(&x, &y), Err(ModelError::AlreadyFitted)));
    }

    #[test]
    fn test_dimension_mismatch() {
        let (x, y) = separable();
        let mut model = LogisticRegression::default();
        model.fit(&x, &y).unwrap();

        let wrong = Array2::<f64>::zeros((2, 3));
        assert!(matches!(
            model.predict(&wrong),
            Err(ModelError::DimensionMismatch { expected: 2, got: 3 })
        ));
    }
}
