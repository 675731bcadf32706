//! Z-score scaling of numeric columns

use super::FeatureError;
use ndarray::{Array1, Array2, ArrayView1, Axis};

/// Frozen per-column mean and standard deviation
#[derive(Debug, Clone, PartialEq)]
pub struct NumericScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl NumericScaler {
    /// Fit on training rows (population standard deviation)
    ///
    /// Constant columns get a scale of 1 so they map to zero instead of NaN.
    pub fn fit(data: &Array2<f64>) -> Result<Self, FeatureError> {
        let n_samples = data.nrows();
        if n_samples == 0 {
            return Err(FeatureError::EmptyTrainingSet);
        }

        let mean = data
            .mean_axis(Axis(0))
            .ok_or(FeatureError::EmptyTrainingSet)?;

        let scale = Array1::from_iter(data.columns().into_iter().zip(mean.iter()).map(|(col, &m)| {
            let variance = col.iter().map(|x| (x - m).powi(2)).sum::<f64>() / n_samples as f64;
            let std = variance.sqrt();
            if std > 1e-10 {
                std
            } else {
                1.0
            }
        }));

        Ok(Self { mean, scale })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }

    pub fn transform_row(&self, row: ArrayView1<f64>) -> Result<Array1<f64>, FeatureError> {
        if row.len() != self.n_features() {
            return Err(FeatureError::DimensionMismatch {
                expected: self.n_features(),
                got: row.len(),
            });
        }
        Ok((&row - &self.mean) / &self.scale)
    }
}
