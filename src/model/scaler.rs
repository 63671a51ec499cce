//! Per-column standardization fitted on training rows only.

use crate::error::{Result, RiskError};
use ndarray::{Array1, Array2, Axis};

/// Columns whose standard deviation is below this are left unscaled.
const MIN_SCALE: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct StandardScaler {
    mean: Array1<f64>,
    scale: Array1<f64>,
}

impl StandardScaler {
    /// Population mean and standard deviation per column.
    pub fn fit(x: &Array2<f64>) -> Result<Self> {
        if x.nrows() == 0 {
            return Err(RiskError::InsufficientSamples { needed: 1, got: 0 });
        }
        let mean = x
            .mean_axis(Axis(0))
            .ok_or(RiskError::InsufficientSamples { needed: 1, got: 0 })?;
        let scale = x
            .std_axis(Axis(0), 0.0)
            .mapv(|s| if s > MIN_SCALE { s } else { 1.0 });
        Ok(Self { mean, scale })
    }

    /// `(x - mean) / scale` using the fitted statistics.
    pub fn transform(&self, x: &Array2<f64>) -> Result<Array2<f64>> {
        if x.ncols() != self.mean.len() {
            return Err(RiskError::InvalidSchema(format!(
                "scaler fitted on {} columns, got {}",
                self.mean.len(),
                x.ncols()
            )));
        }
        Ok((x - &self.mean) / &self.scale)
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn scale(&self) -> &Array1<f64> {
        &self.scale
    }
}
