//! Scoring configuration: composite weights, model hyperparameters, risk bands, logging.

use crate::error::{Result, RiskError};
use crate::risk::RiskWeights;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Composite score weights (must sum to 1.0)
    pub weights: RiskWeights,
    /// Predictive model hyperparameters
    pub model: ModelConfig,
    /// Risk band thresholds on the 0-100 composite score
    pub risk: RiskConfig,
    /// Logging
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Trees in the forest
    pub n_estimators: usize,
    /// Seed for the train/evaluation split and bootstrap sampling
    pub seed: u64,
    /// Share of records held out for evaluation (0.0-1.0, exclusive)
    pub test_fraction: f64,
    /// None grows each tree until leaves are pure
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; None = all
    pub max_features: Option<usize>,
    pub bootstrap: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Score at or above this is critical (0-100)
    pub critical_threshold: f64,
    pub high_threshold: f64,
    pub medium_threshold: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    pub level: String,
    pub json: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            seed: 42,
            test_fraction: 0.2,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
        }
    }
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            critical_threshold: 75.0,
            high_threshold: 50.0,
            medium_threshold: 25.0,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: true,
        }
    }
}

impl ModelConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_estimators == 0 {
            return Err(RiskError::InvalidConfig("n_estimators must be at least 1".into()));
        }
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(RiskError::InvalidConfig(format!(
                "test_fraction must be in (0, 1), got {}",
                self.test_fraction
            )));
        }
        if self.min_samples_split < 2 || self.min_samples_leaf < 1 {
            return Err(RiskError::InvalidConfig(
                "min_samples_split must be >= 2 and min_samples_leaf >= 1".into(),
            ));
        }
        if self.max_features == Some(0) {
            return Err(RiskError::InvalidConfig("max_features must be at least 1".into()));
        }
        Ok(())
    }
}

impl RiskConfig {
    pub fn validate(&self) -> Result<()> {
        let ordered = self.medium_threshold <= self.high_threshold
            && self.high_threshold <= self.critical_threshold;
        if !ordered {
            return Err(RiskError::InvalidConfig(
                "risk thresholds must satisfy medium <= high <= critical".into(),
            ));
        }
        Ok(())
    }
}

impl ScoringConfig {
    /// Load from JSON file if present, else defaults. A file that exists but
    /// fails to parse or validate is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file; using defaults");
            return Ok(Self::default());
        }
        Self::try_load(path)
    }

    /// Load from JSON file, surfacing read, parse and validation errors
    pub fn try_load(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: ScoringConfig = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.weights.validate()?;
        self.model.validate()?;
        self.risk.validate()
    }
}
