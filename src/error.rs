//! Error types for scoring, feature preparation and model operations.

use thiserror::Error;

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, RiskError>;

#[derive(Error, Debug)]
pub enum RiskError {
    /// Severity label outside Low/Medium/High/Critical
    #[error("invalid severity level: {0:?}")]
    InvalidSeverity(String),

    /// Numeric record field that is negative or not finite
    #[error("invalid value for {field}: {value}")]
    InvalidField { field: &'static str, value: f64 },

    #[error("invalid risk weights: {0}")]
    InvalidWeights(String),

    /// Unknown training target, or a feature missing from a prepared row
    #[error("missing column: {0}")]
    MissingColumn(String),

    #[error("invalid feature schema: {0}")]
    InvalidSchema(String),

    /// Transform-only encoding requested for a field that was never fitted
    #[error("encoder for {0} has not been fitted")]
    UnfittedEncoder(String),

    #[error("insufficient samples: need at least {needed}, got {got}")]
    InsufficientSamples { needed: usize, got: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("model must be trained before making predictions")]
    ModelNotTrained,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl RiskError {
    /// True for the "train first" condition.
    pub fn is_model_state(&self) -> bool {
        matches!(self, RiskError::ModelNotTrained)
    }

    /// True for malformed or out-of-domain caller input.
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            RiskError::InvalidSeverity(_)
                | RiskError::InvalidField { .. }
                | RiskError::InvalidWeights(_)
                | RiskError::MissingColumn(_)
                | RiskError::InvalidSchema(_)
                | RiskError::InsufficientSamples { .. }
                | RiskError::InvalidConfig(_)
        )
    }
}
