//! Threat Risk — risk scoring for recorded cybersecurity incidents.
//!
//! Modular structure:
//! - [`records`] — Incident record schema, severity and target columns
//! - [`features`] — Categorical encoders and the feature preparation pipeline
//! - [`risk`] — Deterministic composite risk score and risk bands
//! - [`model`] — Trainable random forest model predicting incident impact
//! - [`logging`] — Structured JSON logging
//! - [`config`] — Weights, model hyperparameters and logging settings

pub mod config;
pub mod error;
pub mod records;
pub mod features;
pub mod risk;
pub mod model;
pub mod logging;

pub use config::ScoringConfig;
pub use error::{Result, RiskError};
pub use records::{Severity, TargetField, ThreatRecord};
pub use features::{EncoderRegistry, FeaturePipeline, FeatureSchema, PreparedFeatureRow};
pub use risk::{CompositeScorer, RiskLevel, RiskWeights};
pub use model::{PredictiveRiskModel, TrainingMetrics};
pub use logging::StructuredLogger;
