//! Composite risk scoring and risk bands.

mod engine;

pub use engine::{score, CompositeScorer, RiskLevel, RiskWeights, ScoredRecord};
