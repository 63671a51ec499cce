//! Composite risk score: batch-normalized signals combined with fixed weights, scaled to 0-100.
//! Stateless; the same batch and weights always give the same scores.

use crate::config::RiskConfig;
use crate::error::{Result, RiskError};
use crate::records::ThreatRecord;
use serde::{Deserialize, Serialize};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights {
    pub financial_impact: f64,
    pub data_breached: f64,
    pub severity: f64,
    pub response_time: f64,
}

impl Default for RiskWeights {
    fn default() -> Self {
        Self {
            financial_impact: 0.3,
            data_breached: 0.2,
            severity: 0.3,
            response_time: 0.2,
        }
    }
}

impl RiskWeights {
    /// Weights must be finite, non-negative and sum to 1.0.
    pub fn validate(&self) -> Result<()> {
        let parts = [
            ("financial_impact", self.financial_impact),
            ("data_breached", self.data_breached),
            ("severity", self.severity),
            ("response_time", self.response_time),
        ];
        for (name, w) in parts {
            if !w.is_finite() || w < 0.0 {
                return Err(RiskError::InvalidWeights(format!("{name} = {w}")));
            }
        }
        let sum: f64 = parts.iter().map(|(_, w)| w).sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RiskError::InvalidWeights(format!("weights sum to {sum}, expected 1.0")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn from_score(score: f64, config: &RiskConfig) -> Self {
        if score >= config.critical_threshold {
            RiskLevel::Critical
        } else if score >= config.high_threshold {
            RiskLevel::High
        } else if score >= config.medium_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

/// Composite score for one record of a batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRecord {
    /// Position in the input batch
    pub index: usize,
    pub score: f64,
    pub level: RiskLevel,
}

pub struct CompositeScorer {
    weights: RiskWeights,
    config: RiskConfig,
}

impl CompositeScorer {
    pub fn new(weights: RiskWeights) -> Result<Self> {
        Self::with_config(weights, RiskConfig::default())
    }

    pub fn with_config(weights: RiskWeights, config: RiskConfig) -> Result<Self> {
        weights.validate()?;
        config.validate()?;
        Ok(Self { weights, config })
    }

    /// One score in [0, 100] per record, rounded to 2 decimals (half to even),
    /// in input order.
    ///
    /// A batch maximum of 0 makes that field's ratio 0. For response time the
    /// sub-score is `1 - ratio`, so an all-zero response column scores 1.0.
    pub fn score(&self, records: &[ThreatRecord]) -> Result<Vec<f64>> {
        for r in records {
            r.validate()?;
        }
        let max_impact = batch_max(records, |r| r.financial_impact_m);
        let max_data = batch_max(records, |r| r.data_breached_gb);
        let max_response = batch_max(records, |r| r.response_time_hours);

        let w = &self.weights;
        Ok(records
            .iter()
            .map(|r| {
                let financial = ratio(r.financial_impact_m, max_impact);
                let data = ratio(r.data_breached_gb, max_data);
                let severity = r.severity_level.weight();
                // inverse: faster response scores higher
                let response = 1.0 - ratio(r.response_time_hours, max_response);
                let combined = w.financial_impact * financial
                    + w.data_breached * data
                    + w.severity * severity
                    + w.response_time * response;
                round2(combined * 100.0)
            })
            .collect())
    }

    /// Scores with their risk band.
    pub fn assess(&self, records: &[ThreatRecord]) -> Result<Vec<ScoredRecord>> {
        let scores = self.score(records)?;
        Ok(scores
            .into_iter()
            .enumerate()
            .map(|(index, score)| ScoredRecord {
                index,
                score,
                level: RiskLevel::from_score(score, &self.config),
            })
            .collect())
    }

    pub fn weights(&self) -> &RiskWeights {
        &self.weights
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }
}

/// Score a batch with the given weights, or the defaults.
/// See [`CompositeScorer::score`] for normalization and the zero-max guard.
pub fn score(records: &[ThreatRecord], weights: Option<&RiskWeights>) -> Result<Vec<f64>> {
    CompositeScorer::new(weights.copied().unwrap_or_default())?.score(records)
}

fn batch_max(records: &[ThreatRecord], value: impl Fn(&ThreatRecord) -> f64) -> f64 {
    records.iter().map(value).fold(0.0, f64::max)
}

/// `value / max`, defined as 0 when the batch maximum is 0.
fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

/// Two decimals, ties to even.
fn round2(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}
