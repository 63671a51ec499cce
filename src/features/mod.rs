//! Feature preparation from incident records: encoded categoricals plus engineered ratios.

mod encoder;
mod pipeline;

pub use encoder::{CategoricalEncoder, EncodeMode, EncoderRegistry, UNKNOWN_LABEL};
pub use pipeline::{FeaturePipeline, to_matrix};

use crate::error::{Result, RiskError};
use crate::records::{CategoricalField, ThreatRecord};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Numeric features derived from a single record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericFeature {
    DataBreachedGb,
    ResponseTimeHours,
    /// financial impact / (data breached + 1)
    ImpactPerGb,
    /// 1 / (response time + 1); higher means faster response
    ResponseEfficiency,
    SeverityNumeric,
}

impl NumericFeature {
    pub fn name(&self) -> &'static str {
        match self {
            NumericFeature::DataBreachedGb => "data_breached_gb",
            NumericFeature::ResponseTimeHours => "response_time_hours",
            NumericFeature::ImpactPerGb => "impact_per_gb",
            NumericFeature::ResponseEfficiency => "response_efficiency",
            NumericFeature::SeverityNumeric => "severity_numeric",
        }
    }

    pub fn compute(&self, r: &ThreatRecord) -> f64 {
        match self {
            NumericFeature::DataBreachedGb => r.data_breached_gb,
            NumericFeature::ResponseTimeHours => r.response_time_hours,
            NumericFeature::ImpactPerGb => r.financial_impact_m / (r.data_breached_gb + 1.0),
            NumericFeature::ResponseEfficiency => 1.0 / (r.response_time_hours + 1.0),
            NumericFeature::SeverityNumeric => r.severity_level.ordinal(),
        }
    }
}

/// Declared, versioned feature set. Column order is the model's input order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSchema {
    version: u32,
    categorical: Vec<CategoricalField>,
    numeric: Vec<NumericFeature>,
}

impl FeatureSchema {
    pub fn new(
        version: u32,
        categorical: Vec<CategoricalField>,
        numeric: Vec<NumericFeature>,
    ) -> Result<Self> {
        let schema = Self {
            version,
            categorical,
            numeric,
        };
        schema.validate()?;
        Ok(schema)
    }

    /// All six categorical fields, then raw and engineered numerics.
    pub fn v1() -> Self {
        Self {
            version: 1,
            categorical: CategoricalField::ALL.to_vec(),
            numeric: vec![
                NumericFeature::DataBreachedGb,
                NumericFeature::ResponseTimeHours,
                NumericFeature::ImpactPerGb,
                NumericFeature::ResponseEfficiency,
                NumericFeature::SeverityNumeric,
            ],
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.categorical.is_empty() && self.numeric.is_empty() {
            return Err(RiskError::InvalidSchema("no features declared".into()));
        }
        let mut seen = HashSet::new();
        for name in self.columns() {
            if !seen.insert(name.clone()) {
                return Err(RiskError::InvalidSchema(format!("duplicate feature {name}")));
            }
        }
        Ok(())
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn categorical(&self) -> &[CategoricalField] {
        &self.categorical
    }

    pub fn numeric(&self) -> &[NumericFeature] {
        &self.numeric
    }

    /// Feature column names in input order
    pub fn columns(&self) -> Vec<String> {
        self.categorical
            .iter()
            .map(|f| f.feature_name().to_string())
            .chain(self.numeric.iter().map(|n| n.name().to_string()))
            .collect()
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::v1()
    }
}

/// Prepared features for one record, keyed by feature name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreparedFeatureRow {
    features: BTreeMap<String, f64>,
}

impl PreparedFeatureRow {
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        self.features.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.features.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.features.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Values in `columns` order; fails on any absent column.
    pub fn to_vector(&self, columns: &[String]) -> Result<Vec<f64>> {
        columns
            .iter()
            .map(|c| self.get(c).ok_or_else(|| RiskError::MissingColumn(c.clone())))
            .collect()
    }
}
