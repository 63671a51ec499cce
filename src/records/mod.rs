//! Incident records as supplied by ingestion: one row of the threats dataset per record.
//! Serde names follow the dataset's column headers.

use crate::error::{Result, RiskError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Ordinal used as a model feature: Low=1 .. Critical=4
    pub fn ordinal(&self) -> f64 {
        match self {
            Severity::Low => 1.0,
            Severity::Medium => 2.0,
            Severity::High => 3.0,
            Severity::Critical => 4.0,
        }
    }

    /// Position on the composite score's [0, 1] severity scale
    pub fn weight(&self) -> f64 {
        self.ordinal() / 4.0
    }
}

impl FromStr for Severity {
    type Err = RiskError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Low" => Ok(Severity::Low),
            "Medium" => Ok(Severity::Medium),
            "High" => Ok(Severity::High),
            "Critical" => Ok(Severity::Critical),
            other => Err(RiskError::InvalidSeverity(other.to_string())),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = RiskError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<Severity> for String {
    fn from(s: Severity) -> Self {
        s.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded incident observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatRecord {
    #[serde(rename = "Country")]
    pub country: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Threat Type")]
    pub threat_type: String,
    #[serde(rename = "Attack Vector")]
    pub attack_vector: String,
    #[serde(rename = "Affected Industry")]
    pub affected_industry: String,
    #[serde(rename = "Data Breached (GB)")]
    pub data_breached_gb: f64,
    #[serde(rename = "Financial Impact ($M)")]
    pub financial_impact_m: f64,
    #[serde(rename = "Severity Level")]
    pub severity_level: Severity,
    #[serde(rename = "Response Time (Hours)")]
    pub response_time_hours: f64,
    #[serde(rename = "Mitigation Strategy")]
    pub mitigation_strategy: String,
}

impl ThreatRecord {
    /// Reject negative or non-finite numeric fields.
    pub fn validate(&self) -> Result<()> {
        let numeric = [
            ("data_breached_gb", self.data_breached_gb),
            ("financial_impact_m", self.financial_impact_m),
            ("response_time_hours", self.response_time_hours),
        ];
        for (field, value) in numeric {
            if !value.is_finite() || value < 0.0 {
                return Err(RiskError::InvalidField { field, value });
            }
        }
        Ok(())
    }

    pub fn categorical(&self, field: CategoricalField) -> &str {
        match field {
            CategoricalField::Country => &self.country,
            CategoricalField::ThreatType => &self.threat_type,
            CategoricalField::AttackVector => &self.attack_vector,
            CategoricalField::AffectedIndustry => &self.affected_industry,
            CategoricalField::SeverityLevel => self.severity_level.as_str(),
            CategoricalField::MitigationStrategy => &self.mitigation_strategy,
        }
    }
}

/// Label-valued columns that get an integer encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoricalField {
    Country,
    ThreatType,
    AttackVector,
    AffectedIndustry,
    SeverityLevel,
    MitigationStrategy,
}

impl CategoricalField {
    pub const ALL: [CategoricalField; 6] = [
        CategoricalField::Country,
        CategoricalField::ThreatType,
        CategoricalField::AttackVector,
        CategoricalField::AffectedIndustry,
        CategoricalField::SeverityLevel,
        CategoricalField::MitigationStrategy,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            CategoricalField::Country => "Country",
            CategoricalField::ThreatType => "Threat Type",
            CategoricalField::AttackVector => "Attack Vector",
            CategoricalField::AffectedIndustry => "Affected Industry",
            CategoricalField::SeverityLevel => "Severity Level",
            CategoricalField::MitigationStrategy => "Mitigation Strategy",
        }
    }

    /// Name of the encoded feature column, e.g. `country_encoded`
    pub fn feature_name(&self) -> &'static str {
        match self {
            CategoricalField::Country => "country_encoded",
            CategoricalField::ThreatType => "threat_type_encoded",
            CategoricalField::AttackVector => "attack_vector_encoded",
            CategoricalField::AffectedIndustry => "affected_industry_encoded",
            CategoricalField::SeverityLevel => "severity_level_encoded",
            CategoricalField::MitigationStrategy => "mitigation_strategy_encoded",
        }
    }
}

impl fmt::Display for CategoricalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Numeric column the model can be trained to predict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    #[default]
    FinancialImpact,
    DataBreached,
    ResponseTime,
    Year,
}

impl TargetField {
    pub fn column(&self) -> &'static str {
        match self {
            TargetField::FinancialImpact => "Financial Impact ($M)",
            TargetField::DataBreached => "Data Breached (GB)",
            TargetField::ResponseTime => "Response Time (Hours)",
            TargetField::Year => "Year",
        }
    }

    pub fn value(&self, record: &ThreatRecord) -> f64 {
        match self {
            TargetField::FinancialImpact => record.financial_impact_m,
            TargetField::DataBreached => record.data_breached_gb,
            TargetField::ResponseTime => record.response_time_hours,
            TargetField::Year => record.year as f64,
        }
    }
}

impl FromStr for TargetField {
    type Err = RiskError;

    /// Accepts the dataset header or its snake_case alias.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Financial Impact ($M)" | "financial_impact_m" | "financial_impact" => {
                Ok(TargetField::FinancialImpact)
            }
            "Data Breached (GB)" | "data_breached_gb" | "data_breached" => {
                Ok(TargetField::DataBreached)
            }
            "Response Time (Hours)" | "response_time_hours" | "response_time" => {
                Ok(TargetField::ResponseTime)
            }
            "Year" | "year" => Ok(TargetField::Year),
            other => Err(RiskError::MissingColumn(other.to_string())),
        }
    }
}

/// Read a JSON array of records and validate each one.
pub fn load_json_batch(path: &Path) -> Result<Vec<ThreatRecord>> {
    let data = std::fs::read_to_string(path)?;
    let records: Vec<ThreatRecord> = serde_json::from_str(&data)?;
    for r in &records {
        r.validate()?;
    }
    tracing::info!(path = %path.display(), count = records.len(), "loaded record batch");
    Ok(records)
}
