//! Feature preparation pipeline: records → encoded categoricals → engineered numerics → rows.

use super::{EncodeMode, EncoderRegistry, FeatureSchema, PreparedFeatureRow};
use crate::error::{Result, RiskError};
use crate::records::{CategoricalField, ThreatRecord};
use ndarray::Array2;

#[derive(Debug, Clone, Default)]
pub struct FeaturePipeline {
    schema: FeatureSchema,
}

impl FeaturePipeline {
    pub fn new(schema: FeatureSchema) -> Result<Self> {
        schema.validate()?;
        Ok(Self { schema })
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// One row per record, in input order. The registry is only mutated in
    /// `EncodeMode::Fit`, and only for fields it has not seen before.
    pub fn prepare(
        &self,
        records: &[ThreatRecord],
        registry: &mut EncoderRegistry,
        mode: EncodeMode,
    ) -> Result<Vec<PreparedFeatureRow>> {
        match mode {
            EncodeMode::Fit => self.assemble(records, mode, |field, labels| {
                Ok(registry.fit_or_extend(field, labels))
            }),
            EncodeMode::Transform => self.transform(records, registry),
        }
    }

    /// Prepare with already fitted encoders; unseen labels become Unknown.
    pub fn transform(
        &self,
        records: &[ThreatRecord],
        registry: &EncoderRegistry,
    ) -> Result<Vec<PreparedFeatureRow>> {
        self.assemble(records, EncodeMode::Transform, |field, labels| {
            registry.transform_column(field, labels)
        })
    }

    fn assemble<F>(
        &self,
        records: &[ThreatRecord],
        mode: EncodeMode,
        mut encode: F,
    ) -> Result<Vec<PreparedFeatureRow>>
    where
        F: FnMut(CategoricalField, Vec<&str>) -> Result<Vec<usize>>,
    {
        for r in records {
            r.validate()?;
        }

        let mut rows = vec![PreparedFeatureRow::default(); records.len()];

        for &field in self.schema.categorical() {
            let labels: Vec<&str> = records.iter().map(|r| r.categorical(field)).collect();
            let codes = encode(field, labels)?;
            for (row, code) in rows.iter_mut().zip(codes) {
                row.insert(field.feature_name(), code as f64);
            }
        }

        for (row, record) in rows.iter_mut().zip(records) {
            for n in self.schema.numeric() {
                row.insert(n.name(), n.compute(record));
            }
        }

        tracing::debug!(
            rows = rows.len(),
            schema_version = self.schema.version(),
            ?mode,
            "prepared features"
        );
        Ok(rows)
    }
}

/// Stack rows into an (n_rows, n_columns) matrix in `columns` order.
pub fn to_matrix(rows: &[PreparedFeatureRow], columns: &[String]) -> Result<Array2<f64>> {
    let mut flat = Vec::with_capacity(rows.len() * columns.len());
    for row in rows {
        flat.extend(row.to_vector(columns)?);
    }
    Array2::from_shape_vec((rows.len(), columns.len()), flat)
        .map_err(|e| RiskError::InvalidSchema(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::NumericFeature;
    use crate::records::Severity;

    fn record(country: &str, severity: Severity, gb: f64, impact: f64, hours: f64) -> ThreatRecord {
        ThreatRecord {
            country: country.into(),
            year: 2020,
            threat_type: "Phishing".into(),
            attack_vector: "Social Engineering".into(),
            affected_industry: "Healthcare".into(),
            data_breached_gb: gb,
            financial_impact_m: impact,
            severity_level: severity,
            response_time_hours: hours,
            mitigation_strategy: "Employee Training".into(),
        }
    }

    #[test]
    fn engineered_features() {
        let pipeline = FeaturePipeline::default();
        let mut reg = EncoderRegistry::new();
        let rows = pipeline
            .prepare(
                &[record("USA", Severity::Critical, 9.0, 50.0, 3.0)],
                &mut reg,
                EncodeMode::Fit,
            )
            .unwrap();
        let row = &rows[0];
        assert_eq!(row.get("impact_per_gb"), Some(5.0));
        assert_eq!(row.get("response_efficiency"), Some(0.25));
        assert_eq!(row.get("severity_numeric"), Some(4.0));
        assert_eq!(row.get("data_breached_gb"), Some(9.0));
        assert_eq!(row.get("country_encoded"), Some(0.0));
        assert_eq!(row.len(), 11);
    }

    #[test]
    fn zero_breach_and_zero_response_are_finite() {
        let pipeline = FeaturePipeline::default();
        let mut reg = EncoderRegistry::new();
        let rows = pipeline
            .prepare(
                &[record("UK", Severity::Low, 0.0, 7.5, 0.0)],
                &mut reg,
                EncodeMode::Fit,
            )
            .unwrap();
        assert_eq!(rows[0].get("impact_per_gb"), Some(7.5));
        assert_eq!(rows[0].get("response_efficiency"), Some(1.0));
    }

    #[test]
    fn preserves_order_and_fits_all_fields() {
        let pipeline = FeaturePipeline::default();
        let mut reg = EncoderRegistry::new();
        let batch = vec![
            record("USA", Severity::High, 1.0, 1.0, 1.0),
            record("Germany", Severity::Low, 1.0, 1.0, 1.0),
            record("UK", Severity::Medium, 1.0, 1.0, 1.0),
        ];
        let rows = pipeline.prepare(&batch, &mut reg, EncodeMode::Fit).unwrap();
        let countries: Vec<f64> = rows.iter().map(|r| r.get("country_encoded").unwrap()).collect();
        assert_eq!(countries, vec![2.0, 0.0, 1.0]);
        assert_eq!(reg.len(), CategoricalField::ALL.len());
    }

    #[test]
    fn transform_mode_handles_drift_without_growing() {
        let pipeline = FeaturePipeline::default();
        let mut reg = EncoderRegistry::new();
        pipeline
            .prepare(&[record("USA", Severity::High, 1.0, 1.0, 1.0)], &mut reg, EncodeMode::Fit)
            .unwrap();
        let rows = pipeline
            .prepare(
                &[record("Brazil", Severity::High, 1.0, 1.0, 1.0)],
                &mut reg,
                EncodeMode::Transform,
            )
            .unwrap();
        let enc = reg.get(CategoricalField::Country).unwrap();
        assert_eq!(rows[0].get("country_encoded"), Some(enc.unknown_code() as f64));
        assert_eq!(enc.classes(), &["USA", "Unknown"]);
    }

    #[test]
    fn transform_mode_without_fit_fails() {
        let pipeline = FeaturePipeline::default();
        let mut reg = EncoderRegistry::new();
        let err = pipeline
            .prepare(
                &[record("USA", Severity::High, 1.0, 1.0, 1.0)],
                &mut reg,
                EncodeMode::Transform,
            )
            .unwrap_err();
        assert!(matches!(err, RiskError::UnfittedEncoder(_)));
    }

    #[test]
    fn invalid_record_is_rejected_before_encoding() {
        let pipeline = FeaturePipeline::default();
        let mut reg = EncoderRegistry::new();
        let err = pipeline
            .prepare(
                &[record("USA", Severity::High, -3.0, 1.0, 1.0)],
                &mut reg,
                EncodeMode::Fit,
            )
            .unwrap_err();
        assert!(err.is_input_validation());
        assert!(reg.is_empty());
    }

    #[test]
    fn custom_schema_and_matrix() {
        let schema =
            FeatureSchema::new(2, vec![CategoricalField::Country], vec![NumericFeature::SeverityNumeric])
                .unwrap();
        let pipeline = FeaturePipeline::new(schema).unwrap();
        let mut reg = EncoderRegistry::new();
        let rows = pipeline
            .prepare(
                &[
                    record("USA", Severity::High, 1.0, 1.0, 1.0),
                    record("UK", Severity::Low, 1.0, 1.0, 1.0),
                ],
                &mut reg,
                EncodeMode::Fit,
            )
            .unwrap();
        let m = to_matrix(&rows, &pipeline.schema().columns()).unwrap();
        assert_eq!(m.dim(), (2, 2));
        assert_eq!(m[[0, 0]], 1.0);
        assert_eq!(m[[1, 1]], 1.0);
        assert_eq!(m[[0, 1]], 3.0);
        assert_eq!(reg.len(), 1);
    }
}
