//! Integration test: composite scores, feature preparation and the predictive model end to end.

use threat_risk::{
    config::{ModelConfig, ScoringConfig},
    features::{EncodeMode, EncoderRegistry, FeaturePipeline},
    model::PredictiveRiskModel,
    records::{CategoricalField, Severity, ThreatRecord},
    risk::{score, CompositeScorer, RiskWeights},
    RiskError,
};
use std::path::Path;

fn record(
    country: &str,
    severity: Severity,
    impact: f64,
    gb: f64,
    hours: f64,
) -> ThreatRecord {
    ThreatRecord {
        country: country.into(),
        year: 2020,
        threat_type: "Ransomware".into(),
        attack_vector: "Phishing".into(),
        affected_industry: "Banking".into(),
        data_breached_gb: gb,
        financial_impact_m: impact,
        severity_level: severity,
        response_time_hours: hours,
        mitigation_strategy: "Network Segmentation".into(),
    }
}

fn five_record_batch() -> Vec<ThreatRecord> {
    vec![
        record("USA", Severity::High, 10.5, 100.0, 24.0),
        record("UK", Severity::Medium, 2.3, 50.0, 48.0),
        record("Germany", Severity::Critical, 50.7, 500.0, 12.0),
        record("USA", Severity::High, 7.5, 75.0, 36.0),
        record("UK", Severity::Low, 20.1, 200.0, 72.0),
    ]
}

/// Deterministic pseudo-random batch with impact driven by breach size and severity.
fn training_batch(n: usize, offset: usize) -> Vec<ThreatRecord> {
    const COUNTRIES: [&str; 5] = ["USA", "UK", "Germany", "China", "Brazil"];
    (0..n)
        .map(|k| {
            let i = k + offset;
            let severity = Severity::ALL[(i * 7) % 4];
            let gb = ((i * 53) % 97) as f64 * 5.0;
            let mut r = record(
                COUNTRIES[i % 5],
                severity,
                gb * 0.1 + severity.ordinal() * 8.0,
                gb,
                ((i * 11) % 70) as f64 + 1.0,
            );
            r.year = 2015 + (i % 10) as i32;
            r
        })
        .collect()
}

#[test]
fn scenario_highest_and_lowest() {
    let scores = score(&five_record_batch(), None).unwrap();
    assert_eq!(scores.len(), 5);

    let max_idx = (0..5).max_by(|&a, &b| scores[a].total_cmp(&scores[b])).unwrap();
    let min_idx = (0..5).min_by(|&a, &b| scores[a].total_cmp(&scores[b])).unwrap();
    assert_eq!(max_idx, 2, "scores: {:?}", scores);
    assert_eq!(min_idx, 1, "scores: {:?}", scores);
    assert_eq!(scores[2], 96.67);
}

#[test]
fn scores_stay_in_range_for_valid_weights() {
    let weight_sets = [
        RiskWeights::default(),
        RiskWeights {
            financial_impact: 1.0,
            data_breached: 0.0,
            severity: 0.0,
            response_time: 0.0,
        },
        RiskWeights {
            financial_impact: 0.1,
            data_breached: 0.4,
            severity: 0.25,
            response_time: 0.25,
        },
        RiskWeights {
            financial_impact: 0.0,
            data_breached: 0.0,
            severity: 0.0,
            response_time: 1.0,
        },
    ];
    let batch = training_batch(40, 0);
    for w in &weight_sets {
        for s in score(&batch, Some(w)).unwrap() {
            assert!((0.0..=100.0).contains(&s), "{} out of range for {:?}", s, w);
        }
    }
}

#[test]
fn higher_financial_impact_never_lowers_score() {
    let base = five_record_batch();
    let before = score(&base, None).unwrap();
    for bump in [0.1, 5.0, 30.0, 500.0] {
        let mut batch = base.clone();
        batch[0].financial_impact_m += bump;
        let after = score(&batch, None).unwrap();
        assert!(after[0] >= before[0], "bump {} lowered {} -> {}", bump, before[0], after[0]);
    }
}

#[test]
fn uniform_batch_normalizes_to_one() {
    let batch: Vec<ThreatRecord> = [Severity::Low, Severity::High, Severity::Critical]
        .into_iter()
        .map(|s| record("USA", s, 12.0, 40.0, 10.0))
        .collect();
    let only_financial = RiskWeights {
        financial_impact: 0.5,
        data_breached: 0.5,
        severity: 0.0,
        response_time: 0.0,
    };
    let scores = score(&batch, Some(&only_financial)).unwrap();
    assert_eq!(scores, vec![100.0, 100.0, 100.0]);
}

#[test]
fn invalid_weights_are_rejected() {
    let w = RiskWeights {
        financial_impact: 0.3,
        data_breached: 0.3,
        severity: 0.3,
        response_time: 0.3,
    };
    let err = score(&five_record_batch(), Some(&w)).unwrap_err();
    assert!(matches!(err, RiskError::InvalidWeights(_)));
    assert!(CompositeScorer::new(w).is_err());
}

#[test]
fn encoder_drift_maps_to_unknown() {
    let pipeline = FeaturePipeline::default();
    let mut registry = EncoderRegistry::new();
    pipeline
        .prepare(&five_record_batch(), &mut registry, EncodeMode::Fit)
        .unwrap();

    let unknown = registry.get(CategoricalField::Country).unwrap().unknown_code();
    let uk = registry.encode(CategoricalField::Country, "UK").unwrap();
    assert_eq!(uk, registry.encode(CategoricalField::Country, "UK").unwrap());
    assert_eq!(registry.encode(CategoricalField::Country, "Narnia").unwrap(), unknown);

    let rows = pipeline
        .transform(&[record("Narnia", Severity::Low, 1.0, 1.0, 1.0)], &registry)
        .unwrap();
    assert_eq!(rows[0].get("country_encoded"), Some(unknown as f64));
}

#[test]
fn untrained_model_fails_with_model_state_error() {
    let model = PredictiveRiskModel::new(ModelConfig::default()).unwrap();
    let predict_err = model.predict(&five_record_batch()).unwrap_err();
    let importance_err = model.feature_importance().unwrap_err();
    assert!(predict_err.is_model_state());
    assert!(importance_err.is_model_state());
    assert!(!predict_err.is_input_validation());
}

#[test]
fn retraining_overwrites_previous_state() {
    let config = ModelConfig {
        n_estimators: 20,
        ..Default::default()
    };
    let first = training_batch(60, 0);
    let mut second = training_batch(60, 1000);
    for r in &mut second {
        r.financial_impact_m = 1000.0 + r.data_breached_gb;
    }

    let mut model = PredictiveRiskModel::new(config.clone()).unwrap();
    model.train(&first, "Financial Impact ($M)").unwrap();
    let before = model.predict(&first[..5]).unwrap();
    model.train(&second, "Financial Impact ($M)").unwrap();
    let after = model.predict(&first[..5]).unwrap();

    // same label sets in both batches, so the encoders match a fresh model's
    let mut fresh = PredictiveRiskModel::new(config).unwrap();
    fresh.train(&second, "Financial Impact ($M)").unwrap();
    assert_eq!(after, fresh.predict(&first[..5]).unwrap());

    assert_ne!(before, after);
    assert!(after.iter().all(|&p| p >= 1000.0));
}

#[test]
fn full_pipeline_with_default_config() {
    let config = ScoringConfig::load(Path::new("nonexistent.json")).unwrap();
    let batch = training_batch(120, 0);

    let scorer = CompositeScorer::with_config(config.weights, config.risk.clone()).unwrap();
    let assessed = scorer.assess(&batch).unwrap();
    assert_eq!(assessed.len(), batch.len());

    let mut model = PredictiveRiskModel::new(config.model.clone()).unwrap();
    let metrics = model.train(&batch, "Financial Impact ($M)").unwrap();
    assert_eq!((metrics.n_train, metrics.n_test), (96, 24));
    assert!(metrics.r2 > 0.5, "r2 = {}", metrics.r2);

    let ranking = model.feature_importance().unwrap();
    let total: f64 = ranking.iter().map(|(_, v)| v).sum();
    assert!((total - 1.0).abs() < 1e-9);
    assert!(ranking.iter().all(|(_, v)| *v >= 0.0));

    let preds = model.predict(&batch).unwrap();
    assert_eq!(preds.len(), batch.len());
}
