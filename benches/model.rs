//! Model benchmark: forest training and batch prediction.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use threat_risk::config::ModelConfig;
use threat_risk::model::PredictiveRiskModel;
use threat_risk::records::{Severity, ThreatRecord};

fn make_records(n: usize) -> Vec<ThreatRecord> {
    (0..n)
        .map(|i| {
            let severity = Severity::ALL[i % 4];
            let gb = ((i * 37) % 500) as f64;
            ThreatRecord {
                country: format!("country_{}", i % 10),
                year: 2015 + (i % 10) as i32,
                threat_type: format!("threat_{}", i % 6),
                attack_vector: "Phishing".to_string(),
                affected_industry: format!("industry_{}", i % 7),
                data_breached_gb: gb,
                financial_impact_m: gb * 0.1 + severity.ordinal() * 5.0,
                severity_level: severity,
                response_time_hours: (i % 72) as f64,
                mitigation_strategy: "Firewall".to_string(),
            }
        })
        .collect()
}

fn bench_train(c: &mut Criterion) {
    let records = make_records(500);
    let config = ModelConfig {
        n_estimators: 20,
        ..Default::default()
    };

    let mut g = c.benchmark_group("model_train");
    g.sample_size(10);
    g.bench_function("train_500_records_20_trees", |b| {
        b.iter(|| {
            let mut model = PredictiveRiskModel::new(config.clone()).unwrap();
            black_box(model.train(black_box(&records), "Financial Impact ($M)")).unwrap()
        })
    });
    g.finish();
}

fn bench_predict(c: &mut Criterion) {
    let records = make_records(500);
    let mut model = PredictiveRiskModel::new(ModelConfig::default()).unwrap();
    model.train(&records, "Financial Impact ($M)").unwrap();

    c.bench_function("predict_500_records_100_trees", |b| {
        b.iter(|| model.predict(black_box(&records)).unwrap())
    });
}

criterion_group!(benches, bench_train, bench_predict);
criterion_main!(benches);
