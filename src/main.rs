//! Threat Risk entrypoint: scores a JSON batch of incident records, trains the
//! impact model on it and prints composite scores, metrics and predictions as ndjson.

use threat_risk::{
    config::ScoringConfig,
    logging::{OutputLine, StructuredLogger},
    records::load_json_batch,
    risk::CompositeScorer,
    model::PredictiveRiskModel,
};
use std::io::Write;
use std::path::PathBuf;
use tracing::{info, warn};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let config_path = std::env::var("THREAT_RISK_CONFIG_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.json"));
    let config = ScoringConfig::load(&config_path)?;

    StructuredLogger::init(config.log.json, &config.log.level);

    let mut args = std::env::args().skip(1);
    let batch_path = args
        .next()
        .map(PathBuf::from)
        .ok_or("usage: threat-risk <records.json> [target column]")?;
    let target = args.next().unwrap_or_else(|| "Financial Impact ($M)".to_string());

    let records = load_json_batch(&batch_path)?;
    info!(count = records.len(), target = %target, "scoring batch");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    let scorer = CompositeScorer::with_config(config.weights, config.risk.clone())?;
    for scored in scorer.assess(&records)? {
        let mut line = OutputLine::new("composite", scored.index);
        line.risk_score = Some(scored.score);
        line.risk_level = Some(scored.level);
        StructuredLogger::emit_json(&line, &mut out)?;
    }

    let mut model = PredictiveRiskModel::new(config.model.clone())?;
    match model.train(&records, &target) {
        Ok(metrics) => {
            StructuredLogger::emit_json(&metrics, &mut out)?;
            for (index, predicted) in model.predict(&records)?.into_iter().enumerate() {
                let mut line = OutputLine::new("prediction", index);
                line.predicted = Some(predicted);
                StructuredLogger::emit_json(&line, &mut out)?;
            }
        }
        Err(e) if e.is_input_validation() => {
            warn!(error = %e, "model not trained; composite scores only");
        }
        Err(e) => return Err(e.into()),
    }

    out.flush()?;
    Ok(())
}
