//! JSON log lines: one JSON object per line (ndjson) for downstream reporting.

use crate::risk::RiskLevel;
use chrono::Utc;
use serde::Serialize;
use std::io::Write;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Per-record result line
#[derive(Debug, Serialize)]
pub struct OutputLine<'a> {
    pub ts: String,
    pub kind: &'a str,
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub predicted: Option<f64>,
}

impl<'a> OutputLine<'a> {
    pub fn new(kind: &'a str, index: usize) -> Self {
        Self {
            ts: Utc::now().to_rfc3339(),
            kind,
            index,
            risk_score: None,
            risk_level: None,
            predicted: None,
        }
    }
}

pub struct StructuredLogger;

impl StructuredLogger {
    /// Install global subscriber: JSON or plain lines to stderr, level from RUST_LOG or default.
    /// A second call is a no-op.
    pub fn init(json: bool, default_level: &str) {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        let installed = if json {
            let fmt = tracing_subscriber::fmt::layer()
                .json()
                .with_span_events(FmtSpan::NONE)
                .with_writer(std::io::stderr);
            tracing_subscriber::registry().with(filter).with(fmt).try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };
        if installed.is_err() {
            tracing::debug!("tracing subscriber already installed");
        }
    }

    /// Emit a single structured line (scores, metrics) without going through tracing
    pub fn emit_json(event: &impl Serialize, w: &mut impl Write) -> std::io::Result<()> {
        let line = serde_json::to_string(event)?;
        writeln!(w, "{}", line)
    }
}
