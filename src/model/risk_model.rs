//! Predictive risk model: features → standardization → random forest, with an
//! explicit Untrained/Trained state.

use super::evaluation::{mean_squared_error, r2_score, train_test_split};
use super::forest::RandomForestRegressor;
use super::scaler::StandardScaler;
use crate::config::ModelConfig;
use crate::error::{Result, RiskError};
use crate::features::{to_matrix, EncodeMode, EncoderRegistry, FeaturePipeline};
use crate::records::{TargetField, ThreatRecord};
use chrono::{DateTime, Utc};
use ndarray::Axis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::info;

/// Evaluation of a training run on the held-out partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingMetrics {
    pub mse: f64,
    pub rmse: f64,
    pub r2: f64,
    pub feature_importance: BTreeMap<String, f64>,
    pub target: TargetField,
    pub n_train: usize,
    pub n_test: usize,
    pub trained_at: DateTime<Utc>,
}

/// Everything a training run produces; replaced wholesale by the next run.
#[derive(Debug, Clone)]
pub struct TrainedModel {
    scaler: StandardScaler,
    forest: RandomForestRegressor,
    feature_columns: Vec<String>,
    metrics: TrainingMetrics,
}

impl TrainedModel {
    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn feature_columns(&self) -> &[String] {
        &self.feature_columns
    }

    pub fn metrics(&self) -> &TrainingMetrics {
        &self.metrics
    }
}

#[derive(Debug, Clone, Default)]
pub enum ModelState {
    #[default]
    Untrained,
    Trained(Box<TrainedModel>),
}

pub struct PredictiveRiskModel {
    config: ModelConfig,
    pipeline: FeaturePipeline,
    registry: EncoderRegistry,
    state: ModelState,
}

impl PredictiveRiskModel {
    pub fn new(config: ModelConfig) -> Result<Self> {
        Self::with_pipeline(config, FeaturePipeline::default())
    }

    pub fn with_pipeline(config: ModelConfig, pipeline: FeaturePipeline) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            pipeline,
            registry: EncoderRegistry::new(),
            state: ModelState::Untrained,
        })
    }

    /// Fit encoders (first sight of each field only), scaler and forest, and
    /// evaluate on a seeded 80/20 hold-out. Replaces any previous training.
    pub fn train(&mut self, records: &[ThreatRecord], target_col: &str) -> Result<TrainingMetrics> {
        let target: TargetField = target_col.parse()?;
        let split = train_test_split(records.len(), self.config.test_fraction, self.config.seed)?;

        let rows = self
            .pipeline
            .prepare(records, &mut self.registry, EncodeMode::Fit)?;
        let columns = self.pipeline.schema().columns();
        let x = to_matrix(&rows, &columns)?;
        let y: Vec<f64> = records.iter().map(|r| target.value(r)).collect();

        let x_train = x.select(Axis(0), &split.train);
        let x_test = x.select(Axis(0), &split.test);
        let y_train: Vec<f64> = split.train.iter().map(|&i| y[i]).collect();
        let y_test: Vec<f64> = split.test.iter().map(|&i| y[i]).collect();

        // statistics from the training partition only
        let scaler = StandardScaler::fit(&x_train)?;
        let forest = RandomForestRegressor::fit(&scaler.transform(&x_train)?, &y_train, &self.config)?;
        let predicted = forest.predict(&scaler.transform(&x_test)?)?;

        let mse = mean_squared_error(&y_test, &predicted);
        let metrics = TrainingMetrics {
            mse,
            rmse: mse.sqrt(),
            r2: r2_score(&y_test, &predicted),
            feature_importance: columns
                .iter()
                .cloned()
                .zip(forest.feature_importances().iter().copied())
                .collect(),
            target,
            n_train: split.train.len(),
            n_test: split.test.len(),
            trained_at: Utc::now(),
        };

        info!(
            target = target.column(),
            n_train = metrics.n_train,
            n_test = metrics.n_test,
            mse = metrics.mse,
            rmse = metrics.rmse,
            r2 = metrics.r2,
            "model trained"
        );

        self.state = ModelState::Trained(Box::new(TrainedModel {
            scaler,
            forest,
            feature_columns: columns,
            metrics: metrics.clone(),
        }));
        Ok(metrics)
    }

    /// One prediction per record, in input order. Encoders and scaler are used
    /// as fitted; unseen labels encode as Unknown.
    pub fn predict(&self, records: &[ThreatRecord]) -> Result<Vec<f64>> {
        let trained = self.trained()?;
        let rows = self.pipeline.transform(records, &self.registry)?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let x = to_matrix(&rows, &trained.feature_columns)?;
        trained.forest.predict(&trained.scaler.transform(&x)?)
    }

    /// Feature importances, highest first (ties by name).
    pub fn feature_importance(&self) -> Result<Vec<(String, f64)>> {
        let trained = self.trained()?;
        let mut ranking: Vec<(String, f64)> = trained
            .feature_columns
            .iter()
            .cloned()
            .zip(trained.forest.feature_importances().iter().copied())
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(ranking)
    }

    /// The trained state, or `ModelNotTrained`.
    pub fn trained(&self) -> Result<&TrainedModel> {
        match &self.state {
            ModelState::Trained(t) => Ok(t.as_ref()),
            ModelState::Untrained => Err(RiskError::ModelNotTrained),
        }
    }

    pub fn is_trained(&self) -> bool {
        matches!(self.state, ModelState::Trained(_))
    }

    pub fn state(&self) -> &ModelState {
        &self.state
    }

    pub fn registry(&self) -> &EncoderRegistry {
        &self.registry
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }
}
