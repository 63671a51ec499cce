//! Predictive risk model: standardization + random forest regression over prepared features.

mod evaluation;
mod forest;
mod risk_model;
mod scaler;

pub use evaluation::{mean_squared_error, r2_score, train_test_split, Split};
pub use forest::{RandomForestRegressor, RegressionTree};
pub use risk_model::{ModelState, PredictiveRiskModel, TrainedModel, TrainingMetrics};
pub use scaler::StandardScaler;
