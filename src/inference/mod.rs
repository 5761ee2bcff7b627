//! Inference module
//!
//! Serves predictions from a persisted scaler/classifier pair:
//! - Raw record validation through the feature contract
//! - Scaling with the training-time statistics
//! - Label + rounded probability of heart disease
//!
//! Shared by the web server, the terminal form and the `predict` command.

mod config;
mod engine;

pub use config::InferenceConfig;
pub use engine::{InferenceService, PredictionResult};
