//! Inference service implementation
//!
//! The service owns a read-only scaler/classifier pair. Nothing is mutated
//! after construction, so one instance can be shared across threads (behind
//! an `Arc`) without locks.

use super::InferenceConfig;
use crate::error::Result;
use crate::export::Artifact;
use crate::features::{self, FeatureVector, RawRecord, N_FEATURES};
use crate::preprocessing::StandardScaler;
use crate::training::{LogisticRegression, DECISION_THRESHOLD};
use crate::utils::round_to;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Outcome of a single prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// 1 = heart disease, 0 = no heart disease
    pub prediction: u8,
    /// Probability of heart disease, rounded
    pub probability: f64,
}

impl PredictionResult {
    pub fn has_disease(&self) -> bool {
        self.prediction == 1
    }

    /// Human-readable label
    pub fn label_text(&self) -> &'static str {
        if self.has_disease() {
            "Heart disease"
        } else {
            "No heart disease"
        }
    }

    /// Probability as a percentage with two decimals, e.g. `"87.31%"`
    pub fn percent_text(&self) -> String {
        format!("{:.2}%", self.probability * 100.0)
    }
}

/// Immutable scaler + classifier, validated once at construction
#[derive(Debug, Clone)]
pub struct InferenceService {
    scaler: StandardScaler,
    model: LogisticRegression,
    config: InferenceConfig,
}

impl InferenceService {
    /// Wrap an already-fitted pair
    pub fn new(scaler: StandardScaler, model: LogisticRegression) -> Result<Self> {
        Self::with_config(scaler, model, InferenceConfig::default())
    }

    pub fn with_config(
        scaler: StandardScaler,
        model: LogisticRegression,
        config: InferenceConfig,
    ) -> Result<Self> {
        scaler.check_integrity()?;
        model.check_integrity(N_FEATURES)?;
        Ok(Self {
            scaler,
            model,
            config,
        })
    }

    /// Load both artifacts from the configured paths
    pub fn load(config: &InferenceConfig) -> Result<Self> {
        let scaler = StandardScaler::load(&config.scaler_path)?;
        let model = LogisticRegression::load(&config.model_path)?;
        info!(
            model = %config.model_path.display(),
            scaler = %config.scaler_path.display(),
            scaler_samples = scaler.n_samples_seen(),
            "Loaded inference artifacts"
        );
        Self::with_config(scaler, model, config.clone())
    }

    /// Validate, scale and classify one raw record
    pub fn predict(&self, raw: &RawRecord) -> Result<PredictionResult> {
        let vector = features::validate(raw)?;
        self.predict_vector(&vector)
    }

    /// Classify a vector that already passed validation
    pub fn predict_vector(&self, vector: &FeatureVector) -> Result<PredictionResult> {
        let scaled = self.scaler.transform(vector);
        let p = self.model.predict_probability(&scaled)?;
        // Label comes from the unrounded probability
        let prediction = u8::from(p >= DECISION_THRESHOLD);
        let result = PredictionResult {
            prediction,
            probability: round_to(p, self.config.probability_decimals),
        };
        debug!(
            prediction = result.prediction,
            probability = result.probability,
            "Prediction"
        );
        Ok(result)
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn model(&self) -> &LogisticRegression {
        &self.model
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }
}
