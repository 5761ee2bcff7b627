//! Inference configuration

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for loading and serving the fitted artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Persisted classifier
    pub model_path: PathBuf,

    /// Persisted scaler
    pub scaler_path: PathBuf,

    /// Decimal places kept in the reported probability
    pub probability_decimals: u32,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.json"),
            scaler_path: PathBuf::from("scaler.json"),
            probability_decimals: 4,
        }
    }
}

impl InferenceConfig {
    /// Create a new inference configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the classifier path
    pub fn with_model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = path.into();
        self
    }

    /// Builder method to set the scaler path
    pub fn with_scaler_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.scaler_path = path.into();
        self
    }

    /// Builder method to set probability rounding
    pub fn with_probability_decimals(mut self, decimals: u32) -> Self {
        self.probability_decimals = decimals;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = InferenceConfig::default();
        assert_eq!(config.model_path, PathBuf::from("model.json"));
        assert_eq!(config.scaler_path, PathBuf::from("scaler.json"));
        assert_eq!(config.probability_decimals, 4);
    }

    #[test]
    fn test_builder() {
        let config = InferenceConfig::new()
            .with_model_path("out/m.json")
            .with_scaler_path("out/s.json")
            .with_probability_decimals(2);
        assert_eq!(config.model_path, PathBuf::from("out/m.json"));
        assert_eq!(config.probability_decimals, 2);
    }
}
