//! Training configuration

use crate::error::{HeartwiseError, Result};
use crate::training::LogisticRegression;
use crate::utils::data_loader::DEFAULT_NA_TOKEN;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// CSV file with the 13 feature columns and the target column
    pub data_path: PathBuf,

    /// Target column name
    pub target_column: String,

    /// CSV cell content treated as missing
    #[serde(default = "default_na_token")]
    pub na_token: String,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Random seed for the stratified split
    pub random_state: u64,

    /// Directory that receives the persisted artifacts
    pub output_dir: PathBuf,

    /// File name of the persisted classifier
    pub model_file: String,

    /// File name of the persisted scaler
    pub scaler_file: String,

    /// Maximum gradient descent iterations
    pub max_iter: usize,

    /// Gradient descent step size
    pub learning_rate: f64,

    /// L2 regularization strength
    pub alpha: f64,

    /// Convergence tolerance on the gradient norm
    pub tol: f64,
}

fn default_na_token() -> String {
    DEFAULT_NA_TOKEN.to_string()
}

impl Default for TrainingConfig {
    fn default() -> Self {
        let classifier = LogisticRegression::new();
        Self {
            data_path: PathBuf::from("data.csv"),
            target_column: "target".to_string(),
            na_token: default_na_token(),
            test_size: 0.2,
            random_state: 42,
            output_dir: PathBuf::from("."),
            model_file: "model.json".to_string(),
            scaler_file: "scaler.json".to_string(),
            max_iter: classifier.max_iter,
            learning_rate: classifier.learning_rate,
            alpha: classifier.alpha,
            tol: classifier.tol,
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration for a CSV file
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            ..Default::default()
        }
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    pub fn with_na_token(mut self, token: impl Into<String>) -> Self {
        self.na_token = token.into();
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn model_path(&self) -> PathBuf {
        self.output_dir.join(&self.model_file)
    }

    pub fn scaler_path(&self) -> PathBuf {
        self.output_dir.join(&self.scaler_file)
    }

    pub fn data_path(&self) -> &Path {
        &self.data_path
    }

    /// Untrained classifier carrying the configured hyper-parameters
    pub fn classifier(&self) -> LogisticRegression {
        LogisticRegression::new()
            .with_max_iter(self.max_iter)
            .with_learning_rate(self.learning_rate)
            .with_alpha(self.alpha)
            .with_tol(self.tol)
    }

    /// Reject settings that would make the run meaningless
    pub fn validate(&self) -> Result<()> {
        let invalid = |name: &str, value: String, reason: &str| HeartwiseError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        };

        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(invalid(
                "test_size",
                self.test_size.to_string(),
                "must be strictly between 0 and 1",
            ));
        }
        if self.max_iter == 0 {
            return Err(invalid("max_iter", "0".to_string(), "must be at least 1"));
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(invalid(
                "learning_rate",
                self.learning_rate.to_string(),
                "must be positive",
            ));
        }
        if !(self.alpha >= 0.0 && self.alpha.is_finite()) {
            return Err(invalid("alpha", self.alpha.to_string(), "must be non-negative"));
        }
        if self.target_column.is_empty() {
            return Err(invalid("target_column", String::new(), "must not be empty"));
        }
        Ok(())
    }
}
