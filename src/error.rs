//! Error types for the heartwise crate

use thiserror::Error;

use crate::features::ValidationError;

/// Result type alias for heartwise operations
pub type Result<T> = std::result::Result<T, HeartwiseError>;

/// Main error type for training, persistence and inference
#[derive(Error, Debug)]
pub enum HeartwiseError {
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl HeartwiseError {
    /// True for failures caused by caller-supplied feature values.
    pub fn is_validation(&self) -> bool {
        matches!(self, HeartwiseError::Validation(_))
    }
}

impl From<polars::error::PolarsError> for HeartwiseError {
    fn from(err: polars::error::PolarsError) -> Self {
        HeartwiseError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for HeartwiseError {
    fn from(err: serde_json::Error) -> Self {
        HeartwiseError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for HeartwiseError {
    fn from(err: ndarray::ShapeError) -> Self {
        HeartwiseError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HeartwiseError::DataError("test error".to_string());
        assert_eq!(err.to_string(), "Data error: test error");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HeartwiseError = io_err.into();
        assert!(matches!(err, HeartwiseError::IoError(_)));
    }

    #[test]
    fn test_validation_errors_are_flagged() {
        let err: HeartwiseError = ValidationError::MissingField("thal").into();
        assert!(err.is_validation());
        assert!(!HeartwiseError::ModelNotFitted.is_validation());
    }
}
