//! Heartwise - heart-disease risk classifier
//!
//! This crate trains a logistic-regression classifier on 13 clinical
//! features, persists the fitted scaler and classifier, and serves
//! predictions from them:
//! - Feature contract and raw-input validation
//! - Standard scaling fit on the training split
//! - Stratified, seeded training pipeline with evaluation metrics
//! - Immutable, thread-safe inference service
//! - Web server and CLI front-ends
//!
//! # Modules
//!
//! ## Core
//! - [`features`] - Feature names, order and validation
//! - [`preprocessing`] - Standard scaling
//! - [`training`] - Logistic regression, splitting, metrics, pipeline
//! - [`inference`] - Prediction service over the persisted artifacts
//! - [`export`] - Artifact save/load
//!
//! ## Services
//! - [`server`] - HTTP server with the prediction form and JSON endpoint
//! - [`cli`] - Command-line interface and terminal form
//!
//! ## Utilities
//! - [`utils`] - CSV loading and rounding helpers

// Core error handling
pub mod error;

// Core ML modules
pub mod features;
pub mod preprocessing;
pub mod training;
pub mod inference;
pub mod export;

// Utilities
pub mod utils;

// Services
pub mod server;
pub mod cli;

pub use error::{HeartwiseError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{HeartwiseError, Result};

    // Feature contract
    pub use crate::features::{
        validate, FeatureVector, RawRecord, RawValue, ValidationError, EXAMPLE_RECORD,
        FEATURE_NAMES, N_FEATURES,
    };

    // Preprocessing
    pub use crate::preprocessing::{ScaledVector, StandardScaler};

    // Training
    pub use crate::training::{
        ClassificationMetrics, LogisticRegression, TrainingConfig, TrainingPipeline, TrainingReport,
    };

    // Inference
    pub use crate::inference::{InferenceConfig, InferenceService, PredictionResult};

    // Export
    pub use crate::export::Artifact;
}
