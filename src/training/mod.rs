//! Model training module
//!
//! Provides the training side of the heart-disease classifier:
//! - Binary logistic regression (L2, gradient descent)
//! - Row cleaning and label binarization
//! - Stratified, seeded train/test splitting
//! - Evaluation metrics (accuracy, ROC-AUC, confusion matrix)
//! - The end-to-end [`TrainingPipeline`]

mod config;
pub mod dataset;
pub mod linear_models;
pub mod metrics;
pub mod pipeline;
pub mod split;

pub use config::TrainingConfig;
pub use dataset::{binarize, CleanStats, TrainingDataset};
pub use linear_models::{sigmoid, LogisticRegression, DECISION_THRESHOLD};
pub use metrics::{roc_auc, ClassificationMetrics, ConfusionMatrix};
pub use pipeline::{FittedArtifacts, PipelineStage, TrainingOutcome, TrainingPipeline, TrainingReport};
pub use split::{stratified_split, TrainTestSplit};
