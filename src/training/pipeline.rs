//! End-to-end training pipeline
//!
//! A run moves strictly forward through
//! `Loaded → Cleaned → Split → ScalerFit → ClassifierFit → Evaluated → Persisted`.
//! Any error before `Persisted` aborts the run and nothing is written; the
//! two artifacts are replaced together or not at all.
//! Evaluation metrics are reported but never gate persistence.

use super::dataset::{CleanStats, TrainingDataset};
use super::metrics::ClassificationMetrics;
use super::split::stratified_split;
use super::{LogisticRegression, TrainingConfig};
use crate::error::Result;
use crate::export::{write_atomic_all, Artifact};
use crate::preprocessing::StandardScaler;
use crate::utils::DataLoader;
use polars::prelude::DataFrame;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

/// Pipeline stages, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PipelineStage {
    Loaded,
    Cleaned,
    Split,
    ScalerFit,
    ClassifierFit,
    Evaluated,
    Persisted,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Loaded => "loaded",
            PipelineStage::Cleaned => "cleaned",
            PipelineStage::Split => "split",
            PipelineStage::ScalerFit => "scaler_fit",
            PipelineStage::ClassifierFit => "classifier_fit",
            PipelineStage::Evaluated => "evaluated",
            PipelineStage::Persisted => "persisted",
        };
        f.write_str(name)
    }
}

/// Records completed stages and refuses to go backwards
#[derive(Debug, Default)]
struct StageTracker {
    completed: Vec<PipelineStage>,
}

impl StageTracker {
    fn advance(&mut self, stage: PipelineStage) {
        debug_assert!(
            self.completed.last().map_or(true, |last| *last < stage),
            "pipeline stage {} after {:?}",
            stage,
            self.completed.last()
        );
        info!(stage = %stage, "Pipeline stage complete");
        self.completed.push(stage);
    }
}

/// The fitted scaler/classifier pair
#[derive(Debug, Clone)]
pub struct FittedArtifacts {
    pub scaler: StandardScaler,
    pub classifier: LogisticRegression,
}

/// Summary of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingReport {
    pub stages: Vec<PipelineStage>,
    pub rows_loaded: usize,
    pub rows_dropped: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub metrics: ClassificationMetrics,
    pub classifier_iterations: usize,
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
    pub training_time_secs: f64,
}

/// Result of [`TrainingPipeline::run`]
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub artifacts: FittedArtifacts,
    pub report: TrainingReport,
}

/// Batch training job: CSV in, persisted scaler and classifier out
pub struct TrainingPipeline {
    config: TrainingConfig,
}

impl TrainingPipeline {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Run from the configured CSV file
    pub fn run(&self) -> Result<TrainingOutcome> {
        self.config.validate()?;
        let mut tracker = StageTracker::default();

        let df = DataLoader::new()
            .with_na_token(&self.config.na_token)
            .load_csv(self.config.data_path())?;
        tracker.advance(PipelineStage::Loaded);

        self.from_loaded(&df, tracker)
    }

    /// Run on an already-loaded frame
    pub fn run_frame(&self, df: &DataFrame) -> Result<TrainingOutcome> {
        self.config.validate()?;
        let mut tracker = StageTracker::default();
        tracker.advance(PipelineStage::Loaded);
        self.from_loaded(df, tracker)
    }

    /// Run on rows that are already complete and binarized
    pub fn run_dataset(&self, dataset: TrainingDataset) -> Result<TrainingOutcome> {
        self.config.validate()?;
        let mut tracker = StageTracker::default();
        tracker.advance(PipelineStage::Loaded);
        tracker.advance(PipelineStage::Cleaned);
        let clean = CleanStats {
            rows_loaded: dataset.len(),
            rows_dropped: 0,
        };
        self.from_clean(dataset, clean, tracker)
    }

    fn from_loaded(&self, df: &DataFrame, mut tracker: StageTracker) -> Result<TrainingOutcome> {
        let (dataset, clean) = TrainingDataset::from_frame(df, &self.config.target_column)?;
        info!(
            rows_loaded = clean.rows_loaded,
            rows_dropped = clean.rows_dropped,
            rows_kept = clean.rows_kept(),
            positives = dataset.n_positive(),
            "Dropped rows with missing values"
        );
        tracker.advance(PipelineStage::Cleaned);
        self.from_clean(dataset, clean, tracker)
    }

    fn from_clean(
        &self,
        dataset: TrainingDataset,
        clean: CleanStats,
        mut tracker: StageTracker,
    ) -> Result<TrainingOutcome> {
        let start = Instant::now();

        let split = stratified_split(&dataset.labels, self.config.test_size, self.config.random_state)?;
        let train = dataset.select(&split.train_indices);
        let test = dataset.select(&split.test_indices);
        info!(
            n_train = train.len(),
            n_test = test.len(),
            train_positives = train.n_positive(),
            test_positives = test.n_positive(),
            seed = self.config.random_state,
            "Stratified split"
        );
        tracker.advance(PipelineStage::Split);

        let scaler = StandardScaler::fit(&train.features)?;
        let x_train = scaler.transform_array(&train.features)?;
        let x_test = scaler.transform_array(&test.features)?;
        let constant: Vec<&str> = scaler
            .params()
            .iter()
            .filter(|p| p.std == 0.0)
            .map(|p| p.feature.as_str())
            .collect();
        if !constant.is_empty() {
            debug!(features = ?constant, "Zero-variance features scale to 0");
        }
        tracker.advance(PipelineStage::ScalerFit);

        let mut classifier = self.config.classifier();
        classifier.fit(&x_train, &train.labels)?;
        info!(
            iterations = classifier.n_iter,
            max_iter = classifier.max_iter,
            intercept = classifier.intercept.unwrap_or(0.0),
            "Fitted logistic regression"
        );
        tracker.advance(PipelineStage::ClassifierFit);

        let y_prob = classifier.predict_proba(&x_test)?;
        let y_pred = classifier.predict(&x_test)?;
        let metrics = ClassificationMetrics::compute(&test.labels, &y_pred, &y_prob);
        info!(
            accuracy = metrics.accuracy,
            auc_roc = ?metrics.auc_roc,
            precision = metrics.precision,
            recall = metrics.recall,
            confusion = ?metrics.confusion_matrix.as_rows(),
            "Evaluated on held-out rows"
        );
        tracker.advance(PipelineStage::Evaluated);

        // Serialize both before touching disk
        let model_bytes = classifier.to_bytes()?;
        let scaler_bytes = scaler.to_bytes()?;
        let model_path = self.config.model_path();
        let scaler_path = self.config.scaler_path();
        write_atomic_all(&[
            (model_path.as_path(), model_bytes.as_slice()),
            (scaler_path.as_path(), scaler_bytes.as_slice()),
        ])?;
        info!(
            model = %model_path.display(),
            scaler = %scaler_path.display(),
            "Persisted artifacts"
        );
        tracker.advance(PipelineStage::Persisted);

        let report = TrainingReport {
            stages: tracker.completed,
            rows_loaded: clean.rows_loaded,
            rows_dropped: clean.rows_dropped,
            n_train: train.len(),
            n_test: test.len(),
            metrics,
            classifier_iterations: classifier.n_iter,
            model_path,
            scaler_path,
            training_time_secs: start.elapsed().as_secs_f64(),
        };

        Ok(TrainingOutcome {
            artifacts: FittedArtifacts { scaler, classifier },
            report,
        })
    }
}
