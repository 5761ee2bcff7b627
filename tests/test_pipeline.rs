//! Integration test: CSV → trained, persisted scaler + classifier

use heartwise::error::HeartwiseError;
use heartwise::export::Artifact;
use heartwise::features::{example_vector, FeatureVector, FEATURE_NAMES};
use heartwise::inference::{InferenceConfig, InferenceService};
use heartwise::preprocessing::StandardScaler;
use heartwise::training::{LogisticRegression, PipelineStage, TrainingConfig, TrainingPipeline};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// One synthetic patient; sick rows are older, with lower max heart rate
/// and higher ST depression
fn patient(i: usize) -> ([String; 13], u32) {
    let sick = (i * 7) % 10 < 4;
    let s = sick as usize;
    let row = [
        (40 + (i * 13) % 30 + s * 8).to_string(),
        (i % 2).to_string(),
        (i % 4 + 1).to_string(),
        (120 + (i * 7) % 40).to_string(),
        (200 + (i * 11) % 100).to_string(),
        u8::from(i % 5 == 0).to_string(),
        (i % 3).to_string(),
        (170 - (i * 3) % 30 - s * 20).to_string(),
        u8::from(sick && i % 3 == 0).to_string(),
        format!("{:.1}", ((i * 17) % 30) as f64 / 10.0 + s as f64),
        (i % 3 + 1).to_string(),
        if sick { (i % 4).to_string() } else { "0".to_string() },
        ["3", "6", "7"][i % 3].to_string(),
    ];
    let target = if sick { 1 + (i % 4) as u32 } else { 0 };
    (row, target)
}

fn heart_csv(n: usize, n_incomplete: usize) -> String {
    let mut csv = format!("{},target\n", FEATURE_NAMES.join(","));
    for i in 0..n {
        let (row, target) = patient(i);
        writeln!(csv, "{},{}", row.join(","), target).unwrap();
    }
    for i in 0..n_incomplete {
        let (mut row, target) = patient(n + i);
        row[11] = "?".to_string();
        row[12] = "?".to_string();
        writeln!(csv, "{},{}", row.join(","), target).unwrap();
    }
    csv
}

fn write_csv(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_csv_pipeline_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(dir.path(), "heart.csv", &heart_csv(100, 3));
    let out = dir.path().join("artifacts");

    let config = TrainingConfig::new(&data).with_output_dir(&out);
    let outcome = TrainingPipeline::new(config).run().unwrap();
    let report = &outcome.report;

    assert_eq!(report.stages.first(), Some(&PipelineStage::Loaded));
    assert_eq!(report.stages.last(), Some(&PipelineStage::Persisted));
    assert_eq!(report.stages.len(), 7);
    assert_eq!(report.rows_loaded, 103);
    assert_eq!(report.rows_dropped, 3);
    assert_eq!(report.n_test, 20);
    assert_eq!(report.n_train, 80);
    assert_eq!(report.metrics.n_samples, 20);
    assert_eq!(report.metrics.confusion_matrix.total(), 20);
    assert!(report.metrics.accuracy > 0.7, "accuracy {}", report.metrics.accuracy);
    assert!(report.metrics.auc_roc.is_some());

    assert_eq!(report.model_path, out.join("model.json"));
    assert!(report.model_path.exists());
    assert!(report.scaler_path.exists());
    assert_eq!(outcome.artifacts.scaler.n_samples_seen(), 80);
}

#[test]
fn test_persist_then_load_predicts_identically() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(dir.path(), "heart.csv", &heart_csv(60, 0));
    let config = TrainingConfig::new(&data).with_output_dir(dir.path());
    let outcome = TrainingPipeline::new(config.clone()).run().unwrap();

    let fresh = InferenceService::new(
        outcome.artifacts.scaler.clone(),
        outcome.artifacts.classifier.clone(),
    )
    .unwrap();
    let loaded = InferenceService::load(
        &InferenceConfig::new()
            .with_model_path(config.model_path())
            .with_scaler_path(config.scaler_path()),
    )
    .unwrap();

    assert_eq!(loaded.scaler(), &outcome.artifacts.scaler);
    assert_eq!(loaded.model(), &outcome.artifacts.classifier);
    for i in 0..60 {
        let (row, _) = patient(i);
        let values: Vec<f64> = row.iter().map(|v| v.parse().unwrap()).collect();
        let v = FeatureVector::try_from(values.as_slice()).unwrap();
        assert_eq!(fresh.predict_vector(&v).unwrap(), loaded.predict_vector(&v).unwrap());
    }
}

#[test]
fn test_zero_variance_features_do_not_crash() {
    let dir = tempfile::tempdir().unwrap();
    let (row, _) = patient(0);
    let mut csv = format!("{},target\n", FEATURE_NAMES.join(","));
    for i in 0..20 {
        writeln!(csv, "{},{}", row.join(","), i % 2).unwrap();
    }
    let data = write_csv(dir.path(), "flat.csv", &csv);

    let outcome = TrainingPipeline::new(TrainingConfig::new(&data).with_output_dir(dir.path()))
        .run()
        .unwrap();

    assert!(outcome.artifacts.scaler.stds().iter().all(|&s| s == 0.0));
    let service = InferenceService::new(outcome.artifacts.scaler, outcome.artifacts.classifier)
        .unwrap();
    let result = service.predict_vector(&example_vector()).unwrap();
    assert!(result.probability.is_finite());
    assert!((0.0..=1.0).contains(&result.probability));
}

#[test]
fn test_example_record_is_reproducible() {
    let run = |name: &str| {
        let dir = tempfile::tempdir().unwrap();
        let data = write_csv(dir.path(), name, &heart_csv(80, 2));
        let outcome = TrainingPipeline::new(TrainingConfig::new(&data).with_output_dir(dir.path()))
            .run()
            .unwrap();
        let service =
            InferenceService::new(outcome.artifacts.scaler, outcome.artifacts.classifier).unwrap();
        (
            service.predict(&example_vector().to_raw()).unwrap(),
            outcome.report.metrics,
        )
    };

    let (first, metrics_a) = run("a.csv");
    let (second, metrics_b) = run("b.csv");
    assert_eq!(first, second);
    assert_eq!(metrics_a, metrics_b);
}

#[test]
fn test_column_order_and_extra_columns_ignored() {
    let dir = tempfile::tempdir().unwrap();
    let ordered = write_csv(dir.path(), "ordered.csv", &heart_csv(50, 0));

    // Same rows, reversed columns plus an id column
    let mut names: Vec<&str> = FEATURE_NAMES.to_vec();
    names.push("target");
    names.reverse();
    let mut csv = format!("id,{}\n", names.join(","));
    for i in 0..50 {
        let (row, target) = patient(i);
        let mut cells: Vec<String> = row.to_vec();
        cells.push(target.to_string());
        cells.reverse();
        writeln!(csv, "{},{}", i, cells.join(",")).unwrap();
    }
    let shuffled = write_csv(dir.path(), "shuffled.csv", &csv);

    let fit = |data: &Path, out: &str| {
        TrainingPipeline::new(TrainingConfig::new(data).with_output_dir(dir.path().join(out)))
            .run()
            .unwrap()
            .artifacts
    };
    let a = fit(&ordered, "a");
    let b = fit(&shuffled, "b");
    assert_eq!(a.scaler, b.scaler);
    assert_eq!(a.classifier, b.classifier);
}

#[test]
fn test_missing_target_column_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(dir.path(), "heart.csv", &heart_csv(30, 0));
    let config = TrainingConfig::new(&data)
        .with_target("num")
        .with_output_dir(dir.path());

    let err = TrainingPipeline::new(config.clone()).run().unwrap_err();
    assert!(matches!(err, HeartwiseError::FeatureNotFound(ref c) if c == "num"));
    assert!(!config.model_path().exists());
    assert!(!config.scaler_path().exists());
}

#[test]
fn test_missing_csv_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainingConfig::new(dir.path().join("absent.csv")).with_output_dir(dir.path());
    assert!(matches!(
        TrainingPipeline::new(config).run(),
        Err(HeartwiseError::IoError(_))
    ));
}

#[test]
fn test_artifacts_reload_by_kind() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(dir.path(), "heart.csv", &heart_csv(40, 0));
    let config = TrainingConfig::new(&data).with_output_dir(dir.path());
    TrainingPipeline::new(config.clone()).run().unwrap();

    assert!(StandardScaler::load(&config.scaler_path()).is_ok());
    assert!(LogisticRegression::load(&config.model_path()).is_ok());
    assert!(matches!(
        StandardScaler::load(&config.model_path()),
        Err(HeartwiseError::SerializationError(_))
    ));
}

#[test]
fn test_custom_missing_token_drops_rows() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_csv(dir.path(), "heart.csv", &heart_csv(50, 4).replace('?', "NA"));
    let config = TrainingConfig::new(&data)
        .with_na_token("NA")
        .with_output_dir(dir.path());

    let report = TrainingPipeline::new(config).run().unwrap().report;
    assert_eq!(report.rows_loaded, 54);
    assert_eq!(report.rows_dropped, 4);
    assert_eq!(report.n_train + report.n_test, 50);
}
