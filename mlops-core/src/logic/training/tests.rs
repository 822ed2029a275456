//! Training pipeline tests

use super::*;
use crate::logic::config::TrainingConfig;
use crate::logic::features::FEATURE_COUNT;
use std::path::Path;

fn config_in(root: &Path) -> TrainingConfig {
    let mut config = TrainingConfig::default();
    config.model.params.n_estimators = 10;
    config.model.params.random_state = Some(42);
    config.paths.exported_model_dir = root.join("model");
    config.paths.params = root.join("params");
    config.paths.metrics = root.join("metrics");
    config.paths.results = root.join("results");
    config.tracking.enabled = false;
    config
}

#[test]
fn test_train_writes_all_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = train(&config_in(dir.path())).unwrap();

    let a = &outcome.artifacts;
    for path in [&a.model, &a.metadata, &a.params, &a.metrics, &a.results] {
        assert!(path.is_file(), "{} missing", path.display());
    }
    assert_eq!(a.model, dir.path().join("model/model.json"));

    assert!(outcome.evaluation.scores.accuracy > 0.9);
    assert_eq!(outcome.evaluation.confusion.total(), 114);
    assert_eq!(outcome.metadata.n_features, FEATURE_COUNT);
    assert!(outcome.metadata.model_sha256.is_some());
}

#[test]
fn test_saved_metrics_match_outcome() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = train(&config_in(dir.path())).unwrap();

    let saved = evaluate_saved(&outcome.artifacts.metrics).unwrap();
    let accuracy = saved["accuracy"].as_f64().unwrap();
    let f1 = saved["f1_score"].as_f64().unwrap();
    assert!((accuracy - outcome.evaluation.scores.accuracy).abs() < 1e-12);
    assert!((f1 - outcome.metadata.f1_score).abs() < 1e-12);
}

#[test]
fn test_exported_model_is_loadable() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let outcome = train(&config).unwrap();

    let path = export_model(&config.paths.exported_model_dir).unwrap();
    let loaded = Pipeline::load(&path).unwrap();
    assert_eq!(loaded.classes(), outcome.pipeline.classes());

    let sha = file_sha256(&path).unwrap();
    assert_eq!(outcome.metadata.model_sha256.as_deref(), Some(sha.as_str()));
}

#[test]
fn test_export_directory_is_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    std::fs::create_dir_all(&config.paths.exported_model_dir).unwrap();
    let stale = config.paths.exported_model_dir.join("stale.joblib");
    std::fs::write(&stale, "old").unwrap();

    train(&config).unwrap();
    assert!(!stale.exists());
}

#[test]
fn test_metadata_records_data_source() {
    let dir = tempfile::tempdir().unwrap();
    let outcome = train(&config_in(dir.path())).unwrap();
    assert_eq!(
        outcome.metadata.data_source.as_deref(),
        Some(crate::logic::dataset::bundled::SOURCE)
    );

    let mut config = config_in(dir.path());
    config.dataset.path = Some(dir.path().join("data/breast_cancer.csv"));
    assert_eq!(
        data_source(&config),
        dir.path().join("data/breast_cancer.csv").display().to_string()
    );
}

#[test]
fn test_invalid_config_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.test_size = 0.0;
    assert!(matches!(train(&config), Err(TrainingError::Config(_))));
}

#[test]
fn test_csv_dataset_is_used_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.dataset.path = Some(dir.path().join("absent.csv"));
    assert!(matches!(train(&config), Err(TrainingError::Dataset(_))));
}

#[tokio::test]
async fn test_run_records_to_local_store() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.tracking.enabled = true;
    config.tracking.tracking_uri = Some(format!("file://{}", dir.path().join("mlruns").display()));
    config.tracking.experiment_name = "unit".into();

    let outcome = run(config).await.unwrap();
    let run_id = outcome.run_id.expect("run should be tracked");
    assert!(dir.path().join("mlruns/unit").join(&run_id).join("metrics.json").is_file());

    let store = crate::logic::tracking::LocalRunStore::new(dir.path().join("mlruns"));
    let meta = store.load_meta("unit", &run_id).unwrap();
    assert_eq!(meta.tags["data_source"], crate::logic::dataset::bundled::SOURCE);
    assert_eq!(meta.tags["mlops_version"], crate::constants::APP_VERSION);
}

#[tokio::test]
async fn test_run_survives_unreachable_tracking_server() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(dir.path());
    config.tracking.enabled = true;
    config.tracking.tracking_uri = Some("http://127.0.0.1:9".into());

    let outcome = run(config).await.unwrap();
    assert!(outcome.run_id.is_none());
    assert!(outcome.artifacts.model.is_file());
}
