//! Pipeline integration tests

use super::*;
use crate::logic::dataset::{load_breast_cancer, train_test_split};
use crate::logic::features::{FeatureVector, FEATURE_COUNT};

fn fitted() -> (Pipeline, crate::logic::dataset::TrainTestSplit) {
    let data = load_breast_cancer(11).unwrap();
    let split = train_test_split(&data, 0.2, 42, true).unwrap();
    let params = ForestParams {
        n_estimators: 20,
        random_state: Some(42),
        ..ForestParams::default()
    };
    (Pipeline::fit(&split.train, &params).unwrap(), split)
}

#[test]
fn test_pipeline_generalizes() {
    let (pipeline, split) = fitted();
    let predicted = pipeline.predict(split.test.features.view()).unwrap();
    let correct = predicted
        .iter()
        .zip(&split.test.targets)
        .filter(|(p, t)| p == t)
        .count();
    let accuracy = correct as f64 / split.test.n_samples() as f64;
    assert!(accuracy > 0.9, "accuracy {}", accuracy);
}

#[test]
fn test_predict_batch_matches_predict_one() {
    let (pipeline, split) = fitted();
    let rows: Vec<FeatureVector> = (0..5)
        .map(|i| FeatureVector::from_row(&split.test.row(i).to_vec()).unwrap())
        .collect();

    let batch = pipeline.predict_batch(&rows).unwrap();
    assert_eq!(batch.len(), 5);
    for (row, prediction) in rows.iter().zip(&batch) {
        assert_eq!(&pipeline.predict_one(row).unwrap(), prediction);
        assert!((prediction.probabilities.iter().sum::<f64>() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn test_uniform_input_is_well_formed() {
    let (pipeline, _) = fitted();
    let prediction = pipeline.predict_one(&FeatureVector::uniform(0.5)).unwrap();
    assert!(prediction.class == 0 || prediction.class == 1);
    assert!(prediction.confidence >= 0.5);
    assert_eq!(prediction.probabilities.len(), 2);
}

#[test]
fn test_save_load_round_trip() {
    let (pipeline, split) = fitted();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    pipeline.save(&path).unwrap();

    let loaded = Pipeline::load(&path).unwrap();
    assert_eq!(loaded.classes(), pipeline.classes());
    assert_eq!(loaded.feature_names, pipeline.feature_names);
    assert_eq!(
        loaded.predict(split.test.features.view()).unwrap(),
        pipeline.predict(split.test.features.view()).unwrap()
    );
}

#[test]
fn test_load_refuses_other_layout() {
    let (mut pipeline, _) = fitted();
    pipeline.layout_hash ^= 0xdead_beef;

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("model.json");
    pipeline.save(&path).unwrap();

    let err = Pipeline::load(&path).unwrap_err();
    assert!(matches!(err, ModelError::LayoutMismatch(_)));
    assert!(err.to_string().contains("feature layout"));
}

#[test]
fn test_load_missing_and_garbage() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        Pipeline::load(dir.path().join("absent.json")),
        Err(ModelError::ArtifactNotFound(_))
    ));

    let path = dir.path().join("garbage.json");
    std::fs::write(&path, "{not json").unwrap();
    assert!(matches!(Pipeline::load(&path), Err(ModelError::Serde(_))));
}

#[test]
fn test_metadata_from_pipeline() {
    let (pipeline, _) = fitted();
    let meta = ModelMetadata::from_pipeline(&pipeline);
    assert_eq!(meta.n_features, FEATURE_COUNT);
    assert_eq!(meta.classes, vec!["malignant", "benign"]);
    assert_eq!(meta.params.n_estimators, 20);
    assert_eq!(meta.layout_hash, Some(pipeline.layout_hash));
}
