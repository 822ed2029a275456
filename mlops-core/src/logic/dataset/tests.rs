//! Dataset integration tests

use super::*;
use crate::logic::features::{FEATURE_COUNT, FEATURE_LAYOUT};
use ndarray::Array2;

#[test]
fn test_bundled_dataset_uses_feature_layout() {
    let data = load_breast_cancer(bundled::DEFAULT_SEED).unwrap();
    assert_eq!(data.n_features(), FEATURE_COUNT);
    assert_eq!(data.feature_names.len(), FEATURE_COUNT);
    assert_eq!(data.feature_names[0], FEATURE_LAYOUT[0]);
    assert_eq!(data.n_classes(), 2);
}

#[test]
fn test_new_rejects_mismatched_shapes() {
    let names: Vec<String> = (0..3).map(|i| format!("f{}", i)).collect();
    let classes = vec!["a".to_string(), "b".to_string()];

    let rows_vs_targets = Dataset::new(Array2::zeros((4, 3)), vec![0, 1], names.clone(), classes.clone());
    assert!(matches!(rows_vs_targets, Err(DatasetError::Invalid(_))));

    let cols_vs_names = Dataset::new(Array2::zeros((2, 2)), vec![0, 1], names.clone(), classes.clone());
    assert!(cols_vs_names.is_err());

    let bad_target = Dataset::new(Array2::zeros((2, 3)), vec![0, 2], names, classes);
    assert!(bad_target.is_err());
}

#[test]
fn test_subset_keeps_order() {
    let names: Vec<String> = (0..2).map(|i| format!("f{}", i)).collect();
    let classes = vec!["a".to_string(), "b".to_string()];
    let features = Array2::from_shape_vec((3, 2), vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0]).unwrap();
    let data = Dataset::new(features, vec![0, 1, 0], names, classes).unwrap();

    let sub = data.subset(&[2, 0]);
    assert_eq!(sub.n_samples(), 2);
    assert_eq!(sub.row(0)[0], 2.0);
    assert_eq!(sub.row(1)[0], 0.0);
    assert_eq!(sub.targets, vec![0, 0]);
}

#[test]
fn test_split_keeps_class_ratio() {
    let data = load_breast_cancer(bundled::DEFAULT_SEED).unwrap();
    let split = train_test_split(&data, 0.25, 42, true).unwrap();

    let ratio = |d: &Dataset| d.class_counts()[0] as f64 / d.n_samples() as f64;
    assert!((ratio(&split.train) - ratio(&data)).abs() < 0.01);
    assert!((ratio(&split.test) - ratio(&data)).abs() < 0.01);
    assert_eq!(split.train.n_samples() + split.test.n_samples(), data.n_samples());
}
