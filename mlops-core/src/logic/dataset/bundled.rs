//! Bundled breast cancer dataset
//!
//! A synthetic stand-in shaped like the Wisconsin diagnostic breast cancer
//! data: 569 samples, 212 malignant and 357 benign, 30 cell-nucleus
//! measurements each. Every measurement is drawn independently from the
//! per-class mean and standard deviation of the real data, so the rows are
//! not real patients and carry no correlation between features. Scores from
//! a model trained here only show that the pipeline works; point
//! `dataset.path` at the real `breast_cancer.csv` for meaningful numbers.
//! Models trained on this data are tagged with `SOURCE` in their metadata.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

use super::{Dataset, DatasetError, DatasetResult};
use crate::logic::features::{class_labels, feature_names, FEATURE_COUNT};

pub const N_MALIGNANT: usize = 212;
pub const N_BENIGN: usize = 357;
pub const N_SAMPLES: usize = N_MALIGNANT + N_BENIGN;

/// `data_source` recorded for models trained on this dataset
pub const SOURCE: &str = "bundled-synthetic";

/// Seed used when callers do not care about the exact draw
pub const DEFAULT_SEED: u64 = 569;

/// (malignant mean, malignant std, benign mean, benign std) per feature
const CLASS_STATS: [(f64, f64, f64, f64); FEATURE_COUNT] = [
    (17.46, 3.20, 12.15, 1.78),          // mean radius
    (21.60, 3.78, 17.91, 4.00),          // mean texture
    (115.37, 21.85, 78.08, 11.81),       // mean perimeter
    (978.38, 367.94, 462.79, 134.29),    // mean area
    (0.1029, 0.0126, 0.0925, 0.0134),    // mean smoothness
    (0.1452, 0.0540, 0.0801, 0.0337),    // mean compactness
    (0.1608, 0.0750, 0.0461, 0.0434),    // mean concavity
    (0.0880, 0.0344, 0.0257, 0.0159),    // mean concave points
    (0.1929, 0.0276, 0.1742, 0.0248),    // mean symmetry
    (0.0627, 0.0076, 0.0629, 0.0067),    // mean fractal dimension
    (0.6091, 0.3455, 0.2841, 0.1126),    // radius error
    (1.2109, 0.4832, 1.2204, 0.5891),    // texture error
    (4.3239, 2.5689, 2.0003, 0.7711),    // perimeter error
    (72.67, 61.36, 21.14, 8.84),         // area error
    (0.00678, 0.00290, 0.00720, 0.00306), // smoothness error
    (0.0323, 0.0183, 0.0214, 0.0163),    // compactness error
    (0.0418, 0.0216, 0.0260, 0.0329),    // concavity error
    (0.0151, 0.0055, 0.00986, 0.00571),  // concave points error
    (0.0205, 0.0100, 0.0206, 0.0070),    // symmetry error
    (0.00406, 0.00204, 0.00364, 0.00294), // fractal dimension error
    (21.13, 4.28, 13.38, 1.98),          // worst radius
    (29.32, 5.43, 23.52, 5.49),          // worst texture
    (141.37, 29.46, 87.01, 13.53),       // worst perimeter
    (1422.29, 597.97, 558.90, 163.60),   // worst area
    (0.1448, 0.0219, 0.1250, 0.0200),    // worst smoothness
    (0.3748, 0.1703, 0.1827, 0.0924),    // worst compactness
    (0.4506, 0.1815, 0.1662, 0.1403),    // worst concavity
    (0.1822, 0.0469, 0.0744, 0.0358),    // worst concave points
    (0.3235, 0.0746, 0.2702, 0.0418),    // worst symmetry
    (0.0915, 0.0216, 0.0794, 0.0138),    // worst fractal dimension
];

/// Load the bundled dataset
///
/// Same seed, same rows. Measurements are non-negative.
pub fn load_breast_cancer(seed: u64) -> DatasetResult<Dataset> {
    let mut rng = StdRng::seed_from_u64(seed);

    let mut malignant = Vec::with_capacity(FEATURE_COUNT);
    let mut benign = Vec::with_capacity(FEATURE_COUNT);
    for &(m_mean, m_std, b_mean, b_std) in CLASS_STATS.iter() {
        malignant.push(normal(m_mean, m_std)?);
        benign.push(normal(b_mean, b_std)?);
    }

    let mut targets: Vec<usize> = std::iter::repeat(0)
        .take(N_MALIGNANT)
        .chain(std::iter::repeat(1).take(N_BENIGN))
        .collect();
    targets.shuffle(&mut rng);

    let mut features = Array2::<f64>::zeros((N_SAMPLES, FEATURE_COUNT));
    for (mut row, &target) in features.rows_mut().into_iter().zip(targets.iter()) {
        let dists = if target == 0 { &malignant } else { &benign };
        for (cell, dist) in row.iter_mut().zip(dists.iter()) {
            *cell = dist.sample(&mut rng).max(0.0);
        }
    }

    log::debug!(
        "Generated bundled dataset: {} samples ({} malignant, {} benign)",
        N_SAMPLES,
        N_MALIGNANT,
        N_BENIGN
    );

    Dataset::new(features, targets, feature_names(), class_labels())
}

fn normal(mean: f64, std: f64) -> DatasetResult<Normal<f64>> {
    Normal::new(mean, std).map_err(|e| DatasetError::Invalid(format!("bad feature stats: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_and_class_balance() {
        let data = load_breast_cancer(DEFAULT_SEED).unwrap();
        assert_eq!(data.features.dim(), (569, 30));
        assert_eq!(data.class_counts(), vec![212, 357]);
        assert_eq!(data.target_names, vec!["malignant", "benign"]);
    }

    #[test]
    fn test_same_seed_same_rows() {
        let a = load_breast_cancer(7).unwrap();
        let b = load_breast_cancer(7).unwrap();
        assert_eq!(a.features, b.features);
        assert_eq!(a.targets, b.targets);

        let c = load_breast_cancer(8).unwrap();
        assert_ne!(a.features, c.features);
    }

    #[test]
    fn test_values_non_negative_and_finite() {
        let data = load_breast_cancer(DEFAULT_SEED).unwrap();
        assert!(data.features.iter().all(|v| v.is_finite() && *v >= 0.0));
    }

    #[test]
    fn test_classes_differ_on_radius() {
        let data = load_breast_cancer(DEFAULT_SEED).unwrap();
        let mean_for = |class: usize| {
            let rows: Vec<f64> = (0..data.n_samples())
                .filter(|&i| data.targets[i] == class)
                .map(|i| data.features[[i, 0]])
                .collect();
            rows.iter().sum::<f64>() / rows.len() as f64
        };
        assert!(mean_for(0) > mean_for(1) + 3.0);
    }
}
