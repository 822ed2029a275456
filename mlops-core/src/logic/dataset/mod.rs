//! Dataset Module - Training Data
//!
//! Provides the breast cancer classification data (569 samples, 30 numeric
//! features, binary target) and the train/test split used by training.
//!
//! - `bundled` - built-in dataset, no files needed
//! - `loader` - the same layout read from a scikit-learn style CSV
//! - `split` - seeded, optionally stratified train/test split

pub mod bundled;
pub mod loader;
pub mod split;

#[cfg(test)]
mod tests;

use ndarray::{Array2, ArrayView1};

pub use bundled::load_breast_cancer;
pub use loader::load_csv;
pub use split::{train_test_split, TrainTestSplit};

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid dataset: {0}")]
    Invalid(String),
}

/// Feature matrix plus integer class targets
#[derive(Debug, Clone)]
pub struct Dataset {
    /// One row per sample, FEATURE_LAYOUT column order
    pub features: Array2<f64>,
    /// Class index per sample (0 = malignant, 1 = benign)
    pub targets: Vec<usize>,
    pub feature_names: Vec<String>,
    pub target_names: Vec<String>,
}

impl Dataset {
    pub fn new(
        features: Array2<f64>,
        targets: Vec<usize>,
        feature_names: Vec<String>,
        target_names: Vec<String>,
    ) -> DatasetResult<Self> {
        if features.nrows() != targets.len() {
            return Err(DatasetError::Invalid(format!(
                "{} feature rows but {} targets",
                features.nrows(),
                targets.len()
            )));
        }
        if features.ncols() != feature_names.len() {
            return Err(DatasetError::Invalid(format!(
                "{} feature columns but {} feature names",
                features.ncols(),
                feature_names.len()
            )));
        }
        if let Some(&bad) = targets.iter().find(|&&t| t >= target_names.len()) {
            return Err(DatasetError::Invalid(format!(
                "target {} outside {} classes",
                bad,
                target_names.len()
            )));
        }

        Ok(Self {
            features,
            targets,
            feature_names,
            target_names,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.targets.len()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn n_classes(&self) -> usize {
        self.target_names.len()
    }

    pub fn row(&self, index: usize) -> ArrayView1<'_, f64> {
        self.features.row(index)
    }

    /// Samples per class, indexed by class
    pub fn class_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_classes()];
        for &t in &self.targets {
            counts[t] += 1;
        }
        counts
    }

    /// New dataset made of the given rows, in the given order
    pub fn subset(&self, indices: &[usize]) -> Self {
        Self {
            features: self.features.select(ndarray::Axis(0), indices),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
            feature_names: self.feature_names.clone(),
            target_names: self.target_names.clone(),
        }
    }
}
