//! Model Module - Random Forest Classifier
//!
//! Training and serving share one `Pipeline` type: a `StandardScaler`
//! followed by a `RandomForest`, persisted as JSON together with the feature
//! layout hash it was trained against.

pub mod scaler;
pub mod tree;
pub mod forest;
pub mod pipeline;
pub mod prediction;
pub mod metadata;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use ndarray::{Array2, ArrayView2};

use crate::logic::features::LayoutMismatchError;

// Re-export common types
pub use forest::{ForestParams, MaxFeatures, RandomForest};
pub use metadata::ModelMetadata;
pub use pipeline::Pipeline;
pub use prediction::{argmax, Prediction};
pub use scaler::StandardScaler;
pub use tree::{DecisionTree, TreeNode};

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("model artifact not found: {0}")]
    ArtifactNotFound(PathBuf),

    #[error("model artifact I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("model artifact is not valid JSON: {0}")]
    Serde(#[from] serde_json::Error),

    #[error(transparent)]
    LayoutMismatch(#[from] LayoutMismatchError),

    #[error("unsupported model format version {found} (expected {expected})")]
    UnsupportedFormat { expected: u32, found: u32 },

    #[error("model artifact is corrupt: {0}")]
    Corrupt(String),

    #[error("expected {expected} features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

// ============================================================================
// CLASSIFIER TRAIT
// ============================================================================

/// Anything that turns a feature matrix into class probabilities
pub trait Classifier {
    fn n_features(&self) -> usize;

    fn n_classes(&self) -> usize;

    /// One row per sample, one column per class
    fn predict_proba(&self, x: ArrayView2<f64>) -> ModelResult<Array2<f64>>;

    /// Most probable class per sample
    fn predict(&self, x: ArrayView2<f64>) -> ModelResult<Vec<usize>> {
        let proba = self.predict_proba(x)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| argmax(&row.to_vec()))
            .collect())
    }
}
