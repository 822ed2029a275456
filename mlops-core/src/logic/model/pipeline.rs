//! Pipeline - scaler followed by forest
//!
//! The unit that gets trained, saved, loaded and served. The artifact records
//! the feature layout version and hash so a model trained for another layout
//! is refused at load time instead of silently mis-predicting.

use std::path::Path;

use ndarray::{Array2, ArrayView2};
use serde::{Deserialize, Serialize};

use super::forest::{ForestParams, RandomForest};
use super::prediction::Prediction;
use super::scaler::StandardScaler;
use super::{Classifier, ModelError, ModelResult};
use crate::constants::MODEL_FORMAT_VERSION;
use crate::logic::dataset::Dataset;
use crate::logic::features::layout::validate_layout;
use crate::logic::features::{layout_hash, FeatureVector, FEATURE_COUNT, FEATURE_VERSION};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub format_version: u32,
    pub layout_version: u8,
    pub layout_hash: u32,
    pub feature_names: Vec<String>,
    pub classes: Vec<String>,
    pub scaler: StandardScaler,
    pub forest: RandomForest,
}

impl Pipeline {
    /// Fit scaler and forest on a dataset in the current feature layout
    pub fn fit(dataset: &Dataset, params: &ForestParams) -> ModelResult<Self> {
        if dataset.n_features() != FEATURE_COUNT {
            return Err(ModelError::ShapeMismatch {
                expected: FEATURE_COUNT,
                actual: dataset.n_features(),
            });
        }

        let scaler = StandardScaler::fit(dataset.features.view())?;
        let scaled = scaler.transform(dataset.features.view())?;
        let forest = RandomForest::fit(
            scaled.view(),
            &dataset.targets,
            dataset.n_classes(),
            params,
        )?;

        log::info!(
            "Fitted pipeline: {} samples, {} features, {} trees",
            dataset.n_samples(),
            dataset.n_features(),
            forest.trees().len()
        );

        Ok(Self {
            format_version: MODEL_FORMAT_VERSION,
            layout_version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            feature_names: dataset.feature_names.clone(),
            classes: dataset.target_names.clone(),
            scaler,
            forest,
        })
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn params(&self) -> &ForestParams {
        self.forest.params()
    }

    pub fn predict_one(&self, features: &FeatureVector) -> ModelResult<Prediction> {
        let mut predictions = self.predict_batch(std::slice::from_ref(features))?;
        predictions
            .pop()
            .ok_or_else(|| ModelError::InvalidInput("no prediction produced".into()))
    }

    /// Predictions come back in input order
    pub fn predict_batch(&self, rows: &[FeatureVector]) -> ModelResult<Vec<Prediction>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let mut values = Vec::with_capacity(rows.len() * FEATURE_COUNT);
        for row in rows {
            values.extend_from_slice(row.as_slice());
        }
        let x = Array2::from_shape_vec((rows.len(), FEATURE_COUNT), values)
            .map_err(|e| ModelError::InvalidInput(e.to_string()))?;

        let proba = self.predict_proba(x.view())?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| Prediction::from_probabilities(row.to_vec()))
            .collect())
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    pub fn save(&self, path: impl AsRef<Path>) -> ModelResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_vec(self)?;
        std::fs::write(path, json)?;

        log::info!("Saved model to {}", path.display());
        Ok(())
    }

    /// Load and validate a saved pipeline
    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ModelError::ArtifactNotFound(path.to_path_buf()));
        }

        let bytes = std::fs::read(path)?;
        let pipeline: Self = serde_json::from_slice(&bytes)?;
        pipeline.validate()?;

        log::info!(
            "Loaded model from {} ({} trees, layout hash {:08x})",
            path.display(),
            pipeline.forest.trees().len(),
            pipeline.layout_hash
        );
        Ok(pipeline)
    }

    fn validate(&self) -> ModelResult<()> {
        if self.format_version != MODEL_FORMAT_VERSION {
            return Err(ModelError::UnsupportedFormat {
                expected: MODEL_FORMAT_VERSION,
                found: self.format_version,
            });
        }

        validate_layout(self.layout_version, self.layout_hash)?;

        if self.feature_names.len() != FEATURE_COUNT
            || self.scaler.n_features() != FEATURE_COUNT
            || self.forest.n_features() != FEATURE_COUNT
        {
            return Err(ModelError::Corrupt(format!(
                "artifact does not describe {} features",
                FEATURE_COUNT
            )));
        }
        if self.classes.len() != self.forest.n_classes() {
            return Err(ModelError::Corrupt(format!(
                "{} class names for {} classes",
                self.classes.len(),
                self.forest.n_classes()
            )));
        }

        self.forest.validate()
    }
}

impl Classifier for Pipeline {
    fn n_features(&self) -> usize {
        self.scaler.n_features()
    }

    fn n_classes(&self) -> usize {
        self.forest.n_classes()
    }

    fn predict_proba(&self, x: ArrayView2<f64>) -> ModelResult<Array2<f64>> {
        let scaled = self.scaler.transform(x)?;
        self.forest.predict_proba(scaled.view())
    }
}
