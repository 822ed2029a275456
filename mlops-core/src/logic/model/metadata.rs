//! Model Metadata
//!
//! Written next to the model artifact once training finishes and never
//! modified afterwards. The prediction service serves it as-is.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use super::forest::ForestParams;
use super::pipeline::Pipeline;
use super::{Classifier, ModelError, ModelResult};
use crate::constants;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub name: String,
    pub version: String,
    pub framework: String,
    pub trained_date: DateTime<Utc>,

    pub accuracy: f64,
    #[serde(default)]
    pub precision: f64,
    #[serde(default)]
    pub recall: f64,
    pub f1_score: f64,
    #[serde(default)]
    pub roc_auc: f64,

    /// Class names, indexed by predicted class
    pub classes: Vec<String>,
    pub n_features: usize,
    /// Wire names in the order the model expects them
    #[serde(default)]
    pub feature_names: Vec<String>,
    #[serde(default)]
    pub params: ForestParams,
    /// Training data: a CSV path, or the bundled synthetic set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,

    /// SHA-256 of the model file this metadata describes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_hash: Option<u32>,
}

impl ModelMetadata {
    /// Metadata for a freshly fitted pipeline; scores start at zero
    pub fn from_pipeline(pipeline: &Pipeline) -> Self {
        Self {
            name: constants::MODEL_NAME.to_string(),
            version: constants::MODEL_VERSION.to_string(),
            framework: constants::FRAMEWORK.to_string(),
            trained_date: Utc::now(),
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            roc_auc: 0.0,
            classes: pipeline.classes.clone(),
            n_features: pipeline.n_features(),
            feature_names: pipeline.feature_names.clone(),
            params: pipeline.params().clone(),
            data_source: None,
            model_sha256: None,
            layout_hash: Some(pipeline.layout_hash),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> ModelResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;

        log::info!("Saved model metadata to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> ModelResult<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ModelError::ArtifactNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

/// Hex SHA-256 of a file
pub fn file_sha256(path: impl AsRef<Path>) -> ModelResult<String> {
    let mut file = std::fs::File::open(path.as_ref())?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}
