//! Model information schemas

use chrono::{DateTime, Utc};
use mlops_core::logic::features::FEATURE_DESCRIPTIONS;
use mlops_core::ModelMetadata;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ModelMetadataResponse {
    pub model_name: String,
    pub model_type: String,
    pub version: String,
    pub trained_date: DateTime<Utc>,
    pub accuracy: f64,
    pub f1_score: f64,
    pub classes: Vec<String>,
    pub n_features: usize,
    pub framework: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_source: Option<String>,
}

impl From<&ModelMetadata> for ModelMetadataResponse {
    fn from(meta: &ModelMetadata) -> Self {
        Self {
            model_name: meta.name.clone(),
            model_type: meta.framework.clone(),
            version: meta.version.clone(),
            trained_date: meta.trained_date,
            accuracy: meta.accuracy,
            f1_score: meta.f1_score,
            classes: meta.classes.clone(),
            n_features: meta.n_features,
            framework: meta.framework.clone(),
            data_source: meta.data_source.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FeaturesResponse {
    pub features: Vec<String>,
    pub descriptions: Vec<String>,
    pub count: usize,
}

impl From<&ModelMetadata> for FeaturesResponse {
    fn from(meta: &ModelMetadata) -> Self {
        let descriptions = (0..meta.feature_names.len())
            .map(|i| FEATURE_DESCRIPTIONS.get(i).copied().unwrap_or("").to_string())
            .collect();

        Self {
            features: meta.feature_names.clone(),
            descriptions,
            count: meta.feature_names.len(),
        }
    }
}
