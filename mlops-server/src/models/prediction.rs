//! Prediction schemas

use chrono::{DateTime, Utc};
use mlops_core::Prediction;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

/// Upper bound on records per batch or invocation
pub const MAX_BATCH_SIZE: usize = 1000;

/// One record: feature name -> value
pub type PredictionRequest = Map<String, Value>;

#[derive(Debug, Serialize)]
pub struct PredictionResponse {
    pub prediction: usize,
    pub probability: Vec<f64>,
    pub confidence: f64,
    pub timestamp: DateTime<Utc>,
}

impl From<Prediction> for PredictionResponse {
    fn from(p: Prediction) -> Self {
        Self {
            prediction: p.class,
            probability: p.probabilities,
            confidence: p.confidence,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct BatchPredictionRequest {
    #[validate(length(min = 1, max = 1000, message = "must contain between 1 and 1000 records"))]
    pub records: Vec<PredictionRequest>,
}

#[derive(Debug, Serialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<PredictionResponse>,
    pub processing_time_ms: f64,
    pub total_records: usize,
}

// ============================================================================
// MLFLOW-COMPATIBLE INVOCATIONS
// ============================================================================

/// Either a `dataframe_split` frame or bare `instances` rows in layout order
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum InvocationsRequest {
    DataframeSplit { dataframe_split: DataframeSplit },
    Instances { instances: Vec<Vec<f64>> },
}

/// Column names plus row-major values
#[derive(Debug, Deserialize)]
pub struct DataframeSplit {
    pub columns: Vec<String>,
    pub data: Vec<Vec<f64>>,
}

/// `(class, probabilities)` serializes as `[class, [p0, p1]]`
pub type InvocationPrediction = (usize, Vec<f64>);

#[derive(Debug, Serialize)]
pub struct InvocationsResponse {
    pub predictions: Vec<InvocationPrediction>,
}

impl InvocationsResponse {
    pub fn from_predictions(predictions: Vec<Prediction>) -> Self {
        Self {
            predictions: predictions
                .into_iter()
                .map(|p| (p.class, p.probabilities))
                .collect(),
        }
    }
}
