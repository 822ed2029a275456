//! Tracking Module - Experiment Tracking
//!
//! A finished training run is summarized as a `RunRecord` and handed to a
//! backend picked from the tracking URI:
//!
//! - `http://` / `https://` - MLflow tracking server (`mlflow`)
//! - `file://<dir>`, a bare path, or nothing - JSON files on disk (`local`)

pub mod local;
pub mod mlflow;

use std::collections::BTreeMap;
use std::future::Future;
use std::path::PathBuf;

use crate::constants;
use crate::logic::config::{TrackingSection, TrainingConfig};
use crate::logic::training::TrainingOutcome;

pub use local::LocalRunStore;
pub use mlflow::MlflowClient;

pub type TrackingResult<T> = Result<T, TrackingError>;

#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("tracking server unreachable: {0}")]
    Network(String),

    #[error("tracking server returned {status}: {body}")]
    Server { status: u16, body: String },

    #[error("unexpected tracking response: {0}")]
    Parse(String),

    #[error("unsupported tracking URI: {0}")]
    UnsupportedUri(String),

    #[error("run store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("run store JSON failed: {0}")]
    Serde(#[from] serde_json::Error),
}

// ============================================================================
// RUN RECORD
// ============================================================================

/// What gets logged for one run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunRecord {
    pub experiment_name: String,
    pub run_name: String,
    pub params: BTreeMap<String, String>,
    pub metrics: BTreeMap<String, f64>,
    pub tags: BTreeMap<String, String>,
}

impl RunRecord {
    pub fn new(experiment_name: &str, run_name: &str) -> Self {
        Self {
            experiment_name: experiment_name.to_string(),
            run_name: run_name.to_string(),
            ..Self::default()
        }
    }

    /// Config values as params, test-set scores as metrics, provenance as tags
    pub fn from_training(config: &TrainingConfig, outcome: &TrainingOutcome) -> Self {
        let mut record = Self::new(&config.tracking.experiment_name, &config.tracking.run_name);

        record.params.insert("test_size".into(), config.test_size.to_string());
        record.params.insert("random_state".into(), config.random_state.to_string());
        record.params.insert("stratify".into(), config.stratify.to_string());
        record.params.extend(config.model.params.to_pairs());

        for (key, value) in outcome.evaluation.scores.to_pairs() {
            record.metrics.insert(key.to_string(), value);
        }

        record.tags.insert(
            "model_path".into(),
            outcome.artifacts.model.display().to_string(),
        );
        if let Some(sha) = &outcome.metadata.model_sha256 {
            record.tags.insert("model_sha256".into(), sha.clone());
        }
        if let Some(source) = &outcome.metadata.data_source {
            record.tags.insert("data_source".into(), source.clone());
        }
        record
            .tags
            .insert("mlops_version".into(), constants::APP_VERSION.to_string());
        record
    }
}

// ============================================================================
// BACKENDS
// ============================================================================

/// Something that can store a run and hand back its id
pub trait Tracker {
    fn log_run(&self, record: &RunRecord) -> impl Future<Output = TrackingResult<String>> + Send;
}

pub enum TrackingBackend {
    Mlflow(MlflowClient),
    Local(LocalRunStore),
}

impl TrackingBackend {
    pub fn from_uri(uri: Option<&str>) -> TrackingResult<Self> {
        let uri = uri.map(str::trim).filter(|u| !u.is_empty());

        match uri {
            None => Ok(Self::Local(LocalRunStore::new(constants::DEFAULT_TRACKING_ROOT))),
            Some(u) if u.starts_with("http://") || u.starts_with("https://") => {
                Ok(Self::Mlflow(MlflowClient::new(u)?))
            }
            Some(u) if u.starts_with("file://") => {
                Ok(Self::Local(LocalRunStore::new(PathBuf::from(&u["file://".len()..]))))
            }
            Some(u) if !u.contains("://") => Ok(Self::Local(LocalRunStore::new(u))),
            Some(u) => Err(TrackingError::UnsupportedUri(u.to_string())),
        }
    }
}

impl Tracker for TrackingBackend {
    async fn log_run(&self, record: &RunRecord) -> TrackingResult<String> {
        match self {
            Self::Mlflow(client) => client.log_run(record).await,
            Self::Local(store) => store.log_run(record).await,
        }
    }
}

/// Log a run to whatever the tracking section points at
pub async fn record_run(section: &TrackingSection, record: &RunRecord) -> TrackingResult<String> {
    let backend = TrackingBackend::from_uri(section.tracking_uri.as_deref())?;
    backend.log_run(record).await
}
