//! Application state
//!
//! The model is loaded once at startup. If that fails the service still comes
//! up, answers health checks, and rejects predictions with 503 until it is
//! restarted with a usable artifact.

use std::sync::Arc;
use std::time::Instant;

use mlops_core::{ModelMetadata, Pipeline};

use crate::config::Config;
use crate::telemetry::ServiceMetrics;

/// Startup outcome of model loading; never changes afterwards
#[derive(Debug)]
pub enum ModelState {
    Starting { reason: String },
    Ready(Arc<Pipeline>),
}

impl ModelState {
    pub fn pipeline(&self) -> Option<&Arc<Pipeline>> {
        match self {
            ModelState::Ready(pipeline) => Some(pipeline),
            ModelState::Starting { .. } => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelState::Ready(_))
    }

    /// Human-readable state for the service index
    pub fn describe(&self) -> String {
        match self {
            ModelState::Ready(_) => "ready".to_string(),
            ModelState::Starting { reason } => format!("not loaded: {}", reason),
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub model: Arc<ModelState>,
    pub metadata: Option<Arc<ModelMetadata>>,
    pub metrics: Arc<ServiceMetrics>,
    pub config: Config,
    pub started_at: Instant,
}

impl AppState {
    /// Load model and metadata from `config.model_path`
    pub fn load(config: Config, metrics: Arc<ServiceMetrics>) -> Self {
        let model_file = config.model_file();
        let model = match Pipeline::load(&model_file) {
            Ok(pipeline) => {
                tracing::info!("Model loaded from {}", model_file.display());
                ModelState::Ready(Arc::new(pipeline))
            }
            Err(e) => {
                tracing::error!("Failed to load model: {}", e);
                ModelState::Starting {
                    reason: e.to_string(),
                }
            }
        };

        let metadata_file = config.metadata_file();
        let metadata = match ModelMetadata::load(&metadata_file) {
            Ok(meta) => {
                tracing::info!("Model metadata loaded from {}", metadata_file.display());
                Some(meta)
            }
            Err(e) => {
                tracing::warn!("Model metadata unavailable: {}", e);
                None
            }
        };

        Self::new(model, metadata, config, metrics)
    }

    pub fn new(
        model: ModelState,
        metadata: Option<ModelMetadata>,
        config: Config,
        metrics: Arc<ServiceMetrics>,
    ) -> Self {
        metrics.model_loaded.set(if model.is_loaded() { 1.0 } else { 0.0 });

        Self {
            model: Arc::new(model),
            metadata: metadata.map(Arc::new),
            metrics,
            config,
            started_at: Instant::now(),
        }
    }

    /// Loaded pipeline, or 503
    pub fn pipeline(&self) -> Result<Arc<Pipeline>, crate::AppError> {
        self.model
            .pipeline()
            .cloned()
            .ok_or(crate::AppError::ModelNotLoaded)
    }
}
