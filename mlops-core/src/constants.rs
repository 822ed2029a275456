//! Central Configuration Constants
//!
//! Single source of truth for artifact names and defaults shared by the
//! training CLI and the prediction service.

/// Default training configuration file
pub const DEFAULT_CONFIG_PATH: &str = "configs.yaml";

/// Default directory holding the exported model artifacts
pub const DEFAULT_MODEL_DIR: &str = "artifacts/model";

/// Serialized pipeline file name inside the model directory
pub const MODEL_FILE_NAME: &str = "model.json";

/// Metadata file name inside the model directory
pub const METADATA_FILE_NAME: &str = "metadata.json";

/// Default metrics report written by training
pub const DEFAULT_METRICS_FILE: &str = "artifacts/metrics/metrics.txt";

/// Model name recorded in metadata
pub const MODEL_NAME: &str = "RandomForestClassifier";

/// Model version recorded in metadata
pub const MODEL_VERSION: &str = "1.0.0";

/// Framework recorded in metadata
pub const FRAMEWORK: &str = "mlops-core";

/// Serialized pipeline format version
pub const MODEL_FORMAT_VERSION: u32 = 1;

/// Crate version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local tracking store root when no tracking server is configured
pub const DEFAULT_TRACKING_ROOT: &str = "mlruns";

/// Default experiment name
pub const DEFAULT_EXPERIMENT_NAME: &str = "My Experiment";

/// Default run name
pub const DEFAULT_RUN_NAME: &str = "train";

// ============================================
// Helper functions to read from env with fallback
// ============================================

/// Tracking URI from environment, if set and non-empty
pub fn get_tracking_uri() -> Option<String> {
    std::env::var("MLFLOW_TRACKING_URI")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Experiment name from environment or default
pub fn get_experiment_name() -> Option<String> {
    std::env::var("MLFLOW_EXPERIMENT_NAME")
        .ok()
        .filter(|s| !s.trim().is_empty())
}

/// Run name from environment or default
pub fn get_run_name() -> Option<String> {
    std::env::var("MLFLOW_RUN_NAME")
        .ok()
        .filter(|s| !s.trim().is_empty())
}
