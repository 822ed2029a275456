//! Training Configuration
//!
//! Loaded from a YAML file (`configs.yaml` by default). Every key is optional;
//! missing keys take the defaults below, and an empty file yields
//! `TrainingConfig::default()`.
//!
//! ```yaml
//! test_size: 0.2
//! random_state: 42
//! stratify: true
//! model:
//!   params:
//!     n_estimators: 100
//!     max_depth: null
//! paths:
//!   exported_model_dir: artifacts/model
//! tracking:
//!   enabled: true
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::logic::model::ForestParams;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of the dataset held out for evaluation
    pub test_size: f64,
    /// Seed for the train/test split
    pub random_state: u64,
    /// Keep class proportions in both splits
    pub stratify: bool,
    pub model: ModelSection,
    pub dataset: DatasetSection,
    pub paths: PathsSection,
    pub tracking: TrackingSection,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: 0.2,
            random_state: 42,
            stratify: true,
            model: ModelSection::default(),
            dataset: DatasetSection::default(),
            paths: PathsSection::default(),
            tracking: TrackingSection::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSection {
    pub params: ForestParams,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetSection {
    /// CSV in the scikit-learn breast_cancer.csv layout; bundled data when unset
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub exported_model_dir: PathBuf,
    pub params: PathBuf,
    pub metrics: PathBuf,
    pub results: PathBuf,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            exported_model_dir: PathBuf::from(constants::DEFAULT_MODEL_DIR),
            params: PathBuf::from("artifacts/params"),
            metrics: PathBuf::from("artifacts/metrics"),
            results: PathBuf::from("artifacts/results"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackingSection {
    pub enabled: bool,
    /// `http(s)://` for an MLflow server, `file://` or unset for a local store
    pub tracking_uri: Option<String>,
    pub experiment_name: String,
    pub run_name: String,
}

impl Default for TrackingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            tracking_uri: None,
            experiment_name: constants::DEFAULT_EXPERIMENT_NAME.to_string(),
            run_name: constants::DEFAULT_RUN_NAME.to_string(),
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

impl TrainingConfig {
    /// Load and validate a YAML config file
    ///
    /// A relative path that does not exist under the working directory is
    /// retried relative to this crate's directory.
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = resolve_path(path.as_ref());

        let text = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
            path: path.clone(),
            source,
        })?;

        let config = Self::from_yaml_str(&text).map_err(|err| match err {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.clone(),
                source,
            },
            other => other,
        })?;

        log::info!("Loaded training config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML text
    pub fn from_yaml_str(text: &str) -> ConfigResult<Self> {
        let config = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str::<Option<Self>>(text)
                .map_err(|source| ConfigError::Parse {
                    path: PathBuf::new(),
                    source,
                })?
                .unwrap_or_default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the trainer cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }

        let params = &self.model.params;
        if params.n_estimators == 0 {
            return Err(ConfigError::Invalid("n_estimators must be at least 1".into()));
        }
        if params.min_samples_split < 2 {
            return Err(ConfigError::Invalid("min_samples_split must be at least 2".into()));
        }
        if params.min_samples_leaf == 0 {
            return Err(ConfigError::Invalid("min_samples_leaf must be at least 1".into()));
        }
        if params.max_depth == Some(0) {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }

        Ok(())
    }

    /// MLFLOW_* environment variables win over the file
    pub fn apply_env_overrides(&mut self) {
        if let Some(uri) = constants::get_tracking_uri() {
            self.tracking.tracking_uri = Some(uri);
        }
        if let Some(name) = constants::get_experiment_name() {
            self.tracking.experiment_name = name;
        }
        if let Some(name) = constants::get_run_name() {
            self.tracking.run_name = name;
        }
    }
}

fn resolve_path(path: &Path) -> PathBuf {
    if path.exists() || path.is_absolute() {
        return path.to_path_buf();
    }

    let alt = Path::new(env!("CARGO_MANIFEST_DIR")).join(path);
    if alt.exists() {
        alt
    } else {
        path.to_path_buf()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::MaxFeatures;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert!(config.stratify);
        assert_eq!(config.model.params.n_estimators, 100);
        assert_eq!(config.paths.exported_model_dir, PathBuf::from("artifacts/model"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_yaml_yields_defaults() {
        assert_eq!(TrainingConfig::from_yaml_str("").unwrap(), TrainingConfig::default());
        assert_eq!(TrainingConfig::from_yaml_str("---\n").unwrap(), TrainingConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_other_defaults() {
        let yaml = r#"
test_size: 0.25
model:
  params:
    n_estimators: 50
    max_depth: 8
    max_features: log2
    random_state: 7
tracking:
  enabled: false
"#;
        let config = TrainingConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.test_size, 0.25);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.model.params.n_estimators, 50);
        assert_eq!(config.model.params.max_depth, Some(8));
        assert_eq!(config.model.params.max_features, MaxFeatures::Log2);
        assert_eq!(config.model.params.random_state, Some(7));
        assert_eq!(config.model.params.min_samples_split, 2);
        assert!(!config.tracking.enabled);
        assert_eq!(config.paths.metrics, PathBuf::from("artifacts/metrics"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            TrainingConfig::from_yaml_str("test_size: 1.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TrainingConfig::from_yaml_str("model:\n  params:\n    n_estimators: 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            TrainingConfig::from_yaml_str("test_size: [1, 2]"),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("configs.yaml");
        std::fs::write(&path, "random_state: 1\nstratify: false\n").unwrap();

        let config = TrainingConfig::load(&path).unwrap();
        assert_eq!(config.random_state, 1);
        assert!(!config.stratify);
    }

    #[test]
    fn test_load_missing_file() {
        let err = TrainingConfig::load("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
