//! Configuration module

use std::env;
use std::path::{Path, PathBuf};

use mlops_core::constants;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Bind address
    pub host: String,

    /// Server port
    pub port: u16,

    /// Model directory, or the model file itself
    pub model_path: PathBuf,

    /// Log level used when RUST_LOG is unset
    pub log_level: String,

    /// "json" for structured logs, anything else for text
    pub log_format: String,

    /// Environment (development, production)
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            model_path: PathBuf::from(constants::DEFAULT_MODEL_DIR),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: env::var("HOST").unwrap_or(defaults.host),

            port: env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),

            model_path: env::var("MODEL_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            log_level: env::var("LOG_LEVEL")
                .map(|l| l.to_lowercase())
                .unwrap_or(defaults.log_level),

            log_format: env::var("LOG_FORMAT")
                .map(|f| f.to_lowercase())
                .unwrap_or(defaults.log_format),

            environment: env::var("ENVIRONMENT").unwrap_or(defaults.environment),
        }
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }

    /// Model artifact file
    pub fn model_file(&self) -> PathBuf {
        if is_json_file(&self.model_path) {
            self.model_path.clone()
        } else {
            self.model_path.join(constants::MODEL_FILE_NAME)
        }
    }

    /// Metadata file, next to the model
    pub fn metadata_file(&self) -> PathBuf {
        if is_json_file(&self.model_path) {
            self.model_path
                .parent()
                .unwrap_or_else(|| Path::new("."))
                .join(constants::METADATA_FILE_NAME)
        } else {
            self.model_path.join(constants::METADATA_FILE_NAME)
        }
    }
}

fn is_json_file(path: &Path) -> bool {
    path.extension().map_or(false, |ext| ext == "json")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_dir_resolves_both_files() {
        let config = Config {
            model_path: PathBuf::from("artifacts/model"),
            ..Config::default()
        };
        assert_eq!(config.model_file(), PathBuf::from("artifacts/model/model.json"));
        assert_eq!(config.metadata_file(), PathBuf::from("artifacts/model/metadata.json"));
    }

    #[test]
    fn test_model_file_path_is_used_as_is() {
        let config = Config {
            model_path: PathBuf::from("/srv/models/forest.json"),
            ..Config::default()
        };
        assert_eq!(config.model_file(), PathBuf::from("/srv/models/forest.json"));
        assert_eq!(config.metadata_file(), PathBuf::from("/srv/models/metadata.json"));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.host, "0.0.0.0");
        assert!(!config.is_production());
        assert!(!config.json_logs());
    }
}
