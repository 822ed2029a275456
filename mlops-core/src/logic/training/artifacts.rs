//! Reading back what training wrote
//!
//! `evaluate_saved` turns `metrics.txt` into a map and `export_model` locates
//! the model file a deployment should ship.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::{TrainingError, TrainingResult};
use crate::constants::{METADATA_FILE_NAME, MODEL_FILE_NAME};

/// A value from `metrics.txt`: numeric where it parses, text otherwise
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Number(f64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(v) => Some(*v),
            MetricValue::Text(_) => None,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MetricValue::Number(v) => write!(f, "{}", v),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/// Parse every `key: value` line of a metrics file
pub fn evaluate_saved(metrics_file: impl AsRef<Path>) -> TrainingResult<BTreeMap<String, MetricValue>> {
    let path = metrics_file.as_ref();
    if !path.is_file() {
        return Err(TrainingError::NotFound(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path).map_err(|source| TrainingError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_metrics(&text))
}

pub fn parse_metrics(text: &str) -> BTreeMap<String, MetricValue> {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| {
            let value = value.trim();
            let parsed = value
                .parse::<f64>()
                .map(MetricValue::Number)
                .unwrap_or_else(|_| MetricValue::Text(value.to_string()));
            (key.trim().to_string(), parsed)
        })
        .collect()
}

/// Path of the exported model file in `model_dir`
///
/// Prefers `model.json`; otherwise the first other `*.json` file by name,
/// skipping the metadata document.
pub fn export_model(model_dir: impl AsRef<Path>) -> TrainingResult<PathBuf> {
    let dir = model_dir.as_ref();
    if !dir.is_dir() {
        return Err(TrainingError::NotFound(dir.to_path_buf()));
    }

    let preferred = dir.join(MODEL_FILE_NAME);
    if preferred.is_file() {
        return Ok(preferred);
    }

    let entries = std::fs::read_dir(dir).map_err(|source| TrainingError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| p.extension().map_or(false, |ext| ext == "json"))
        .filter(|p| p.file_name().map_or(true, |name| name != METADATA_FILE_NAME))
        .collect();
    candidates.sort();

    candidates
        .into_iter()
        .next()
        .ok_or_else(|| TrainingError::NotFound(dir.join("*.json")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_metrics() {
        let text = "MODEL METRICS\n=====\n\naccuracy: 0.95\nf1_score: 0.9\nnote: fine\n";
        let metrics = parse_metrics(text);
        assert_eq!(metrics["accuracy"], MetricValue::Number(0.95));
        assert_eq!(metrics["f1_score"].as_f64(), Some(0.9));
        assert_eq!(metrics["note"], MetricValue::Text("fine".into()));
        assert_eq!(metrics.len(), 3);
    }

    #[test]
    fn test_evaluate_saved_missing_file() {
        let err = evaluate_saved("/nope/metrics.txt").unwrap_err();
        assert!(matches!(err, TrainingError::NotFound(_)));
    }

    #[test]
    fn test_export_model_prefers_model_json() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE_NAME), "{}").unwrap();
        std::fs::write(dir.path().join("a_other.json"), "{}").unwrap();
        std::fs::write(dir.path().join(MODEL_FILE_NAME), "{}").unwrap();

        assert_eq!(export_model(dir.path()).unwrap(), dir.path().join(MODEL_FILE_NAME));
    }

    #[test]
    fn test_export_model_falls_back_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(METADATA_FILE_NAME), "{}").unwrap();
        assert!(matches!(export_model(dir.path()), Err(TrainingError::NotFound(_))));

        std::fs::write(dir.path().join("forest.json"), "{}").unwrap();
        assert_eq!(export_model(dir.path()).unwrap(), dir.path().join("forest.json"));

        assert!(export_model(dir.path().join("missing")).is_err());
    }
}
