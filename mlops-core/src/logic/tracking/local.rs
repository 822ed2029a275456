//! Local Run Store
//!
//! File-based stand-in for a tracking server:
//!
//! ```text
//! <root>/<experiment>/<run_id>/params.json
//!                             /metrics.json
//!                             /meta.json
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{RunRecord, Tracker, TrackingError, TrackingResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub run_id: String,
    pub run_name: String,
    pub experiment_name: String,
    pub status: String,
    pub start_time: chrono::DateTime<chrono::Utc>,
    pub end_time: chrono::DateTime<chrono::Utc>,
    pub tags: std::collections::BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct LocalRunStore {
    root: PathBuf,
}

impl LocalRunStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn run_dir(&self, experiment_name: &str, run_id: &str) -> PathBuf {
        self.root.join(dir_name(experiment_name)).join(run_id)
    }

    /// Read a stored run back
    pub fn load_meta(&self, experiment_name: &str, run_id: &str) -> TrackingResult<RunMeta> {
        let path = self.run_dir(experiment_name, run_id).join("meta.json");
        let text = std::fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn write_json<T: Serialize>(dir: &Path, name: &str, value: &T) -> TrackingResult<()> {
        let json = serde_json::to_string_pretty(value)?;
        tokio::fs::write(dir.join(name), json).await?;
        Ok(())
    }
}

impl Tracker for LocalRunStore {
    async fn log_run(&self, record: &RunRecord) -> TrackingResult<String> {
        let start_time = chrono::Utc::now();
        let run_id = uuid::Uuid::new_v4().simple().to_string();
        let dir = self.run_dir(&record.experiment_name, &run_id);

        tokio::fs::create_dir_all(&dir).await.map_err(TrackingError::Io)?;
        Self::write_json(&dir, "params.json", &record.params).await?;
        Self::write_json(&dir, "metrics.json", &record.metrics).await?;

        let meta = RunMeta {
            run_id: run_id.clone(),
            run_name: record.run_name.clone(),
            experiment_name: record.experiment_name.clone(),
            status: "FINISHED".to_string(),
            start_time,
            end_time: chrono::Utc::now(),
            tags: record.tags.clone(),
        };
        Self::write_json(&dir, "meta.json", &meta).await?;

        log::info!("Recorded run {} under {}", run_id, dir.display());
        Ok(run_id)
    }
}

/// Experiment names become directory names
fn dir_name(experiment_name: &str) -> String {
    let cleaned: String = experiment_name
        .chars()
        .map(|c| if c == '/' || c == '\\' { '_' } else { c })
        .collect();
    match cleaned.trim() {
        "" | "." | ".." => "default".to_string(),
        name => name.to_string(),
    }
}
