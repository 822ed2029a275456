//! MLflow REST Client
//!
//! Talks to an MLflow tracking server over its REST API (`/api/2.0/mlflow`).
//! One training run maps to: find or create the experiment, create a run,
//! log params/metrics/tags in a single batch, mark the run finished.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{RunRecord, Tracker, TrackingError, TrackingResult};

const API_PREFIX: &str = "api/2.0/mlflow";

/// MLflow tracking server client
pub struct MlflowClient {
    base_url: String,
    http_client: reqwest::Client,
}

// Request/Response types

#[derive(Debug, Deserialize)]
struct GetExperimentResponse {
    experiment: Experiment,
}

#[derive(Debug, Deserialize)]
struct Experiment {
    experiment_id: String,
}

#[derive(Debug, Serialize)]
struct CreateExperimentRequest<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateExperimentResponse {
    experiment_id: String,
}

#[derive(Debug, Serialize)]
struct CreateRunRequest<'a> {
    experiment_id: &'a str,
    run_name: &'a str,
    start_time: i64,
    tags: Vec<KeyValue>,
}

#[derive(Debug, Deserialize)]
struct CreateRunResponse {
    run: Run,
}

#[derive(Debug, Deserialize)]
struct Run {
    info: RunInfo,
}

#[derive(Debug, Deserialize)]
struct RunInfo {
    run_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyValue {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub key: String,
    pub value: f64,
    pub timestamp: i64,
    pub step: i64,
}

#[derive(Debug, Serialize)]
pub struct LogBatchRequest {
    pub run_id: String,
    pub metrics: Vec<Metric>,
    pub params: Vec<KeyValue>,
    pub tags: Vec<KeyValue>,
}

#[derive(Debug, Serialize)]
struct UpdateRunRequest<'a> {
    run_id: &'a str,
    status: &'a str,
    end_time: i64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error_code: Option<String>,
}

impl LogBatchRequest {
    pub fn from_record(run_id: &str, record: &RunRecord, timestamp: i64) -> Self {
        let pairs = |map: &std::collections::BTreeMap<String, String>| {
            map.iter()
                .map(|(k, v)| KeyValue {
                    key: k.clone(),
                    value: v.clone(),
                })
                .collect()
        };

        Self {
            run_id: run_id.to_string(),
            metrics: record
                .metrics
                .iter()
                .map(|(k, v)| Metric {
                    key: k.clone(),
                    value: *v,
                    timestamp,
                    step: 0,
                })
                .collect(),
            params: pairs(&record.params),
            tags: pairs(&record.tags),
        }
    }
}

impl MlflowClient {
    pub fn new(base_url: &str) -> TrackingResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| TrackingError::Network(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    pub fn endpoint(&self, method: &str) -> String {
        format!("{}/{}/{}", self.base_url, API_PREFIX, method)
    }

    /// Experiment id for `name`, creating the experiment if needed
    pub async fn ensure_experiment(&self, name: &str) -> TrackingResult<String> {
        let url = self.endpoint("experiments/get-by-name");
        let response = self
            .http_client
            .get(&url)
            .query(&[("experiment_name", name)])
            .send()
            .await
            .map_err(|e| TrackingError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let found: GetExperimentResponse = response
                .json()
                .await
                .map_err(|e| TrackingError::Parse(e.to_string()))?;
            return Ok(found.experiment.experiment_id);
        }

        let body = response.text().await.unwrap_or_default();
        let missing = status == reqwest::StatusCode::NOT_FOUND
            || serde_json::from_str::<ErrorResponse>(&body)
                .ok()
                .and_then(|e| e.error_code)
                .map_or(false, |code| code == "RESOURCE_DOES_NOT_EXIST");
        if !missing {
            return Err(TrackingError::Server {
                status: status.as_u16(),
                body,
            });
        }

        log::info!("Creating MLflow experiment '{}'", name);
        let created: CreateExperimentResponse = self
            .post("experiments/create", &CreateExperimentRequest { name })
            .await?;
        Ok(created.experiment_id)
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, method: &str, body: &B) -> TrackingResult<R> {
        let url = self.endpoint(method);
        let response = self
            .http_client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| TrackingError::Network(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            // some endpoints answer with an empty object
            let text = response.text().await.map_err(|e| TrackingError::Network(e.to_string()))?;
            let text = if text.trim().is_empty() { "{}" } else { text.as_str() };
            serde_json::from_str(text).map_err(|e| TrackingError::Parse(e.to_string()))
        } else {
            let body = response.text().await.unwrap_or_default();
            log::error!("MLflow {} failed ({}): {}", method, status, body);
            Err(TrackingError::Server {
                status: status.as_u16(),
                body,
            })
        }
    }
}

impl Tracker for MlflowClient {
    async fn log_run(&self, record: &RunRecord) -> TrackingResult<String> {
        let experiment_id = self.ensure_experiment(&record.experiment_name).await?;

        let start_time = chrono::Utc::now().timestamp_millis();
        let created: CreateRunResponse = self
            .post(
                "runs/create",
                &CreateRunRequest {
                    experiment_id: &experiment_id,
                    run_name: &record.run_name,
                    start_time,
                    tags: vec![KeyValue {
                        key: "mlflow.runName".into(),
                        value: record.run_name.clone(),
                    }],
                },
            )
            .await?;
        let run_id = created.run.info.run_id;

        let batch = LogBatchRequest::from_record(&run_id, record, start_time);
        let _: serde_json::Value = self.post("runs/log-batch", &batch).await?;

        let _: serde_json::Value = self
            .post(
                "runs/update",
                &UpdateRunRequest {
                    run_id: &run_id,
                    status: "FINISHED",
                    end_time: chrono::Utc::now().timestamp_millis(),
                },
            )
            .await?;

        log::info!("Logged run {} to MLflow at {}", run_id, self.base_url);
        Ok(run_id)
    }
}
