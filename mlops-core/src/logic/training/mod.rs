//! Training Module - Fit, Evaluate, Export
//!
//! ```text
//! dataset ─▶ split ─▶ Pipeline::fit ─▶ evaluate(test) ─▶ artifacts
//!                                                        ├─ model/model.json
//!                                                        ├─ model/metadata.json
//!                                                        ├─ params/model_params.txt
//!                                                        ├─ metrics/metrics.txt
//!                                                        └─ results/evaluation_results.txt
//! ```
//!
//! `train` does the CPU work synchronously. `run` wraps it for async callers
//! and then reports the run to experiment tracking; tracking problems are
//! logged and never fail the run.

pub mod artifacts;
pub mod evaluation;
pub mod report;

use std::path::PathBuf;

use crate::constants::{METADATA_FILE_NAME, MODEL_FILE_NAME};
use crate::logic::config::{ConfigError, TrainingConfig};
use crate::logic::dataset::{self, Dataset, DatasetError};
use crate::logic::model::metadata::file_sha256;
use crate::logic::model::{Classifier, ModelError, ModelMetadata, Pipeline};
use crate::logic::tracking;

pub use artifacts::{evaluate_saved, export_model, MetricValue};
pub use evaluation::{ConfusionMatrix, Evaluation, RocCurve, Scores};

pub type TrainingResult<T> = Result<T, TrainingError>;

#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not found: {0}")]
    NotFound(PathBuf),

    #[error("training task failed: {0}")]
    Task(String),
}

/// Where a training run put its files
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub metadata: PathBuf,
    pub params: PathBuf,
    pub metrics: PathBuf,
    pub results: PathBuf,
}

#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub pipeline: Pipeline,
    pub metadata: ModelMetadata,
    pub evaluation: Evaluation,
    pub artifacts: ArtifactPaths,
    /// Tracking run id, when the run was recorded
    pub run_id: Option<String>,
}

// ============================================================================
// PIPELINE
// ============================================================================

/// Configured CSV, or the bundled dataset
pub fn load_dataset(config: &TrainingConfig) -> TrainingResult<Dataset> {
    match &config.dataset.path {
        Some(path) => Ok(dataset::load_csv(path)?),
        None => {
            log::warn!(
                "No dataset.path configured; training on the synthetic bundled dataset, scores are not clinically meaningful"
            );
            Ok(dataset::load_breast_cancer(dataset::bundled::DEFAULT_SEED)?)
        }
    }
}

/// What `load_dataset` reads, as recorded in metadata
pub fn data_source(config: &TrainingConfig) -> String {
    match &config.dataset.path {
        Some(path) => path.display().to_string(),
        None => dataset::bundled::SOURCE.to_string(),
    }
}

/// Fit, evaluate and write every artifact
pub fn train(config: &TrainingConfig) -> TrainingResult<TrainingOutcome> {
    config.validate()?;

    let data = load_dataset(config)?;
    let split = dataset::train_test_split(&data, config.test_size, config.random_state, config.stratify)?;
    log::info!(
        "Shapes: train {:?}, test {:?}",
        split.train.features.dim(),
        split.test.features.dim()
    );

    let pipeline = Pipeline::fit(&split.train, &config.model.params)?;

    let proba = pipeline.predict_proba(split.test.features.view())?;
    let y_pred: Vec<usize> = proba
        .rows()
        .into_iter()
        .map(|row| crate::logic::model::argmax(&row.to_vec()))
        .collect();
    // probability of the positive class
    let y_score: Vec<f64> = if proba.ncols() > 1 {
        proba.column(1).to_vec()
    } else {
        vec![0.0; proba.nrows()]
    };
    let evaluation = Evaluation::new(&split.test.targets, &y_pred, &y_score, &split.test.target_names);

    log::info!("Metrics: {:?}", evaluation.scores);
    log::info!("Classification report:\n{}", evaluation.report);
    log::info!("Confusion matrix:\n{}", evaluation.confusion);

    let params_path = report::write_report(
        &config.paths.params,
        report::PARAMS_FILE_NAME,
        &report::render_params(&config.model.params),
    )?;
    let metrics_path = report::write_report(
        &config.paths.metrics,
        report::METRICS_FILE_NAME,
        &report::render_metrics(&evaluation),
    )?;
    let results_path = report::write_report(
        &config.paths.results,
        report::RESULTS_FILE_NAME,
        &report::render_results(&evaluation),
    )?;

    let (model_path, metadata_path) = export(
        &config.paths.exported_model_dir,
        &pipeline,
        &evaluation,
        data_source(config),
    )?;
    let metadata = ModelMetadata::load(&metadata_path)?;

    Ok(TrainingOutcome {
        pipeline,
        metadata,
        evaluation,
        artifacts: ArtifactPaths {
            model: model_path,
            metadata: metadata_path,
            params: params_path,
            metrics: metrics_path,
            results: results_path,
        },
        run_id: None,
    })
}

/// Replace the export directory with a fresh model + metadata pair
fn export(
    dir: &std::path::Path,
    pipeline: &Pipeline,
    evaluation: &Evaluation,
    data_source: String,
) -> TrainingResult<(PathBuf, PathBuf)> {
    if dir.exists() {
        std::fs::remove_dir_all(dir).map_err(|source| TrainingError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let model_path = dir.join(MODEL_FILE_NAME);
    pipeline.save(&model_path)?;

    let mut metadata = ModelMetadata::from_pipeline(pipeline);
    let scores = evaluation.scores;
    metadata.accuracy = scores.accuracy;
    metadata.precision = scores.precision;
    metadata.recall = scores.recall;
    metadata.f1_score = scores.f1_score;
    metadata.roc_auc = scores.roc_auc;
    metadata.data_source = Some(data_source);
    metadata.model_sha256 = Some(file_sha256(&model_path)?);

    let metadata_path = dir.join(METADATA_FILE_NAME);
    metadata.save(&metadata_path)?;

    Ok((model_path, metadata_path))
}

/// `train` on a blocking thread, then record the run
pub async fn run(config: TrainingConfig) -> TrainingResult<TrainingOutcome> {
    let job_config = config.clone();
    let mut outcome = tokio::task::spawn_blocking(move || train(&job_config))
        .await
        .map_err(|e| TrainingError::Task(e.to_string()))??;

    if config.tracking.enabled {
        let record = tracking::RunRecord::from_training(&config, &outcome);
        match tracking::record_run(&config.tracking, &record).await {
            Ok(run_id) => {
                log::info!("Tracked run {} in experiment '{}'", run_id, config.tracking.experiment_name);
                outcome.run_id = Some(run_id);
            }
            Err(e) => {
                log::warn!("Experiment tracking unavailable, continuing without it: {}", e);
            }
        }
    } else {
        log::info!("Experiment tracking disabled");
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests;
