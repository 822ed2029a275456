//! Prediction handlers
//!
//! Every record of a request is validated before the model runs. One bad
//! record rejects the whole request; there are no partial results.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, Json};
use mlops_core::{FeatureVector, FieldIssue, Pipeline, Prediction, FEATURE_LAYOUT};
use validator::Validate;

use crate::middleware::AppJson;
use crate::models::{
    BatchPredictionRequest, BatchPredictionResponse, InvocationsRequest, InvocationsResponse,
    PredictionRequest, PredictionResponse, MAX_BATCH_SIZE,
};
use crate::{AppError, AppResult, AppState};

// ============================================================================
// HANDLERS
// ============================================================================

pub async fn predict(
    State(state): State<AppState>,
    AppJson(record): AppJson<PredictionRequest>,
) -> AppResult<Json<PredictionResponse>> {
    let pipeline = state.pipeline()?;

    let features = FeatureVector::from_record(&record).map_err(|issues| {
        state.metrics.failed_predictions.inc();
        AppError::Validation(issues)
    })?;

    let timer = state.metrics.prediction_latency.start_timer();
    let result = pipeline.predict_one(&features);
    timer.observe_duration();

    let prediction = record_outcome(&state, result)?;
    Ok(Json(PredictionResponse::from(prediction)))
}

pub async fn batch_predict(
    State(state): State<AppState>,
    AppJson(request): AppJson<BatchPredictionRequest>,
) -> AppResult<Json<BatchPredictionResponse>> {
    let pipeline = state.pipeline()?;
    let started = Instant::now();

    let rows = request
        .validate()
        .map_err(AppError::from)
        .and_then(|_| validate_records(&request.records))
        .map_err(|e| {
            state.metrics.failed_predictions.inc();
            e
        })?;
    state.metrics.batch_size.observe(rows.len() as f64);

    let predictions = run_batch(&state, pipeline, rows).await?;

    let total_records = predictions.len();
    Ok(Json(BatchPredictionResponse {
        predictions: predictions.into_iter().map(PredictionResponse::from).collect(),
        processing_time_ms: started.elapsed().as_secs_f64() * 1000.0,
        total_records,
    }))
}

/// MLflow-compatible scoring endpoint (`dataframe_split` or `instances` payloads)
pub async fn invocations(
    State(state): State<AppState>,
    AppJson(request): AppJson<InvocationsRequest>,
) -> AppResult<Json<InvocationsResponse>> {
    let pipeline = state.pipeline()?;

    let rows = validate_invocation(&request).map_err(|e| {
        state.metrics.failed_predictions.inc();
        e
    })?;
    state.metrics.batch_size.observe(rows.len() as f64);

    let predictions = run_batch(&state, pipeline, rows).await?;
    Ok(Json(InvocationsResponse::from_predictions(predictions)))
}

// ============================================================================
// VALIDATION
// ============================================================================

/// All-or-nothing: collects the issues of every record, prefixed `records[i]`
fn validate_records(records: &[PredictionRequest]) -> AppResult<Vec<FeatureVector>> {
    let mut rows = Vec::with_capacity(records.len());
    let mut issues = Vec::new();

    for (i, record) in records.iter().enumerate() {
        match FeatureVector::from_record(record) {
            Ok(row) => rows.push(row),
            Err(errs) => {
                let prefix = format!("records[{}]", i);
                issues.extend(errs.into_iter().map(|e| e.prefixed(&prefix)));
            }
        }
    }

    if issues.is_empty() {
        Ok(rows)
    } else {
        Err(AppError::Validation(issues))
    }
}

fn validate_invocation(request: &InvocationsRequest) -> AppResult<Vec<FeatureVector>> {
    match request {
        InvocationsRequest::DataframeSplit { dataframe_split } => {
            let column_issues = check_columns(&dataframe_split.columns);
            if !column_issues.is_empty() {
                return Err(AppError::Validation(column_issues));
            }
            validate_rows(&dataframe_split.data, "dataframe_split.data")
        }
        InvocationsRequest::Instances { instances } => validate_rows(instances, "instances"),
    }
}

/// Positional rows; every row must carry the full layout
fn validate_rows(data: &[Vec<f64>], field: &str) -> AppResult<Vec<FeatureVector>> {
    if data.is_empty() || data.len() > MAX_BATCH_SIZE {
        return Err(AppError::invalid(
            field,
            format!("must contain between 1 and {} rows", MAX_BATCH_SIZE),
        ));
    }

    let mut rows = Vec::with_capacity(data.len());
    let mut issues = Vec::new();
    for (i, values) in data.iter().enumerate() {
        match FeatureVector::from_row(values) {
            Ok(row) => rows.push(row),
            Err(errs) => {
                let prefix = format!("{}[{}]", field, i);
                issues.extend(errs.into_iter().map(|e| e.prefixed(&prefix)));
            }
        }
    }

    if issues.is_empty() {
        Ok(rows)
    } else {
        Err(AppError::Validation(issues))
    }
}

/// Columns must be the feature layout, same names, same order
fn check_columns(columns: &[String]) -> Vec<FieldIssue> {
    if columns.len() != FEATURE_LAYOUT.len() {
        return vec![FieldIssue::new(
            "dataframe_split.columns",
            format!("expected {} columns, got {}", FEATURE_LAYOUT.len(), columns.len()),
        )];
    }

    columns
        .iter()
        .zip(FEATURE_LAYOUT.iter())
        .enumerate()
        .filter(|(_, (got, expected))| got.as_str() != **expected)
        .map(|(i, (got, expected))| {
            FieldIssue::new(
                format!("dataframe_split.columns[{}]", i),
                format!("expected '{}', got '{}'", expected, got),
            )
        })
        .collect()
}

// ============================================================================
// EXECUTION
// ============================================================================

async fn run_batch(
    state: &AppState,
    pipeline: Arc<Pipeline>,
    rows: Vec<FeatureVector>,
) -> AppResult<Vec<Prediction>> {
    let timer = state.metrics.prediction_latency.start_timer();
    let result = tokio::task::spawn_blocking(move || pipeline.predict_batch(&rows))
        .await
        .map_err(|e| {
            state.metrics.failed_predictions.inc();
            AppError::from(e)
        })?;
    timer.observe_duration();

    record_outcome(state, result)
}

fn record_outcome<T>(state: &AppState, result: mlops_core::logic::model::ModelResult<T>) -> AppResult<T> {
    match result {
        Ok(value) => {
            state.metrics.successful_predictions.inc();
            Ok(value)
        }
        Err(e) => {
            state.metrics.failed_predictions.inc();
            Err(AppError::from(e))
        }
    }
}
