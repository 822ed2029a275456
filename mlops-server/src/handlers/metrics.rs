//! Prometheus scrape handler

use axum::{
    extract::State,
    http::header::CONTENT_TYPE,
    response::IntoResponse,
};

use crate::telemetry::PROMETHEUS_CONTENT_TYPE;
use crate::{AppError, AppResult, AppState};

/// Serves both `/metrics` and `/prometheus-metrics`
pub async fn export(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    state
        .metrics
        .uptime_seconds
        .set(state.started_at.elapsed().as_secs_f64());

    let body = state.metrics.render().map_err(AppError::Internal)?;
    Ok(([(CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)], body))
}
