//! Health check and service index handlers

use std::collections::BTreeMap;

use axum::{extract::State, Json};

use crate::models::{HealthResponse, IndexResponse, PingResponse};
use crate::AppState;

/// Always 200; `model_loaded` reports the startup outcome
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.model.is_loaded(),
        timestamp: chrono::Utc::now(),
    })
}

pub async fn ping(State(state): State<AppState>) -> Json<PingResponse> {
    Json(PingResponse {
        status: "pong",
        model_loaded: state.model.is_loaded(),
    })
}

pub async fn index(State(state): State<AppState>) -> Json<IndexResponse> {
    let endpoints = BTreeMap::from([
        ("docs", "/docs"),
        ("redoc", "/redoc"),
        ("openapi", "/openapi.json"),
        ("health", "/health"),
        ("ping", "/ping"),
        ("predictions", "/predict"),
        ("batch_predictions", "/batch-predict"),
        ("invocations", "/invocations"),
        ("model_info", "/model/metadata"),
        ("model_features", "/model/features"),
        ("metrics", "/metrics"),
    ]);

    Json(IndexResponse {
        name: "MLOps Model Serving API",
        version: env!("CARGO_PKG_VERSION"),
        description: "REST API for serving the trained breast cancer classifier",
        model_status: state.model.describe(),
        uptime_seconds: state.started_at.elapsed().as_secs_f64(),
        environment: state.config.environment.clone(),
        endpoints,
    })
}
