//! Model information handlers

use axum::{extract::State, Json};
use mlops_core::ModelMetadata;

use crate::models::{FeaturesResponse, ModelMetadataResponse};
use crate::{AppError, AppResult, AppState};

fn require_metadata(state: &AppState) -> AppResult<&ModelMetadata> {
    state
        .metadata
        .as_deref()
        .ok_or_else(|| AppError::NotFound("Model metadata not found".to_string()))
}

pub async fn metadata(State(state): State<AppState>) -> AppResult<Json<ModelMetadataResponse>> {
    let meta = require_metadata(&state)?;
    Ok(Json(ModelMetadataResponse::from(meta)))
}

pub async fn features(State(state): State<AppState>) -> AppResult<Json<FeaturesResponse>> {
    let meta = require_metadata(&state)?;
    Ok(Json(FeaturesResponse::from(meta)))
}
