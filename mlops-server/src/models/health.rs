//! Health and service info schemas

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

/// Service index served at `/`
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub description: &'static str,
    pub model_status: String,
    pub uptime_seconds: f64,
    pub environment: String,
    pub endpoints: BTreeMap<&'static str, &'static str>,
}
