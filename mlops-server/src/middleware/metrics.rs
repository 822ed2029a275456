//! Request metrics middleware

use std::time::Instant;

use axum::{
    extract::{MatchedPath, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};

use crate::AppState;

/// Response header carrying the handling time in seconds
pub const PROCESS_TIME_HEADER: &str = "x-process-time";

/// Middleware: count every request by route and status, stamp the process
/// time header and refresh the uptime gauge
pub async fn track_requests(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let started = Instant::now();
    let endpoint = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let mut response = next.run(req).await;

    let elapsed = started.elapsed().as_secs_f64();
    state
        .metrics
        .observe_request(&endpoint, response.status().as_u16());
    state
        .metrics
        .uptime_seconds
        .set(state.started_at.elapsed().as_secs_f64());

    if let Ok(value) = HeaderValue::from_str(&elapsed.to_string()) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, value);
    }

    response
}
