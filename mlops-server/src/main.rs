//! MLOps Model Serving API
//!
//! HTTP front end for the classifier trained by `mlops train`.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    PREDICTION SERVICE                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐  ┌───────────────┐  ┌─────────────────────┐ │
//! │  │  Router   │  │  Validation   │  │  Prometheus         │ │
//! │  │  (Axum)   │─▶│  (FieldIssue) │  │  Registry           │ │
//! │  └─────┬─────┘  └───────┬───────┘  └──────────▲──────────┘ │
//! │        │                ▼                     │            │
//! │        │        ┌───────────────┐             │            │
//! │        └───────▶│ Arc<Pipeline> │─────────────┘            │
//! │                 │  (read-only)  │                          │
//! │                 └───────────────┘                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The model and its metadata are read once at startup from `MODEL_PATH`.

mod config;
mod error;
mod handlers;
mod middleware;
mod models;
mod state;
mod telemetry;


use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub use error::{AppError, AppResult};
pub use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let default_filter = format!(
        "mlops_server={lvl},mlops_core={lvl},tower_http={lvl}",
        lvl = config.log_level
    );
    let json_logs = config.json_logs();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("MLOps Model Serving API starting...");
    if config.is_production() && !json_logs {
        tracing::warn!("Text logs in production; set LOG_FORMAT=json for structured output");
    }
    tracing::info!(
        "Environment: {}, model path: {}",
        config.environment,
        config.model_path.display()
    );

    let metrics = Arc::new(
        telemetry::ServiceMetrics::new().context("Failed to create metrics registry")?,
    );
    let state = AppState::load(config.clone(), metrics);
    if !state.model.is_loaded() {
        tracing::warn!("Serving without a model: predictions will return 503");
    }

    // Build router
    let app = create_router(state);

    // Start server
    let ip: std::net::IpAddr = config
        .host
        .parse()
        .with_context(|| format!("Invalid HOST '{}'", config.host))?;
    let addr = SocketAddr::new(ip, config.port);
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        // Info & docs
        .route("/", get(handlers::health::index))
        .route("/openapi.json", get(handlers::docs::openapi))
        .route("/docs", get(handlers::docs::swagger_ui))
        .route("/redoc", get(handlers::docs::redoc))

        // Health
        .route("/health", get(handlers::health::check))
        .route("/ping", get(handlers::health::ping))

        // Model info
        .route("/model/metadata", get(handlers::model::metadata))
        .route("/model/features", get(handlers::model::features))

        // Predictions
        .route("/predict", post(handlers::predict::predict))
        .route("/batch-predict", post(handlers::predict::batch_predict))
        .route("/invocations", post(handlers::predict::invocations))

        // Monitoring
        .route("/metrics", get(handlers::metrics::export))
        .route("/prometheus-metrics", get(handlers::metrics::export))

        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::track_requests,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
