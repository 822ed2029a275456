//! Prometheus metrics
//!
//! Every metric lives in a registry owned by the service instance, so two
//! instances (or two tests) never share counters.

use prometheus::{
    Counter, Encoder, Gauge, Histogram, HistogramOpts, IntCounterVec, Opts, Registry, TextEncoder,
};

/// Content type of the text exposition format
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

const LATENCY_BUCKETS: [f64; 9] = [0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];
const BATCH_BUCKETS: [f64; 7] = [1.0, 5.0, 10.0, 50.0, 100.0, 500.0, 1000.0];

pub struct ServiceMetrics {
    registry: Registry,
    pub requests_total: IntCounterVec,
    pub successful_predictions: Counter,
    pub failed_predictions: Counter,
    pub prediction_latency: Histogram,
    pub batch_size: Histogram,
    pub uptime_seconds: Gauge,
    pub model_loaded: Gauge,
}

impl ServiceMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "mlflow_prediction_requests_total",
                "Total number of requests by endpoint and status code",
            ),
            &["endpoint", "status"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let successful_predictions = Counter::new(
            "mlflow_successful_predictions_total",
            "Total number of successful predictions",
        )?;
        registry.register(Box::new(successful_predictions.clone()))?;

        let failed_predictions = Counter::new(
            "mlflow_failed_predictions_total",
            "Total number of failed predictions",
        )?;
        registry.register(Box::new(failed_predictions.clone()))?;

        let prediction_latency = Histogram::with_opts(
            HistogramOpts::new(
                "mlflow_prediction_latency_seconds",
                "Prediction latency in seconds",
            )
            .buckets(LATENCY_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(prediction_latency.clone()))?;

        let batch_size = Histogram::with_opts(
            HistogramOpts::new("mlflow_batch_size", "Number of records per batch request")
                .buckets(BATCH_BUCKETS.to_vec()),
        )?;
        registry.register(Box::new(batch_size.clone()))?;

        let uptime_seconds = Gauge::new("mlflow_api_uptime_seconds", "Service uptime in seconds")?;
        registry.register(Box::new(uptime_seconds.clone()))?;

        let model_loaded = Gauge::new(
            "mlflow_model_loaded",
            "Whether a model is loaded (1) or not (0)",
        )?;
        registry.register(Box::new(model_loaded.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            successful_predictions,
            failed_predictions,
            prediction_latency,
            batch_size,
            uptime_seconds,
            model_loaded,
        })
    }

    pub fn observe_request(&self, endpoint: &str, status: u16) {
        self.requests_total
            .with_label_values(&[endpoint, &status.to_string()])
            .inc();
    }

    /// Text exposition of every registered metric
    pub fn render(&self) -> Result<String, String> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| e.to_string())?;
        String::from_utf8(buffer).map_err(|e| e.to_string())
    }
}
