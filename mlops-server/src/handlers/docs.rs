//! API documentation
//!
//! The OpenAPI document is assembled by hand; `/docs` and `/redoc` are thin
//! HTML shells that load Swagger UI and ReDoc against it.

use axum::{response::Html, Json};
use mlops_core::{FEATURE_COUNT, FEATURE_LAYOUT};
use serde_json::{json, Map, Value};

pub async fn openapi() -> Json<Value> {
    Json(openapi_document())
}

pub async fn swagger_ui() -> Html<&'static str> {
    Html(SWAGGER_HTML)
}

pub async fn redoc() -> Html<&'static str> {
    Html(REDOC_HTML)
}

const SWAGGER_HTML: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>MLOps Model Serving API - Swagger UI</title>
  <link rel="stylesheet" href="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
  <div id="swagger-ui"></div>
  <script src="https://cdn.jsdelivr.net/npm/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
  <script>
    SwaggerUIBundle({ url: "/openapi.json", dom_id: "#swagger-ui" });
  </script>
</body>
</html>"##;

const REDOC_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
  <title>MLOps Model Serving API - ReDoc</title>
  <meta charset="utf-8"/>
</head>
<body>
  <redoc spec-url="/openapi.json"></redoc>
  <script src="https://cdn.jsdelivr.net/npm/redoc@2/bundles/redoc.standalone.js"></script>
</body>
</html>"#;

fn feature_record_schema() -> Value {
    let properties: Map<String, Value> = FEATURE_LAYOUT
        .iter()
        .map(|name| (name.to_string(), json!({ "type": "number", "example": 0.5 })))
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": FEATURE_LAYOUT,
        "additionalProperties": false,
    })
}

fn json_body(schema_ref: &str) -> Value {
    json!({
        "required": true,
        "content": { "application/json": { "schema": { "$ref": schema_ref } } }
    })
}

fn json_response(description: &str, schema_ref: &str) -> Value {
    json!({
        "description": description,
        "content": { "application/json": { "schema": { "$ref": schema_ref } } }
    })
}

fn error_responses() -> Value {
    json!({
        "422": json_response("Validation error", "#/components/schemas/ErrorResponse"),
        "503": json_response("Model not loaded", "#/components/schemas/ErrorResponse"),
        "500": json_response("Internal server error", "#/components/schemas/ErrorResponse"),
    })
}

fn with_errors(ok: Value) -> Value {
    let mut responses = error_responses();
    responses["200"] = ok;
    responses
}

pub fn openapi_document() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "MLOps Model Serving API",
            "description": "REST API for serving the trained breast cancer classifier",
            "version": env!("CARGO_PKG_VERSION"),
        },
        "paths": paths(),
        "components": { "schemas": schemas() },
    })
}

fn paths() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("/health".to_string(), json!({ "get": {
        "tags": ["Health"],
        "summary": "Service health and model load status",
        "responses": { "200": json_response("Service is up", "#/components/schemas/HealthResponse") }
    }}));
    map.insert("/ping".to_string(), json!({ "get": {
        "tags": ["Health"],
        "summary": "Liveness probe",
        "responses": { "200": json_response("Pong", "#/components/schemas/PingResponse") }
    }}));
    map.insert("/model/metadata".to_string(), json!({ "get": {
        "tags": ["Model Info"],
        "summary": "Metadata recorded at training time",
        "responses": {
            "200": json_response("Model metadata", "#/components/schemas/ModelMetadata"),
            "404": json_response("Metadata not found", "#/components/schemas/ErrorResponse"),
        }
    }}));
    map.insert("/model/features".to_string(), json!({ "get": {
        "tags": ["Model Info"],
        "summary": "Expected feature names in model order",
        "responses": {
            "200": json_response("Feature list", "#/components/schemas/FeaturesResponse"),
            "404": json_response("Metadata not found", "#/components/schemas/ErrorResponse"),
        }
    }}));
    map.insert("/predict".to_string(), json!({ "post": {
        "tags": ["Predictions"],
        "summary": "Classify one record",
        "requestBody": json_body("#/components/schemas/PredictionRequest"),
        "responses": with_errors(json_response("Prediction", "#/components/schemas/PredictionResponse")),
    }}));
    map.insert("/batch-predict".to_string(), json!({ "post": {
        "tags": ["Predictions"],
        "summary": "Classify 1 to 1000 records; any invalid record rejects the batch",
        "requestBody": json_body("#/components/schemas/BatchPredictionRequest"),
        "responses": with_errors(json_response("Predictions in input order", "#/components/schemas/BatchPredictionResponse")),
    }}));
    map.insert("/invocations".to_string(), json!({ "post": {
        "tags": ["MLflow Compatible"],
        "summary": "Score a dataframe_split or instances payload",
        "requestBody": json_body("#/components/schemas/InvocationsRequest"),
        "responses": with_errors(json_response("Pairs of [class, [p0, p1]]", "#/components/schemas/InvocationsResponse")),
    }}));
    map.insert("/metrics".to_string(), json!({ "get": {
        "tags": ["Monitoring"],
        "summary": "Prometheus text exposition",
        "responses": { "200": { "description": "Metrics", "content": { "text/plain": {} } } }
    }}));
    map.insert("/prometheus-metrics".to_string(), json!({ "get": {
        "tags": ["Monitoring"],
        "summary": "Prometheus text exposition (alias)",
        "responses": { "200": { "description": "Metrics", "content": { "text/plain": {} } } }
    }}));
    map
}

fn schemas() -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("PredictionRequest".to_string(), feature_record_schema());
    map.insert("PredictionResponse".to_string(), json!({
        "type": "object",
        "properties": {
            "prediction": { "type": "integer", "description": "0 = malignant, 1 = benign" },
            "probability": { "type": "array", "items": { "type": "number" }, "minItems": 2, "maxItems": 2 },
            "confidence": { "type": "number", "description": "Max of probability" },
            "timestamp": { "type": "string", "format": "date-time" },
        },
        "required": ["prediction", "probability", "confidence", "timestamp"],
    }));
    map.insert("BatchPredictionRequest".to_string(), json!({
        "type": "object",
        "properties": {
            "records": {
                "type": "array",
                "items": { "$ref": "#/components/schemas/PredictionRequest" },
                "minItems": 1,
                "maxItems": 1000,
            },
        },
        "required": ["records"],
    }));
    map.insert("BatchPredictionResponse".to_string(), json!({
        "type": "object",
        "properties": {
            "predictions": { "type": "array", "items": { "$ref": "#/components/schemas/PredictionResponse" } },
            "processing_time_ms": { "type": "number" },
            "total_records": { "type": "integer" },
        },
    }));
    map.insert("InvocationsRequest".to_string(), json!({
        "oneOf": [
            {
                "type": "object",
                "properties": {
                    "dataframe_split": {
                        "type": "object",
                        "properties": {
                            "columns": { "type": "array", "items": { "type": "string" }, "example": FEATURE_LAYOUT },
                            "data": { "$ref": "#/components/schemas/FeatureRows" },
                        },
                        "required": ["columns", "data"],
                    },
                },
                "required": ["dataframe_split"],
            },
            {
                "type": "object",
                "properties": { "instances": { "$ref": "#/components/schemas/FeatureRows" } },
                "required": ["instances"],
            },
        ],
    }));
    map.insert("FeatureRows".to_string(), json!({
        "type": "array",
        "items": { "type": "array", "items": { "type": "number" }, "minItems": FEATURE_COUNT, "maxItems": FEATURE_COUNT },
        "minItems": 1,
        "maxItems": 1000,
    }));
    map.insert("InvocationsResponse".to_string(), json!({
        "type": "object",
        "properties": {
            "predictions": { "type": "array", "items": { "type": "array" } },
        },
    }));
    map.insert("HealthResponse".to_string(), json!({
        "type": "object",
        "properties": {
            "status": { "type": "string" },
            "version": { "type": "string" },
            "model_loaded": { "type": "boolean" },
            "timestamp": { "type": "string", "format": "date-time" },
        },
    }));
    map.insert("PingResponse".to_string(), json!({
        "type": "object",
        "properties": {
            "status": { "type": "string" },
            "model_loaded": { "type": "boolean" },
        },
    }));
    map.insert("ModelMetadata".to_string(), json!({
        "type": "object",
        "properties": {
            "model_name": { "type": "string" },
            "model_type": { "type": "string" },
            "version": { "type": "string" },
            "trained_date": { "type": "string", "format": "date-time" },
            "accuracy": { "type": "number" },
            "f1_score": { "type": "number" },
            "classes": { "type": "array", "items": { "type": "string" } },
            "n_features": { "type": "integer" },
            "framework": { "type": "string" },
            "data_source": { "type": "string", "description": "Training data: CSV path or bundled-synthetic" },
        },
    }));
    map.insert("FeaturesResponse".to_string(), json!({
        "type": "object",
        "properties": {
            "features": { "type": "array", "items": { "type": "string" } },
            "descriptions": { "type": "array", "items": { "type": "string" } },
            "count": { "type": "integer" },
        },
    }));
    map.insert("ErrorResponse".to_string(), json!({
        "type": "object",
        "properties": {
            "error": { "type": "string" },
            "status": { "type": "integer" },
            "timestamp": { "type": "string", "format": "date-time" },
            "details": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": { "field": { "type": "string" }, "message": { "type": "string" } },
                },
            },
        },
        "required": ["error", "status", "timestamp"],
    }));
    map
}
