//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mlops_core::FieldIssue;
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug)]
pub enum AppError {
    // Request errors
    Validation(Vec<FieldIssue>),

    // Availability errors
    ModelNotLoaded,

    // Resource errors
    NotFound(String),

    // Generic errors
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ModelNotLoaded => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Single-issue validation error
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldIssue::new(field, message)])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (error_message, details) = match &self {
            AppError::Validation(issues) => {
                tracing::warn!("Validation failed: {} issue(s)", issues.len());
                ("Validation error".to_string(), Some(issues.clone()))
            }
            AppError::ModelNotLoaded => {
                tracing::warn!("Prediction requested but no model is loaded");
                ("Model not loaded".to_string(), None)
            }
            AppError::NotFound(msg) => (msg.clone(), None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
        };

        let mut body = json!({
            "error": error_message,
            "status": status.as_u16(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        if let Some(details) = details {
            body["details"] = json!(details);
        }

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::invalid("body", rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut issues: Vec<FieldIssue> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = field.to_string();
                errs.iter().map(move |e| {
                    let message = e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string());
                    FieldIssue::new(field.clone(), message)
                })
            })
            .collect();
        issues.sort_by(|a, b| a.field.cmp(&b.field));
        AppError::Validation(issues)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("worker task failed: {}", err))
    }
}

impl From<mlops_core::logic::model::ModelError> for AppError {
    fn from(err: mlops_core::logic::model::ModelError) -> Self {
        AppError::Internal(err.to_string())
    }
}
