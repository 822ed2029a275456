//! JSON extractor with the service error format

use axum::extract::FromRequest;

use crate::AppError;

/// `axum::Json`, but rejections become `AppError::Validation` (422)
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
