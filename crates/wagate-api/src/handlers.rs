//! HTTP handlers

pub mod campaigns;
pub mod customers;
pub mod groups;
pub mod health;
pub mod short_urls;
pub mod templates;

use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::error;
use wagate_common::Error;

/// Error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Translate a service error to its HTTP shape
pub(crate) fn error_response(e: Error) -> (StatusCode, Json<ErrorResponse>) {
    if e.status_code() >= 500 {
        error!(error = %e, "Request failed");
    }

    let status =
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: e.code().to_string(),
            message: e.to_string(),
        }),
    )
}
