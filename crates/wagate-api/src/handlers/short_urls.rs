//! Short URL redirect handler

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;

use crate::context::AppState;
use crate::handlers::{error_response, ErrorResponse};

/// GET /s/:code
///
/// Answers a 302 to the original URL; the click counter is incremented
/// best effort along the way.
pub async fn redirect(
    State(state): State<Arc<AppState>>,
    Path(code): Path<String>,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let url = state
        .service
        .resolve_short_url(&code)
        .await
        .map_err(error_response)?;

    Ok((StatusCode::FOUND, [(header::LOCATION, url)]).into_response())
}
