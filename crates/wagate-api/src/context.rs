//! Application state and device scoping

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use wagate_core::{CampaignService, DeviceRegistry};

use crate::handlers::ErrorResponse;

/// Application state shared across handlers
pub struct AppState {
    pub service: Arc<CampaignService>,
    pub devices: Arc<dyn DeviceRegistry>,
}

/// The tenant device a request is scoped to
#[derive(Debug, Clone)]
pub struct DeviceContext {
    pub device_id: String,
}

/// Resolve the tenant device for campaign routes.
///
/// The device id comes from the `X-Device-ID` header and must belong to
/// a registered client session. Requests without one get a 401 before
/// reaching any handler.
pub async fn device_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Response {
    let device_id = req
        .headers()
        .get("x-device-id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .trim()
        .to_string();

    if device_id.is_empty() || state.devices.get_device(&device_id).is_none() {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "NOT_CONNECTED".to_string(),
                message: "Please connect your WhatsApp device first. Go to App menu and scan QR code."
                    .to_string(),
            }),
        )
            .into_response();
    }

    req.extensions_mut().insert(DeviceContext { device_id });
    next.run(req).await
}
