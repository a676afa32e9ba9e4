//! Template handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use wagate_storage::models::{CreateTemplate, Template};

use crate::context::{AppState, DeviceContext};
use crate::handlers::{error_response, ErrorResponse};

/// Query parameters for listing templates
#[derive(Debug, Deserialize)]
pub struct ListTemplatesQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

/// Template list response
#[derive(Debug, Serialize)]
pub struct TemplateListResponse {
    pub templates: Vec<Template>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Request body for creating or updating a template
#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub name: String,
    pub content: String,
}

/// Request body for previewing a template
#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    pub content: String,
    pub customer_id: Option<Uuid>,
}

/// Preview response
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub preview: String,
}

/// GET /campaign/templates
pub async fn list_templates(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Query(query): Query<ListTemplatesQuery>,
) -> Result<Json<TemplateListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let page = state
        .service
        .list_templates(&device.device_id, query.page, query.page_size)
        .await
        .map_err(error_response)?;

    Ok(Json(TemplateListResponse {
        templates: page.templates,
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
    }))
}

/// POST /campaign/templates
pub async fn create_template(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Json(input): Json<TemplateRequest>,
) -> Result<(StatusCode, Json<Template>), (StatusCode, Json<ErrorResponse>)> {
    let template = state
        .service
        .create_template(CreateTemplate {
            device_id: device.device_id,
            name: input.name,
            content: input.content,
        })
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /campaign/templates/:id
pub async fn get_template(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<Template>, (StatusCode, Json<ErrorResponse>)> {
    let template = state
        .service
        .get_template(&device.device_id, id)
        .await
        .map_err(error_response)?;

    Ok(Json(template))
}

/// PUT /campaign/templates/:id
pub async fn update_template(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<TemplateRequest>,
) -> Result<Json<Template>, (StatusCode, Json<ErrorResponse>)> {
    let template = state
        .service
        .update_template(&device.device_id, id, input.name, input.content)
        .await
        .map_err(error_response)?;

    Ok(Json(template))
}

/// DELETE /campaign/templates/:id
pub async fn delete_template(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .delete_template(&device.device_id, id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /campaign/templates/preview
pub async fn preview_template(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Json(input): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, (StatusCode, Json<ErrorResponse>)> {
    let customer = match input.customer_id {
        Some(id) => Some(
            state
                .service
                .get_customer(&device.device_id, id)
                .await
                .map_err(error_response)?,
        ),
        None => None,
    };

    let preview = state
        .service
        .preview_template(&input.content, customer.as_ref());

    Ok(Json(PreviewResponse { preview }))
}
