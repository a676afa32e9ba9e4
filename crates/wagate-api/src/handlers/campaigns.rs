//! Campaign handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use wagate_core::campaign::campaigns::CampaignInput;
use wagate_storage::models::{Campaign, CampaignStats, Template};

use crate::context::{AppState, DeviceContext};
use crate::handlers::{error_response, ErrorResponse};

/// Query parameters for listing campaigns
#[derive(Debug, Deserialize)]
pub struct ListCampaignsQuery {
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

/// Campaign response
#[derive(Debug, Serialize)]
pub struct CampaignResponse {
    pub id: Uuid,
    pub device_id: String,
    pub name: String,
    pub template_id: Uuid,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<Template>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<CampaignStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_ids: Option<Vec<Uuid>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_ids: Option<Vec<Uuid>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Campaign> for CampaignResponse {
    fn from(c: Campaign) -> Self {
        Self {
            id: c.id,
            device_id: c.device_id,
            name: c.name,
            template_id: c.template_id,
            status: c.status,
            scheduled_at: c.scheduled_at,
            started_at: c.started_at,
            template: None,
            stats: None,
            customer_ids: None,
            group_ids: None,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Campaign list response
#[derive(Debug, Serialize)]
pub struct CampaignListResponse {
    pub campaigns: Vec<CampaignResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Request body for creating or updating a campaign
#[derive(Debug, Deserialize)]
pub struct CampaignRequest {
    pub name: String,
    pub template_id: Uuid,
    #[serde(default)]
    pub customer_ids: Vec<Uuid>,
    #[serde(default)]
    pub group_ids: Vec<Uuid>,
    pub scheduled_at: Option<DateTime<Utc>>,
}

impl From<CampaignRequest> for CampaignInput {
    fn from(r: CampaignRequest) -> Self {
        Self {
            name: r.name,
            template_id: r.template_id,
            customer_ids: r.customer_ids,
            group_ids: r.group_ids,
            scheduled_at: r.scheduled_at,
        }
    }
}

/// GET /campaign/campaigns
pub async fn list_campaigns(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Query(query): Query<ListCampaignsQuery>,
) -> Result<Json<CampaignListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let page = state
        .service
        .list_campaigns(&device.device_id, query.page, query.page_size)
        .await
        .map_err(error_response)?;

    let campaigns = page
        .campaigns
        .into_iter()
        .map(|(campaign, stats)| {
            let mut response = CampaignResponse::from(campaign);
            response.stats = Some(stats);
            response
        })
        .collect();

    Ok(Json(CampaignListResponse {
        campaigns,
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
    }))
}

/// POST /campaign/campaigns
pub async fn create_campaign(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Json(input): Json<CampaignRequest>,
) -> Result<(StatusCode, Json<CampaignResponse>), (StatusCode, Json<ErrorResponse>)> {
    let campaign = state
        .service
        .create_campaign(&device.device_id, input.into())
        .await
        .map_err(error_response)?;

    info!(campaign_id = %campaign.id, device_id = %device.device_id, "Campaign created");

    Ok((StatusCode::CREATED, Json(CampaignResponse::from(campaign))))
}

/// GET /campaign/campaigns/:id
pub async fn get_campaign(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignResponse>, (StatusCode, Json<ErrorResponse>)> {
    let details = state
        .service
        .get_campaign(&device.device_id, id)
        .await
        .map_err(error_response)?;

    let mut response = CampaignResponse::from(details.campaign);
    response.template = details.template;
    response.stats = Some(details.stats);
    response.customer_ids = Some(details.customer_ids);
    response.group_ids = Some(details.group_ids);

    Ok(Json(response))
}

/// PUT /campaign/campaigns/:id
pub async fn update_campaign(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<CampaignRequest>,
) -> Result<Json<CampaignResponse>, (StatusCode, Json<ErrorResponse>)> {
    let campaign = state
        .service
        .update_campaign(&device.device_id, id, input.into())
        .await
        .map_err(error_response)?;

    Ok(Json(CampaignResponse::from(campaign)))
}

/// DELETE /campaign/campaigns/:id
pub async fn delete_campaign(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .delete_campaign(&device.device_id, id)
        .await
        .map_err(error_response)?;

    info!(campaign_id = %id, "Campaign deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// POST /campaign/campaigns/:id/start
pub async fn start_campaign(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .start_campaign(&device.device_id, id)
        .await
        .map_err(error_response)?;

    let details = state
        .service
        .get_campaign(&device.device_id, id)
        .await
        .map_err(error_response)?;

    let mut response = CampaignResponse::from(details.campaign);
    response.stats = Some(details.stats);

    Ok(Json(response))
}

/// POST /campaign/campaigns/:id/pause
pub async fn pause_campaign(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .pause_campaign(&device.device_id, id)
        .await
        .map_err(error_response)?;

    let details = state
        .service
        .get_campaign(&device.device_id, id)
        .await
        .map_err(error_response)?;

    Ok(Json(CampaignResponse::from(details.campaign)))
}

/// GET /campaign/campaigns/:id/stats
pub async fn get_campaign_stats(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CampaignStats>, (StatusCode, Json<ErrorResponse>)> {
    let stats = state
        .service
        .campaign_stats(&device.device_id, id)
        .await
        .map_err(error_response)?;

    Ok(Json(stats))
}
