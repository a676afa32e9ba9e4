//! Group handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;
use wagate_storage::models::{CreateGroup, Group};

use crate::context::{AppState, DeviceContext};
use crate::handlers::customers::CustomerResponse;
use crate::handlers::{error_response, ErrorResponse};

/// Query parameters for listing groups
#[derive(Debug, Deserialize)]
pub struct ListGroupsQuery {
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

/// Group response
#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub id: Uuid,
    pub device_id: String,
    pub name: String,
    pub description: Option<String>,
    pub customer_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<CustomerResponse>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Group> for GroupResponse {
    fn from(g: Group) -> Self {
        Self {
            id: g.id,
            device_id: g.device_id,
            name: g.name,
            description: g.description,
            customer_count: g.customer_count,
            customers: None,
            created_at: g.created_at,
            updated_at: g.updated_at,
        }
    }
}

/// Group list response
#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub groups: Vec<GroupResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Request body for creating or updating a group
#[derive(Debug, Deserialize)]
pub struct GroupRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Request body for adding group members
#[derive(Debug, Deserialize)]
pub struct AddMembersRequest {
    pub customer_ids: Vec<Uuid>,
}

/// GET /campaign/groups
pub async fn list_groups(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Query(query): Query<ListGroupsQuery>,
) -> Result<Json<GroupListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let page = state
        .service
        .list_groups(&device.device_id, query.page, query.page_size)
        .await
        .map_err(error_response)?;

    Ok(Json(GroupListResponse {
        groups: page.groups.into_iter().map(GroupResponse::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
    }))
}

/// POST /campaign/groups
pub async fn create_group(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Json(input): Json<GroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), (StatusCode, Json<ErrorResponse>)> {
    let group = state
        .service
        .create_group(CreateGroup {
            device_id: device.device_id,
            name: input.name,
            description: input.description,
        })
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(GroupResponse::from(group))))
}

/// GET /campaign/groups/:id
pub async fn get_group(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<GroupResponse>, (StatusCode, Json<ErrorResponse>)> {
    let details = state
        .service
        .get_group(&device.device_id, id)
        .await
        .map_err(error_response)?;

    let mut response = GroupResponse::from(details.group);
    response.customers = Some(
        details
            .customers
            .into_iter()
            .map(CustomerResponse::from)
            .collect(),
    );

    Ok(Json(response))
}

/// PUT /campaign/groups/:id
pub async fn update_group(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<GroupRequest>,
) -> Result<Json<GroupResponse>, (StatusCode, Json<ErrorResponse>)> {
    let group = state
        .service
        .update_group(&device.device_id, id, input.name, input.description)
        .await
        .map_err(error_response)?;

    Ok(Json(GroupResponse::from(group)))
}

/// DELETE /campaign/groups/:id
pub async fn delete_group(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .delete_group(&device.device_id, id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /campaign/groups/:id/members
pub async fn add_group_members(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<AddMembersRequest>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .add_customers_to_group(&device.device_id, id, &input.customer_ids)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /campaign/groups/:id/members/:customer_id
pub async fn remove_group_member(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path((id, customer_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .remove_customer_from_group(&device.device_id, id, customer_id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}
