//! Customer handlers

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use wagate_common::Error;
use wagate_storage::models::{CreateCustomer, Customer};

use crate::context::{AppState, DeviceContext};
use crate::handlers::{error_response, ErrorResponse};

/// Query parameters for listing customers
#[derive(Debug, Deserialize)]
pub struct ListCustomersQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    pub search: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    20
}

/// Customer response
#[derive(Debug, Serialize)]
pub struct CustomerResponse {
    pub id: Uuid,
    pub device_id: String,
    pub phone: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
    pub phone_valid: String,
    pub network_exists: String,
    pub is_ready: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Customer> for CustomerResponse {
    fn from(c: Customer) -> Self {
        let is_ready = c.is_ready();
        Self {
            id: c.id,
            device_id: c.device_id,
            phone: c.phone,
            full_name: c.full_name,
            company: c.company,
            country: c.country,
            gender: c.gender,
            birth_year: c.birth_year,
            phone_valid: c.phone_valid,
            network_exists: c.network_exists,
            is_ready,
            created_at: c.created_at,
            updated_at: c.updated_at,
        }
    }
}

/// Customer list response
#[derive(Debug, Serialize)]
pub struct CustomerListResponse {
    pub customers: Vec<CustomerResponse>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Request body for creating or updating a customer
#[derive(Debug, Deserialize)]
pub struct CustomerRequest {
    pub phone: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

impl CustomerRequest {
    fn into_input(self, device_id: &str) -> CreateCustomer {
        CreateCustomer {
            device_id: device_id.to_string(),
            phone: self.phone,
            full_name: self.full_name,
            company: self.company,
            country: self.country,
            gender: self.gender,
            birth_year: self.birth_year,
        }
    }
}

/// CSV import response
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub errors: Vec<String>,
}

/// Bulk validation response
#[derive(Debug, Serialize)]
pub struct ValidatePendingResponse {
    pub processed: usize,
}

/// GET /campaign/customers
pub async fn list_customers(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Query(query): Query<ListCustomersQuery>,
) -> Result<Json<CustomerListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let page = state
        .service
        .list_customers(
            &device.device_id,
            query.page,
            query.page_size,
            query.search.as_deref(),
        )
        .await
        .map_err(error_response)?;

    Ok(Json(CustomerListResponse {
        customers: page.customers.into_iter().map(CustomerResponse::from).collect(),
        total: page.total,
        page: page.page,
        page_size: page.page_size,
        total_pages: page.total_pages,
    }))
}

/// POST /campaign/customers
pub async fn create_customer(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Json(input): Json<CustomerRequest>,
) -> Result<(StatusCode, Json<CustomerResponse>), (StatusCode, Json<ErrorResponse>)> {
    let customer = state
        .service
        .create_customer(input.into_input(&device.device_id))
        .await
        .map_err(error_response)?;

    Ok((StatusCode::CREATED, Json(CustomerResponse::from(customer))))
}

/// POST /campaign/customers/import
pub async fn import_customers(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    mut multipart: Multipart,
) -> Result<Json<ImportResponse>, (StatusCode, Json<ErrorResponse>)> {
    let mut data = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| error_response(Error::Validation(format!("invalid multipart body: {}", e))))?
    {
        if field.name() == Some("file") {
            let bytes = field.bytes().await.map_err(|e| {
                error_response(Error::Validation(format!("failed to read file: {}", e)))
            })?;
            data = Some(bytes);
            break;
        }
    }

    let data = data
        .ok_or_else(|| error_response(Error::Validation("CSV file is required".to_string())))?;

    let outcome = state
        .service
        .import_customers_csv(&device.device_id, &data)
        .await
        .map_err(error_response)?;

    info!(
        device_id = %device.device_id,
        imported = outcome.imported,
        "CSV import finished"
    );

    Ok(Json(ImportResponse {
        imported: outcome.imported,
        errors: outcome.errors,
    }))
}

/// GET /campaign/customers/:id
pub async fn get_customer(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, (StatusCode, Json<ErrorResponse>)> {
    let customer = state
        .service
        .get_customer(&device.device_id, id)
        .await
        .map_err(error_response)?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// PUT /campaign/customers/:id
pub async fn update_customer(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
    Json(input): Json<CustomerRequest>,
) -> Result<Json<CustomerResponse>, (StatusCode, Json<ErrorResponse>)> {
    let customer = state
        .service
        .update_customer(&device.device_id, id, input.into_input(&device.device_id))
        .await
        .map_err(error_response)?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// DELETE /campaign/customers/:id
pub async fn delete_customer(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .delete_customer(&device.device_id, id)
        .await
        .map_err(error_response)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /campaign/customers/:id/validate
pub async fn validate_customer(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .service
        .validate_customer(&device.device_id, id)
        .await
        .map_err(error_response)?;

    let customer = state
        .service
        .get_customer(&device.device_id, id)
        .await
        .map_err(error_response)?;

    Ok(Json(CustomerResponse::from(customer)))
}

/// POST /campaign/customers/validate
pub async fn validate_pending_customers(
    State(state): State<Arc<AppState>>,
    Extension(device): Extension<DeviceContext>,
) -> Result<Json<ValidatePendingResponse>, (StatusCode, Json<ErrorResponse>)> {
    let processed = state
        .service
        .validate_pending_customers(&device.device_id)
        .await
        .map_err(error_response)?;

    Ok(Json(ValidatePendingResponse { processed }))
}
