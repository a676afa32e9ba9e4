//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use wagate_common::types::{CampaignId, CustomerId, GroupId, TemplateId, ValidationStatus};

/// Customer model - a potential campaign recipient
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub device_id: String,
    pub phone: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
    pub phone_valid: String,
    pub network_exists: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// A customer is ready for dispatch once both validations passed
    pub fn is_ready(&self) -> bool {
        self.phone_valid == ValidationStatus::Valid.as_str()
            && self.network_exists == ValidationStatus::Valid.as_str()
    }
}

/// Create customer input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCustomer {
    pub device_id: String,
    pub phone: String,
    pub full_name: Option<String>,
    pub company: Option<String>,
    pub country: Option<String>,
    pub gender: Option<String>,
    pub birth_year: Option<i32>,
}

/// Group model - a named recipient bucket
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub device_id: String,
    pub name: String,
    pub description: Option<String>,
    pub customer_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create group input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateGroup {
    pub device_id: String,
    pub name: String,
    pub description: Option<String>,
}

/// Template model - a message body with placeholders
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub device_id: String,
    pub name: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create template input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplate {
    pub device_id: String,
    pub name: String,
    pub content: String,
}

/// Campaign model - a unit of dispatch
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    pub device_id: String,
    pub name: String,
    pub template_id: TemplateId,
    pub status: String,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create campaign input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCampaign {
    pub device_id: String,
    pub name: String,
    pub template_id: TemplateId,
    pub scheduled_at: Option<DateTime<Utc>>,
}

/// Campaign statistics aggregated over the message queue
#[derive(Debug, Clone, Default, FromRow, Serialize, Deserialize)]
pub struct CampaignStats {
    pub total_messages: i64,
    pub pending_messages: i64,
    pub sent_messages: i64,
    pub failed_messages: i64,
}

/// Queue item model - a single outbound message
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct QueueItem {
    pub id: Uuid,
    pub campaign_id: CampaignId,
    pub customer_id: CustomerId,
    pub device_id: String,
    pub phone: String,
    pub message: String,
    pub status: String,
    pub error: Option<String>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// New queue item input
#[derive(Debug, Clone)]
pub struct NewQueueItem {
    pub campaign_id: CampaignId,
    pub customer_id: CustomerId,
    pub device_id: String,
    pub phone: String,
    pub message: String,
}

/// Short URL model - an opaque redirect record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ShortUrl {
    pub id: Uuid,
    pub device_id: String,
    pub code: String,
    pub original_url: String,
    pub clicks: i32,
    pub created_at: DateTime<Utc>,
}
