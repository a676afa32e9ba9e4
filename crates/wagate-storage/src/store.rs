//! Store capability traits
//!
//! The campaign core talks to persistence exclusively through
//! [`CampaignStore`], the union of the entity-scoped traits below. The
//! sqlx implementation lives in [`crate::repository`]; tests substitute
//! an in-memory implementation.

use async_trait::async_trait;
use uuid::Uuid;
use wagate_common::types::{MessageStatus, ValidationStatus};
use wagate_common::Result;

use crate::models::{
    Campaign, CampaignStats, CreateCampaign, CreateCustomer, CreateGroup, CreateTemplate,
    Customer, Group, NewQueueItem, QueueItem, ShortUrl, Template,
};

/// Customer persistence operations
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn create_customer(&self, input: CreateCustomer) -> Result<Customer>;
    async fn get_customer(&self, device_id: &str, id: Uuid) -> Result<Option<Customer>>;
    async fn get_customer_by_phone(&self, device_id: &str, phone: &str)
        -> Result<Option<Customer>>;
    /// Returns one page of customers plus the unpaged total
    async fn list_customers(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<(Vec<Customer>, i64)>;
    async fn update_customer(&self, customer: &Customer) -> Result<()>;
    async fn delete_customer(&self, device_id: &str, id: Uuid) -> Result<bool>;
    async fn delete_customers(&self, device_id: &str, ids: &[Uuid]) -> Result<u64>;
    /// Per-item upsert on (device_id, phone); individual failures are
    /// skipped, the returned count is the number of rows written
    async fn bulk_create_customers(&self, customers: Vec<CreateCustomer>) -> Result<usize>;
    /// Customers with either validation field still pending, oldest first
    async fn customers_for_validation(&self, device_id: &str, limit: i64)
        -> Result<Vec<Customer>>;
    async fn update_customer_validation(
        &self,
        id: Uuid,
        phone_valid: ValidationStatus,
        network_exists: ValidationStatus,
    ) -> Result<()>;
}

/// Group persistence operations
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn create_group(&self, input: CreateGroup) -> Result<Group>;
    async fn get_group(&self, device_id: &str, id: Uuid) -> Result<Option<Group>>;
    async fn list_groups(&self, device_id: &str, limit: i64, offset: i64)
        -> Result<(Vec<Group>, i64)>;
    async fn update_group(&self, group: &Group) -> Result<()>;
    /// Deletes the group and its memberships; member customers survive
    async fn delete_group(&self, device_id: &str, id: Uuid) -> Result<bool>;
    async fn add_group_members(&self, group_id: Uuid, customer_ids: &[Uuid]) -> Result<()>;
    async fn remove_group_member(&self, group_id: Uuid, customer_id: Uuid) -> Result<()>;
    async fn group_customers(&self, group_id: Uuid) -> Result<Vec<Customer>>;
    async fn customer_groups(&self, customer_id: Uuid) -> Result<Vec<Group>>;
}

/// Template persistence operations
#[async_trait]
pub trait TemplateStore: Send + Sync {
    async fn create_template(&self, input: CreateTemplate) -> Result<Template>;
    async fn get_template(&self, device_id: &str, id: Uuid) -> Result<Option<Template>>;
    async fn list_templates(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Template>, i64)>;
    async fn update_template(&self, template: &Template) -> Result<()>;
    async fn delete_template(&self, device_id: &str, id: Uuid) -> Result<bool>;
}

/// Campaign persistence operations
#[async_trait]
pub trait CampaignOps: Send + Sync {
    async fn create_campaign(&self, input: CreateCampaign) -> Result<Campaign>;
    async fn get_campaign(&self, device_id: &str, id: Uuid) -> Result<Option<Campaign>>;
    async fn list_campaigns(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Campaign>, i64)>;
    async fn update_campaign(&self, campaign: &Campaign) -> Result<()>;
    /// Cascades to target associations and queue items in one transaction
    async fn delete_campaign(&self, device_id: &str, id: Uuid) -> Result<bool>;
    /// Replaces both target sets wholesale
    async fn set_campaign_targets(
        &self,
        campaign_id: Uuid,
        customer_ids: &[Uuid],
        group_ids: &[Uuid],
    ) -> Result<()>;
    async fn campaign_target_ids(&self, campaign_id: Uuid) -> Result<(Vec<Uuid>, Vec<Uuid>)>;
    /// The target resolver: distinct union of direct targets and group
    /// memberships, one query
    async fn campaign_target_customers(&self, campaign_id: Uuid) -> Result<Vec<Customer>>;
    async fn campaign_stats(&self, campaign_id: Uuid) -> Result<CampaignStats>;
}

/// Outbound queue operations
#[async_trait]
pub trait QueueStore: Send + Sync {
    /// Inserts all items in one transaction; (campaign, customer)
    /// conflicts keep the existing row
    async fn enqueue_messages(&self, items: Vec<NewQueueItem>) -> Result<()>;
    /// Pending items whose campaign is running, creation order
    async fn pending_messages(&self, device_id: &str, limit: i64) -> Result<Vec<QueueItem>>;
    /// Atomic status transition; sets sent_at when the status is sent
    async fn update_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
        error: Option<&str>,
    ) -> Result<()>;
    async fn is_message_queued(&self, campaign_id: Uuid, customer_id: Uuid) -> Result<bool>;
    /// Distinct device ids owning at least one pending queue item
    async fn active_device_ids(&self) -> Result<Vec<String>>;
}

/// Short URL operations
#[async_trait]
pub trait ShortUrlStore: Send + Sync {
    /// Fails with `Error::Conflict` when the code already exists
    async fn create_short_url(
        &self,
        device_id: &str,
        code: &str,
        original_url: &str,
    ) -> Result<ShortUrl>;
    async fn short_url_by_code(&self, code: &str) -> Result<Option<ShortUrl>>;
    async fn increment_short_url_clicks(&self, code: &str) -> Result<()>;
}

/// The single capability interface the campaign core depends on
pub trait CampaignStore:
    CustomerStore + GroupStore + TemplateStore + CampaignOps + QueueStore + ShortUrlStore
{
}

impl<T> CampaignStore for T where
    T: CustomerStore + GroupStore + TemplateStore + CampaignOps + QueueStore + ShortUrlStore
{
}
