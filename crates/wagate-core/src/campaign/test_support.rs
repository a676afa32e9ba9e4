//! Test doubles for the campaign service and workers
//!
//! `MemStore` is a full in-memory implementation of the store traits
//! with the same integrity rules as the SQL schema (uniqueness,
//! conflict-skip on enqueue, the running-campaign join on the pending
//! query). `MockClient` scripts the WhatsApp capability traits.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use uuid::Uuid;
use wagate_common::config::CampaignConfig;
use wagate_common::types::{MessageStatus, ValidationStatus};
use wagate_common::{Error, Result};
use wagate_storage::models::{
    Campaign, CampaignStats, CreateCampaign, CreateCustomer, CreateGroup, CreateTemplate,
    Customer, Group, NewQueueItem, QueueItem, ShortUrl, Template,
};
use wagate_storage::store::{
    CampaignOps, CustomerStore, GroupStore, QueueStore, ShortUrlStore, TemplateStore,
};

use crate::campaign::CampaignService;
use crate::whatsapp::{DeviceManager, WhatsAppClient};

/// Build a service over the given store with an empty device registry
pub fn service_with(store: Arc<MemStore>) -> (CampaignService, Arc<DeviceManager>) {
    let devices = Arc::new(DeviceManager::new());
    let service = CampaignService::new(store, devices.clone(), CampaignConfig::default());
    (service, devices)
}

/// Same as [`service_with`] but with URL shortening enabled
pub fn service_with_base(
    store: Arc<MemStore>,
    base: &str,
) -> (CampaignService, Arc<DeviceManager>) {
    let devices = Arc::new(DeviceManager::new());
    let config = CampaignConfig {
        short_url_base: base.to_string(),
        ..CampaignConfig::default()
    };
    let service = CampaignService::new(store, devices.clone(), config);
    (service, devices)
}

/// Build a service over the given store and registry
pub fn service_with_devices(
    store: Arc<MemStore>,
    devices: Arc<DeviceManager>,
) -> CampaignService {
    CampaignService::new(store, devices, CampaignConfig::default())
}

#[derive(Default)]
struct Inner {
    customers: Vec<Customer>,
    groups: Vec<Group>,
    members: Vec<(Uuid, Uuid)>,
    templates: Vec<Template>,
    campaigns: Vec<Campaign>,
    target_customers: Vec<(Uuid, Uuid)>,
    target_groups: Vec<(Uuid, Uuid)>,
    messages: Vec<QueueItem>,
    short_urls: Vec<ShortUrl>,
}

/// In-memory store with SQL-equivalent integrity rules
#[derive(Default)]
pub struct MemStore {
    inner: Mutex<Inner>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // Seeding and inspection helpers for tests

    pub fn add_customer(&self, device_id: &str, phone: &str, name: Option<&str>) -> Customer {
        let customer = Customer {
            id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            phone: phone.to_string(),
            full_name: name.map(str::to_string),
            company: None,
            country: None,
            gender: None,
            birth_year: None,
            phone_valid: ValidationStatus::Pending.as_str().to_string(),
            network_exists: ValidationStatus::Pending.as_str().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().customers.push(customer.clone());
        customer
    }

    pub fn add_group(&self, device_id: &str, name: &str) -> Group {
        let group = Group {
            id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            name: name.to_string(),
            description: None,
            customer_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().groups.push(group.clone());
        group
    }

    pub fn add_member(&self, group_id: Uuid, customer_id: Uuid) {
        self.lock().members.push((group_id, customer_id));
    }

    pub fn add_template(&self, device_id: &str, name: &str, content: &str) -> Template {
        let template = Template {
            id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            name: name.to_string(),
            content: content.to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().templates.push(template.clone());
        template
    }

    pub fn add_pending_message(&self, device_id: &str, customer_id: Uuid) {
        let mut inner = self.lock();
        inner.messages.push(QueueItem {
            id: Uuid::new_v4(),
            campaign_id: Uuid::new_v4(),
            customer_id,
            device_id: device_id.to_string(),
            phone: "+15550000000".to_string(),
            message: "seed".to_string(),
            status: MessageStatus::Pending.as_str().to_string(),
            error: None,
            sent_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
    }

    pub fn get(&self, device_id: &str, id: Uuid) -> Customer {
        self.lock()
            .customers
            .iter()
            .find(|c| c.id == id && c.device_id == device_id)
            .cloned()
            .expect("customer seeded")
    }

    pub fn set_validation(&self, id: Uuid, phone_valid: &str, network_exists: &str) {
        let mut inner = self.lock();
        if let Some(customer) = inner.customers.iter_mut().find(|c| c.id == id) {
            customer.phone_valid = phone_valid.to_string();
            customer.network_exists = network_exists.to_string();
        }
    }

    pub fn is_queued(&self, campaign_id: Uuid, customer_id: Uuid) -> bool {
        self.lock()
            .messages
            .iter()
            .any(|m| m.campaign_id == campaign_id && m.customer_id == customer_id)
    }

    pub fn queued_message(&self, campaign_id: Uuid, customer_id: Uuid) -> Option<String> {
        self.lock()
            .messages
            .iter()
            .find(|m| m.campaign_id == campaign_id && m.customer_id == customer_id)
            .map(|m| m.message.clone())
    }

    pub fn message_count(&self, campaign_id: Uuid) -> usize {
        self.lock()
            .messages
            .iter()
            .filter(|m| m.campaign_id == campaign_id)
            .count()
    }

    pub fn status_count(&self, campaign_id: Uuid, status: &str) -> usize {
        self.lock()
            .messages
            .iter()
            .filter(|m| m.campaign_id == campaign_id && m.status == status)
            .count()
    }

    pub fn message_error(&self, campaign_id: Uuid) -> Option<String> {
        self.lock()
            .messages
            .iter()
            .filter(|m| m.campaign_id == campaign_id)
            .find_map(|m| m.error.clone())
    }

    pub fn campaign_status(&self, campaign_id: Uuid) -> String {
        self.lock()
            .campaigns
            .iter()
            .find(|c| c.id == campaign_id)
            .map(|c| c.status.clone())
            .expect("campaign seeded")
    }

    pub fn stats(&self, campaign_id: Uuid) -> CampaignStats {
        stats_of(&self.lock(), campaign_id)
    }

    pub fn short_url_clicks(&self, code: &str) -> i32 {
        self.lock()
            .short_urls
            .iter()
            .find(|s| s.code == code)
            .map(|s| s.clicks)
            .unwrap_or(0)
    }
}

fn stats_of(inner: &Inner, campaign_id: Uuid) -> CampaignStats {
    let mut stats = CampaignStats::default();
    for message in inner.messages.iter().filter(|m| m.campaign_id == campaign_id) {
        stats.total_messages += 1;
        match message.status.as_str() {
            "pending" => stats.pending_messages += 1,
            "sent" => stats.sent_messages += 1,
            "failed" => stats.failed_messages += 1,
            _ => {}
        }
    }
    stats
}

#[async_trait]
impl CustomerStore for MemStore {
    async fn create_customer(&self, input: CreateCustomer) -> Result<Customer> {
        let mut inner = self.lock();
        if inner
            .customers
            .iter()
            .any(|c| c.device_id == input.device_id && c.phone == input.phone)
        {
            return Err(Error::Conflict("duplicate (device_id, phone)".to_string()));
        }

        let customer = Customer {
            id: Uuid::new_v4(),
            device_id: input.device_id,
            phone: input.phone,
            full_name: input.full_name,
            company: input.company,
            country: input.country,
            gender: input.gender,
            birth_year: input.birth_year,
            phone_valid: ValidationStatus::Pending.as_str().to_string(),
            network_exists: ValidationStatus::Pending.as_str().to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner.customers.push(customer.clone());
        Ok(customer)
    }

    async fn get_customer(&self, device_id: &str, id: Uuid) -> Result<Option<Customer>> {
        Ok(self
            .lock()
            .customers
            .iter()
            .find(|c| c.id == id && c.device_id == device_id)
            .cloned())
    }

    async fn get_customer_by_phone(
        &self,
        device_id: &str,
        phone: &str,
    ) -> Result<Option<Customer>> {
        Ok(self
            .lock()
            .customers
            .iter()
            .find(|c| c.phone == phone && c.device_id == device_id)
            .cloned())
    }

    async fn list_customers(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<(Vec<Customer>, i64)> {
        let inner = self.lock();
        let needle = search.map(str::to_lowercase);
        let matching: Vec<&Customer> = inner
            .customers
            .iter()
            .rev() // created_at DESC
            .filter(|c| c.device_id == device_id)
            .filter(|c| match &needle {
                Some(needle) => {
                    c.phone.to_lowercase().contains(needle)
                        || c.full_name
                            .as_deref()
                            .is_some_and(|n| n.to_lowercase().contains(needle))
                }
                None => true,
            })
            .collect();

        let total = matching.len() as i64;
        let rows = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((rows, total))
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .customers
            .iter_mut()
            .find(|c| c.id == customer.id && c.device_id == customer.device_id)
        {
            *existing = customer.clone();
            existing.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_customer(&self, device_id: &str, id: Uuid) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.customers.len();
        inner
            .customers
            .retain(|c| !(c.id == id && c.device_id == device_id));
        Ok(inner.customers.len() < before)
    }

    async fn delete_customers(&self, device_id: &str, ids: &[Uuid]) -> Result<u64> {
        let mut inner = self.lock();
        let before = inner.customers.len();
        inner
            .customers
            .retain(|c| !(c.device_id == device_id && ids.contains(&c.id)));
        Ok((before - inner.customers.len()) as u64)
    }

    async fn bulk_create_customers(&self, customers: Vec<CreateCustomer>) -> Result<usize> {
        let mut inner = self.lock();
        let mut written = 0usize;

        for input in customers {
            if let Some(existing) = inner
                .customers
                .iter_mut()
                .find(|c| c.device_id == input.device_id && c.phone == input.phone)
            {
                existing.full_name = input.full_name;
                existing.company = input.company;
                existing.country = input.country;
                existing.gender = input.gender;
                existing.birth_year = input.birth_year;
                existing.updated_at = Utc::now();
            } else {
                inner.customers.push(Customer {
                    id: Uuid::new_v4(),
                    device_id: input.device_id,
                    phone: input.phone,
                    full_name: input.full_name,
                    company: input.company,
                    country: input.country,
                    gender: input.gender,
                    birth_year: input.birth_year,
                    phone_valid: ValidationStatus::Pending.as_str().to_string(),
                    network_exists: ValidationStatus::Pending.as_str().to_string(),
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                });
            }
            written += 1;
        }

        Ok(written)
    }

    async fn customers_for_validation(
        &self,
        device_id: &str,
        limit: i64,
    ) -> Result<Vec<Customer>> {
        Ok(self
            .lock()
            .customers
            .iter()
            .filter(|c| {
                c.device_id == device_id
                    && (c.phone_valid == "pending" || c.network_exists == "pending")
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_customer_validation(
        &self,
        id: Uuid,
        phone_valid: ValidationStatus,
        network_exists: ValidationStatus,
    ) -> Result<()> {
        let mut inner = self.lock();
        if let Some(customer) = inner.customers.iter_mut().find(|c| c.id == id) {
            customer.phone_valid = phone_valid.as_str().to_string();
            customer.network_exists = network_exists.as_str().to_string();
            customer.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[async_trait]
impl GroupStore for MemStore {
    async fn create_group(&self, input: CreateGroup) -> Result<Group> {
        let mut inner = self.lock();
        if inner
            .groups
            .iter()
            .any(|g| g.device_id == input.device_id && g.name == input.name)
        {
            return Err(Error::Conflict("duplicate (device_id, name)".to_string()));
        }

        let group = Group {
            id: Uuid::new_v4(),
            device_id: input.device_id,
            name: input.name,
            description: input.description,
            customer_count: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner.groups.push(group.clone());
        Ok(group)
    }

    async fn get_group(&self, device_id: &str, id: Uuid) -> Result<Option<Group>> {
        let inner = self.lock();
        Ok(inner
            .groups
            .iter()
            .find(|g| g.id == id && g.device_id == device_id)
            .map(|g| {
                let mut group = g.clone();
                group.customer_count =
                    inner.members.iter().filter(|(gid, _)| *gid == id).count() as i64;
                group
            }))
    }

    async fn list_groups(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Group>, i64)> {
        let inner = self.lock();
        let mut matching: Vec<Group> = inner
            .groups
            .iter()
            .filter(|g| g.device_id == device_id)
            .map(|g| {
                let mut group = g.clone();
                group.customer_count =
                    inner.members.iter().filter(|(gid, _)| *gid == g.id).count() as i64;
                group
            })
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        let total = matching.len() as i64;
        let rows = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((rows, total))
    }

    async fn update_group(&self, group: &Group) -> Result<()> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .groups
            .iter_mut()
            .find(|g| g.id == group.id && g.device_id == group.device_id)
        {
            existing.name = group.name.clone();
            existing.description = group.description.clone();
            existing.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_group(&self, device_id: &str, id: Uuid) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.groups.len();
        inner
            .groups
            .retain(|g| !(g.id == id && g.device_id == device_id));
        let deleted = inner.groups.len() < before;
        if deleted {
            inner.members.retain(|(gid, _)| *gid != id);
        }
        Ok(deleted)
    }

    async fn add_group_members(&self, group_id: Uuid, customer_ids: &[Uuid]) -> Result<()> {
        let mut inner = self.lock();
        for customer_id in customer_ids {
            if !inner
                .members
                .iter()
                .any(|(gid, cid)| *gid == group_id && cid == customer_id)
            {
                inner.members.push((group_id, *customer_id));
            }
        }
        Ok(())
    }

    async fn remove_group_member(&self, group_id: Uuid, customer_id: Uuid) -> Result<()> {
        self.lock()
            .members
            .retain(|(gid, cid)| !(*gid == group_id && *cid == customer_id));
        Ok(())
    }

    async fn group_customers(&self, group_id: Uuid) -> Result<Vec<Customer>> {
        let inner = self.lock();
        let member_ids: HashSet<Uuid> = inner
            .members
            .iter()
            .filter(|(gid, _)| *gid == group_id)
            .map(|(_, cid)| *cid)
            .collect();
        Ok(inner
            .customers
            .iter()
            .filter(|c| member_ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn customer_groups(&self, customer_id: Uuid) -> Result<Vec<Group>> {
        let inner = self.lock();
        let group_ids: HashSet<Uuid> = inner
            .members
            .iter()
            .filter(|(_, cid)| *cid == customer_id)
            .map(|(gid, _)| *gid)
            .collect();
        let mut groups: Vec<Group> = inner
            .groups
            .iter()
            .filter(|g| group_ids.contains(&g.id))
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }
}

#[async_trait]
impl TemplateStore for MemStore {
    async fn create_template(&self, input: CreateTemplate) -> Result<Template> {
        let mut inner = self.lock();
        if inner
            .templates
            .iter()
            .any(|t| t.device_id == input.device_id && t.name == input.name)
        {
            return Err(Error::Conflict("duplicate (device_id, name)".to_string()));
        }

        let template = Template {
            id: Uuid::new_v4(),
            device_id: input.device_id,
            name: input.name,
            content: input.content,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        inner.templates.push(template.clone());
        Ok(template)
    }

    async fn get_template(&self, device_id: &str, id: Uuid) -> Result<Option<Template>> {
        Ok(self
            .lock()
            .templates
            .iter()
            .find(|t| t.id == id && t.device_id == device_id)
            .cloned())
    }

    async fn list_templates(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Template>, i64)> {
        let inner = self.lock();
        let mut matching: Vec<Template> = inner
            .templates
            .iter()
            .filter(|t| t.device_id == device_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.name.cmp(&b.name));

        let total = matching.len() as i64;
        let rows = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((rows, total))
    }

    async fn update_template(&self, template: &Template) -> Result<()> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .templates
            .iter_mut()
            .find(|t| t.id == template.id && t.device_id == template.device_id)
        {
            existing.name = template.name.clone();
            existing.content = template.content.clone();
            existing.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_template(&self, device_id: &str, id: Uuid) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.templates.len();
        inner
            .templates
            .retain(|t| !(t.id == id && t.device_id == device_id));
        Ok(inner.templates.len() < before)
    }
}

#[async_trait]
impl CampaignOps for MemStore {
    async fn create_campaign(&self, input: CreateCampaign) -> Result<Campaign> {
        let campaign = Campaign {
            id: Uuid::new_v4(),
            device_id: input.device_id,
            name: input.name,
            template_id: input.template_id,
            status: "draft".to_string(),
            scheduled_at: input.scheduled_at,
            started_at: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().campaigns.push(campaign.clone());
        Ok(campaign)
    }

    async fn get_campaign(&self, device_id: &str, id: Uuid) -> Result<Option<Campaign>> {
        Ok(self
            .lock()
            .campaigns
            .iter()
            .find(|c| c.id == id && c.device_id == device_id)
            .cloned())
    }

    async fn list_campaigns(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Campaign>, i64)> {
        let inner = self.lock();
        let matching: Vec<&Campaign> = inner
            .campaigns
            .iter()
            .rev()
            .filter(|c| c.device_id == device_id)
            .collect();

        let total = matching.len() as i64;
        let rows = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();
        Ok((rows, total))
    }

    async fn update_campaign(&self, campaign: &Campaign) -> Result<()> {
        let mut inner = self.lock();
        if let Some(existing) = inner
            .campaigns
            .iter_mut()
            .find(|c| c.id == campaign.id && c.device_id == campaign.device_id)
        {
            *existing = campaign.clone();
            existing.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete_campaign(&self, device_id: &str, id: Uuid) -> Result<bool> {
        let mut inner = self.lock();
        let before = inner.campaigns.len();
        inner
            .campaigns
            .retain(|c| !(c.id == id && c.device_id == device_id));
        let deleted = inner.campaigns.len() < before;
        if deleted {
            inner.target_customers.retain(|(cid, _)| *cid != id);
            inner.target_groups.retain(|(cid, _)| *cid != id);
            inner.messages.retain(|m| m.campaign_id != id);
        }
        Ok(deleted)
    }

    async fn set_campaign_targets(
        &self,
        campaign_id: Uuid,
        customer_ids: &[Uuid],
        group_ids: &[Uuid],
    ) -> Result<()> {
        let mut inner = self.lock();
        inner.target_customers.retain(|(cid, _)| *cid != campaign_id);
        inner.target_groups.retain(|(cid, _)| *cid != campaign_id);
        for customer_id in customer_ids {
            inner.target_customers.push((campaign_id, *customer_id));
        }
        for group_id in group_ids {
            inner.target_groups.push((campaign_id, *group_id));
        }
        Ok(())
    }

    async fn campaign_target_ids(&self, campaign_id: Uuid) -> Result<(Vec<Uuid>, Vec<Uuid>)> {
        let inner = self.lock();
        Ok((
            inner
                .target_customers
                .iter()
                .filter(|(cid, _)| *cid == campaign_id)
                .map(|(_, id)| *id)
                .collect(),
            inner
                .target_groups
                .iter()
                .filter(|(cid, _)| *cid == campaign_id)
                .map(|(_, id)| *id)
                .collect(),
        ))
    }

    async fn campaign_target_customers(&self, campaign_id: Uuid) -> Result<Vec<Customer>> {
        let inner = self.lock();

        let mut ids: HashSet<Uuid> = inner
            .target_customers
            .iter()
            .filter(|(cid, _)| *cid == campaign_id)
            .map(|(_, id)| *id)
            .collect();

        for (cid, group_id) in &inner.target_groups {
            if *cid == campaign_id {
                ids.extend(
                    inner
                        .members
                        .iter()
                        .filter(|(gid, _)| gid == group_id)
                        .map(|(_, customer_id)| *customer_id),
                );
            }
        }

        Ok(inner
            .customers
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn campaign_stats(&self, campaign_id: Uuid) -> Result<CampaignStats> {
        Ok(stats_of(&self.lock(), campaign_id))
    }
}

#[async_trait]
impl QueueStore for MemStore {
    async fn enqueue_messages(&self, items: Vec<NewQueueItem>) -> Result<()> {
        let mut inner = self.lock();
        for item in items {
            let exists = inner
                .messages
                .iter()
                .any(|m| m.campaign_id == item.campaign_id && m.customer_id == item.customer_id);
            if exists {
                continue;
            }
            inner.messages.push(QueueItem {
                id: Uuid::new_v4(),
                campaign_id: item.campaign_id,
                customer_id: item.customer_id,
                device_id: item.device_id,
                phone: item.phone,
                message: item.message,
                status: MessageStatus::Pending.as_str().to_string(),
                error: None,
                sent_at: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            });
        }
        Ok(())
    }

    async fn pending_messages(&self, device_id: &str, limit: i64) -> Result<Vec<QueueItem>> {
        let inner = self.lock();
        let running: HashSet<Uuid> = inner
            .campaigns
            .iter()
            .filter(|c| c.status == "running")
            .map(|c| c.id)
            .collect();

        Ok(inner
            .messages
            .iter()
            .filter(|m| {
                m.device_id == device_id
                    && m.status == "pending"
                    && running.contains(&m.campaign_id)
            })
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn update_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
        error: Option<&str>,
    ) -> Result<()> {
        let mut inner = self.lock();
        if let Some(message) = inner.messages.iter_mut().find(|m| m.id == id) {
            message.status = status.as_str().to_string();
            message.error = error.map(str::to_string);
            if status == MessageStatus::Sent {
                message.sent_at = Some(Utc::now());
            }
            message.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn is_message_queued(&self, campaign_id: Uuid, customer_id: Uuid) -> Result<bool> {
        Ok(self.is_queued(campaign_id, customer_id))
    }

    async fn active_device_ids(&self) -> Result<Vec<String>> {
        let inner = self.lock();
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for message in inner.messages.iter().filter(|m| m.status == "pending") {
            if seen.insert(message.device_id.clone()) {
                ids.push(message.device_id.clone());
            }
        }
        Ok(ids)
    }
}

#[async_trait]
impl ShortUrlStore for MemStore {
    async fn create_short_url(
        &self,
        device_id: &str,
        code: &str,
        original_url: &str,
    ) -> Result<ShortUrl> {
        let mut inner = self.lock();
        if inner.short_urls.iter().any(|s| s.code == code) {
            return Err(Error::Conflict("duplicate short code".to_string()));
        }

        let short_url = ShortUrl {
            id: Uuid::new_v4(),
            device_id: device_id.to_string(),
            code: code.to_string(),
            original_url: original_url.to_string(),
            clicks: 0,
            created_at: Utc::now(),
        };
        inner.short_urls.push(short_url.clone());
        Ok(short_url)
    }

    async fn short_url_by_code(&self, code: &str) -> Result<Option<ShortUrl>> {
        Ok(self
            .lock()
            .short_urls
            .iter()
            .find(|s| s.code == code)
            .cloned())
    }

    async fn increment_short_url_clicks(&self, code: &str) -> Result<()> {
        let mut inner = self.lock();
        if let Some(short_url) = inner.short_urls.iter_mut().find(|s| s.code == code) {
            short_url.clicks += 1;
        }
        Ok(())
    }
}

/// Scripted WhatsApp client double
pub struct MockClient {
    logged_in: bool,
    fail_with: Option<String>,
    on_network: Mutex<HashSet<String>>,
    sends: Mutex<Vec<(String, String)>>,
    probes: AtomicUsize,
}

impl MockClient {
    pub fn logged_in() -> Self {
        Self {
            logged_in: true,
            fail_with: None,
            on_network: Mutex::new(HashSet::new()),
            sends: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
        }
    }

    pub fn logged_out() -> Self {
        Self {
            logged_in: false,
            ..Self::logged_in()
        }
    }

    pub fn failing(error: &str) -> Self {
        Self {
            fail_with: Some(error.to_string()),
            ..Self::logged_in()
        }
    }

    pub fn put_on_network(&self, jid: &str) {
        self.on_network
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(jid.to_string());
    }

    pub fn sent_count(&self) -> usize {
        self.sends.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn last_send(&self) -> Option<(String, String)> {
        self.sends
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WhatsAppClient for MockClient {
    fn is_logged_in(&self) -> bool {
        self.logged_in
    }

    async fn send_text(&self, phone: &str, message: &str) -> Result<String> {
        self.sends
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((phone.to_string(), message.to_string()));
        if let Some(error) = &self.fail_with {
            return Err(Error::Internal(error.clone()));
        }
        Ok(Uuid::new_v4().simple().to_string())
    }

    async fn is_on_network(&self, jid: &str) -> Result<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .on_network
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(jid))
    }
}
