//! Campaign usecases: lifecycle state machine and the enqueuer

use chrono::Utc;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{info, warn};
use uuid::Uuid;
use wagate_common::types::{CampaignStatus, Pagination};
use wagate_common::{Error, Result};
use wagate_storage::models::{
    Campaign, CampaignStats, CreateCampaign, NewQueueItem, Template,
};

use super::{template, CampaignService};

/// A campaign with its template, stats, and target ids loaded
#[derive(Debug, Clone)]
pub struct CampaignDetails {
    pub campaign: Campaign,
    pub template: Option<Template>,
    pub stats: CampaignStats,
    pub customer_ids: Vec<Uuid>,
    pub group_ids: Vec<Uuid>,
}

/// One page of campaigns, each with its stats
#[derive(Debug, Clone)]
pub struct CampaignPage {
    pub campaigns: Vec<(Campaign, CampaignStats)>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

/// Campaign create/update input at the usecase level
#[derive(Debug, Clone)]
pub struct CampaignInput {
    pub name: String,
    pub template_id: Uuid,
    pub customer_ids: Vec<Uuid>,
    pub group_ids: Vec<Uuid>,
    pub scheduled_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl CampaignService {
    pub async fn create_campaign(
        &self,
        device_id: &str,
        input: CampaignInput,
    ) -> Result<Campaign> {
        if input.name.trim().is_empty() {
            return Err(Error::Validation("campaign name is required".to_string()));
        }

        self.store()
            .get_template(device_id, input.template_id)
            .await?
            .ok_or_else(|| Error::NotFound("template not found".to_string()))?;

        let campaign = self
            .store()
            .create_campaign(CreateCampaign {
                device_id: device_id.to_string(),
                name: input.name,
                template_id: input.template_id,
                scheduled_at: input.scheduled_at,
            })
            .await?;

        if !input.customer_ids.is_empty() || !input.group_ids.is_empty() {
            self.store()
                .set_campaign_targets(campaign.id, &input.customer_ids, &input.group_ids)
                .await?;
        }

        Ok(campaign)
    }

    pub async fn get_campaign(&self, device_id: &str, id: Uuid) -> Result<CampaignDetails> {
        let campaign = self
            .store()
            .get_campaign(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("campaign not found".to_string()))?;

        let template = self
            .store()
            .get_template(device_id, campaign.template_id)
            .await?;
        let stats = self.store().campaign_stats(id).await?;
        let (customer_ids, group_ids) = self.store().campaign_target_ids(id).await?;

        Ok(CampaignDetails {
            campaign,
            template,
            stats,
            customer_ids,
            group_ids,
        })
    }

    pub async fn list_campaigns(
        &self,
        device_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<CampaignPage> {
        let paging = Pagination::new(page, page_size);
        let (campaigns, total) = self
            .store()
            .list_campaigns(device_id, paging.page_size, paging.offset())
            .await?;

        let mut rows = Vec::with_capacity(campaigns.len());
        for campaign in campaigns {
            let stats = self.store().campaign_stats(campaign.id).await?;
            rows.push((campaign, stats));
        }

        Ok(CampaignPage {
            campaigns: rows,
            total,
            page: paging.page,
            page_size: paging.page_size,
            total_pages: paging.total_pages(total),
        })
    }

    pub async fn update_campaign(
        &self,
        device_id: &str,
        id: Uuid,
        input: CampaignInput,
    ) -> Result<Campaign> {
        let mut campaign = self
            .store()
            .get_campaign(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("campaign not found".to_string()))?;

        if campaign.status == CampaignStatus::Running.as_str() {
            return Err(Error::Conflict(
                "cannot update running campaign, pause it first".to_string(),
            ));
        }

        campaign.name = input.name;
        campaign.template_id = input.template_id;
        campaign.scheduled_at = input.scheduled_at;

        self.store().update_campaign(&campaign).await?;
        self.store()
            .set_campaign_targets(id, &input.customer_ids, &input.group_ids)
            .await?;

        Ok(campaign)
    }

    pub async fn delete_campaign(&self, device_id: &str, id: Uuid) -> Result<()> {
        let campaign = self
            .store()
            .get_campaign(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("campaign not found".to_string()))?;

        if campaign.status == CampaignStatus::Running.as_str() {
            return Err(Error::Conflict(
                "cannot delete running campaign, pause it first".to_string(),
            ));
        }

        self.store().delete_campaign(device_id, id).await?;
        Ok(())
    }

    /// Start (or resume) a campaign.
    ///
    /// Renders one message per resolved target and enqueues all new
    /// (campaign, customer) pairs in a single transaction; pairs already
    /// queued in any status are skipped, so restarting never duplicates
    /// messages. Only then does the campaign transition to running.
    pub async fn start_campaign(&self, device_id: &str, id: Uuid) -> Result<()> {
        info!(campaign_id = %id, device_id = %device_id, "Starting campaign");

        let mut campaign = self
            .store()
            .get_campaign(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("campaign not found".to_string()))?;

        let status = CampaignStatus::from_str(&campaign.status)?;
        if status != CampaignStatus::Draft && status != CampaignStatus::Paused {
            return Err(Error::Conflict("campaign is already running".to_string()));
        }

        let template = self
            .store()
            .get_template(device_id, campaign.template_id)
            .await?
            .ok_or_else(|| Error::NotFound("campaign template not found".to_string()))?;

        let customers = self.store().campaign_target_customers(id).await?;
        if customers.is_empty() {
            return Err(Error::Validation(
                "no target customers for campaign".to_string(),
            ));
        }

        info!(
            campaign = %campaign.name,
            targets = customers.len(),
            "Resolved campaign targets"
        );

        // Group names per customer for the [GROUP] placeholder
        let mut customer_groups: HashMap<Uuid, String> = HashMap::new();
        for customer in &customers {
            let groups = self.store().customer_groups(customer.id).await?;
            if !groups.is_empty() {
                let names: Vec<&str> = groups.iter().map(|g| g.name.as_str()).collect();
                customer_groups.insert(customer.id, names.join(", "));
            }
        }

        let mut items = Vec::new();
        let mut skipped_already_queued = 0usize;
        for customer in &customers {
            if self.store().is_message_queued(id, customer.id).await? {
                skipped_already_queued += 1;
                continue;
            }

            let message = template::render(&template.content, Some(customer));
            let group_names = customer_groups
                .get(&customer.id)
                .map(String::as_str)
                .unwrap_or("");
            let message = template::substitute_group(&message, group_names);

            let message = match self.shorten_urls_in_text(device_id, &message).await {
                Ok(text) => text,
                Err(e) => {
                    warn!(error = %e, "Failed to shorten URLs, sending original text");
                    message
                }
            };

            items.push(NewQueueItem {
                campaign_id: id,
                customer_id: customer.id,
                device_id: device_id.to_string(),
                phone: customer.phone.clone(),
                message,
            });
        }

        info!(
            new_messages = items.len(),
            already_queued = skipped_already_queued,
            total_targets = customers.len(),
            "Prepared campaign queue"
        );

        if !items.is_empty() {
            self.store().enqueue_messages(items).await?;
        }

        campaign.status = CampaignStatus::Running.as_str().to_string();
        if campaign.started_at.is_none() {
            campaign.started_at = Some(Utc::now());
        }
        self.store().update_campaign(&campaign).await?;

        info!(campaign = %campaign.name, "Campaign started");
        Ok(())
    }

    pub async fn pause_campaign(&self, device_id: &str, id: Uuid) -> Result<()> {
        let mut campaign = self
            .store()
            .get_campaign(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("campaign not found".to_string()))?;

        if campaign.status != CampaignStatus::Running.as_str() {
            return Err(Error::Conflict("campaign is not running".to_string()));
        }

        campaign.status = CampaignStatus::Paused.as_str().to_string();
        self.store().update_campaign(&campaign).await?;

        info!(campaign_id = %id, "Campaign paused");
        Ok(())
    }

    pub async fn campaign_stats(&self, device_id: &str, id: Uuid) -> Result<CampaignStats> {
        self.store()
            .get_campaign(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("campaign not found".to_string()))?;

        self.store().campaign_stats(id).await
    }
}
