//! Group usecases

use uuid::Uuid;
use wagate_common::types::Pagination;
use wagate_common::{Error, Result};
use wagate_storage::models::{CreateGroup, Customer, Group};

use super::CampaignService;

/// A group together with its member customers
#[derive(Debug, Clone)]
pub struct GroupDetails {
    pub group: Group,
    pub customers: Vec<Customer>,
}

/// One page of groups plus paging metadata
#[derive(Debug, Clone)]
pub struct GroupPage {
    pub groups: Vec<Group>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl CampaignService {
    pub async fn create_group(&self, input: CreateGroup) -> Result<Group> {
        if input.name.trim().is_empty() {
            return Err(Error::Validation("group name is required".to_string()));
        }

        self.store().create_group(input).await
    }

    pub async fn get_group(&self, device_id: &str, id: Uuid) -> Result<GroupDetails> {
        let group = self
            .store()
            .get_group(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("group not found".to_string()))?;

        let customers = self.store().group_customers(id).await?;

        Ok(GroupDetails { group, customers })
    }

    pub async fn list_groups(
        &self,
        device_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<GroupPage> {
        let paging = Pagination::new(page, page_size);
        let (groups, total) = self
            .store()
            .list_groups(device_id, paging.page_size, paging.offset())
            .await?;

        Ok(GroupPage {
            groups,
            total,
            page: paging.page,
            page_size: paging.page_size,
            total_pages: paging.total_pages(total),
        })
    }

    pub async fn update_group(
        &self,
        device_id: &str,
        id: Uuid,
        name: String,
        description: Option<String>,
    ) -> Result<Group> {
        if name.trim().is_empty() {
            return Err(Error::Validation("group name is required".to_string()));
        }

        let mut group = self
            .store()
            .get_group(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("group not found".to_string()))?;

        group.name = name;
        group.description = description;

        self.store().update_group(&group).await?;
        Ok(group)
    }

    pub async fn delete_group(&self, device_id: &str, id: Uuid) -> Result<()> {
        if !self.store().delete_group(device_id, id).await? {
            return Err(Error::NotFound("group not found".to_string()));
        }
        Ok(())
    }

    pub async fn add_customers_to_group(
        &self,
        device_id: &str,
        group_id: Uuid,
        customer_ids: &[Uuid],
    ) -> Result<()> {
        self.store()
            .get_group(device_id, group_id)
            .await?
            .ok_or_else(|| Error::NotFound("group not found".to_string()))?;

        self.store().add_group_members(group_id, customer_ids).await
    }

    pub async fn remove_customer_from_group(
        &self,
        _device_id: &str,
        group_id: Uuid,
        customer_id: Uuid,
    ) -> Result<()> {
        self.store()
            .remove_group_member(group_id, customer_id)
            .await
    }
}
