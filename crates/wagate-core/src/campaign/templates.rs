//! Template usecases

use uuid::Uuid;
use wagate_common::types::Pagination;
use wagate_common::{Error, Result};
use wagate_storage::models::{CreateTemplate, Customer, Template};

use super::{template, CampaignService};

/// One page of templates plus paging metadata
#[derive(Debug, Clone)]
pub struct TemplatePage {
    pub templates: Vec<Template>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl CampaignService {
    pub async fn create_template(&self, input: CreateTemplate) -> Result<Template> {
        if input.name.trim().is_empty() {
            return Err(Error::Validation("template name is required".to_string()));
        }
        if input.content.trim().is_empty() {
            return Err(Error::Validation(
                "template content is required".to_string(),
            ));
        }

        self.store().create_template(input).await
    }

    pub async fn get_template(&self, device_id: &str, id: Uuid) -> Result<Template> {
        self.store()
            .get_template(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("template not found".to_string()))
    }

    pub async fn list_templates(
        &self,
        device_id: &str,
        page: i64,
        page_size: i64,
    ) -> Result<TemplatePage> {
        let paging = Pagination::new(page, page_size);
        let (templates, total) = self
            .store()
            .list_templates(device_id, paging.page_size, paging.offset())
            .await?;

        Ok(TemplatePage {
            templates,
            total,
            page: paging.page,
            page_size: paging.page_size,
            total_pages: paging.total_pages(total),
        })
    }

    pub async fn update_template(
        &self,
        device_id: &str,
        id: Uuid,
        name: String,
        content: String,
    ) -> Result<Template> {
        if name.trim().is_empty() {
            return Err(Error::Validation("template name is required".to_string()));
        }
        if content.trim().is_empty() {
            return Err(Error::Validation(
                "template content is required".to_string(),
            ));
        }

        let mut template = self
            .store()
            .get_template(device_id, id)
            .await?
            .ok_or_else(|| Error::NotFound("template not found".to_string()))?;

        template.name = name;
        template.content = content;

        self.store().update_template(&template).await?;
        Ok(template)
    }

    pub async fn delete_template(&self, device_id: &str, id: Uuid) -> Result<()> {
        if !self.store().delete_template(device_id, id).await? {
            return Err(Error::NotFound("template not found".to_string()));
        }
        Ok(())
    }

    /// Expand customer placeholders for a preview; `[GROUP]` stays as-is
    pub fn preview_template(&self, content: &str, customer: Option<&Customer>) -> String {
        template::render(content, customer)
    }
}
