//! Template store implementation

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use wagate_common::Result;

use super::{map_db_err, DbStore};
use crate::models::{CreateTemplate, Template};
use crate::store::TemplateStore;

#[async_trait]
impl TemplateStore for DbStore {
    async fn create_template(&self, input: CreateTemplate) -> Result<Template> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query_as::<_, Template>(
            r#"
            INSERT INTO campaign_templates (id, device_id, name, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.device_id)
        .bind(&input.name)
        .bind(&input.content)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn get_template(&self, device_id: &str, id: Uuid) -> Result<Option<Template>> {
        sqlx::query_as::<_, Template>(
            "SELECT * FROM campaign_templates WHERE id = $1 AND device_id = $2",
        )
        .bind(id)
        .bind(device_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn list_templates(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Template>, i64)> {
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM campaign_templates WHERE device_id = $1")
                .bind(device_id)
                .fetch_one(self.pool())
                .await
                .map_err(map_db_err)?;

        let rows = sqlx::query_as::<_, Template>(
            r#"
            SELECT * FROM campaign_templates
            WHERE device_id = $1
            ORDER BY name ASC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(device_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok((rows, total.0))
    }

    async fn update_template(&self, template: &Template) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE campaign_templates SET name = $3, content = $4, updated_at = NOW()
            WHERE id = $1 AND device_id = $2
            "#,
        )
        .bind(template.id)
        .bind(&template.device_id)
        .bind(&template.name)
        .bind(&template.content)
        .execute(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete_template(&self, device_id: &str, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM campaign_templates WHERE id = $1 AND device_id = $2")
                .bind(id)
                .bind(device_id)
                .execute(self.pool())
                .await
                .map_err(map_db_err)?;

        Ok(result.rows_affected() > 0)
    }
}
