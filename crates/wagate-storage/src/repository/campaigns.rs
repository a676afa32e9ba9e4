//! Campaign store implementation

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use wagate_common::types::CampaignStatus;
use wagate_common::Result;

use super::{map_db_err, DbStore};
use crate::models::{Campaign, CampaignStats, CreateCampaign, Customer};
use crate::store::CampaignOps;

#[async_trait]
impl CampaignOps for DbStore {
    async fn create_campaign(&self, input: CreateCampaign) -> Result<Campaign> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query_as::<_, Campaign>(
            r#"
            INSERT INTO campaigns (
                id, device_id, name, template_id, status, scheduled_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.device_id)
        .bind(&input.name)
        .bind(input.template_id)
        .bind(CampaignStatus::Draft.as_str())
        .bind(input.scheduled_at)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn get_campaign(&self, device_id: &str, id: Uuid) -> Result<Option<Campaign>> {
        sqlx::query_as::<_, Campaign>(
            "SELECT * FROM campaigns WHERE id = $1 AND device_id = $2",
        )
        .bind(id)
        .bind(device_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn list_campaigns(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Campaign>, i64)> {
        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM campaigns WHERE device_id = $1")
            .bind(device_id)
            .fetch_one(self.pool())
            .await
            .map_err(map_db_err)?;

        let rows = sqlx::query_as::<_, Campaign>(
            r#"
            SELECT * FROM campaigns
            WHERE device_id = $1
            ORDER BY created_at DESC
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

    async fn update_campaign(&self, campaign: &Campaign) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE campaigns SET
                name = $3, template_id = $4, status = $5, scheduled_at = $6,
                started_at = $7, completed_at = $8, updated_at = NOW()
            WHERE id = $1 AND device_id = $2
            "#,
        )
        .bind(campaign.id)
        .bind(&campaign.device_id)
        .bind(&campaign.name)
        .bind(campaign.template_id)
        .bind(&campaign.status)
        .bind(campaign.scheduled_at)
        .bind(campaign.started_at)
        .bind(campaign.completed_at)
        .execute(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete_campaign(&self, device_id: &str, id: Uuid) -> Result<bool> {
        let mut tx = self.pool().begin().await.map_err(map_db_err)?;

        sqlx::query("DELETE FROM campaign_target_customers WHERE campaign_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("DELETE FROM campaign_target_groups WHERE campaign_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("DELETE FROM campaign_messages WHERE campaign_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        let result = sqlx::query("DELETE FROM campaigns WHERE id = $1 AND device_id = $2")
            .bind(id)
            .bind(device_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn set_campaign_targets(
        &self,
        campaign_id: Uuid,
        customer_ids: &[Uuid],
        group_ids: &[Uuid],
    ) -> Result<()> {
        let mut tx = self.pool().begin().await.map_err(map_db_err)?;

        sqlx::query("DELETE FROM campaign_target_customers WHERE campaign_id = $1")
            .bind(campaign_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        sqlx::query("DELETE FROM campaign_target_groups WHERE campaign_id = $1")
            .bind(campaign_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        for customer_id in customer_ids {
            sqlx::query(
                r#"
                INSERT INTO campaign_target_customers (campaign_id, customer_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(campaign_id)
            .bind(customer_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        for group_id in group_ids {
            sqlx::query(
                r#"
                INSERT INTO campaign_target_groups (campaign_id, group_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(campaign_id)
            .bind(group_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)
    }

    async fn campaign_target_ids(&self, campaign_id: Uuid) -> Result<(Vec<Uuid>, Vec<Uuid>)> {
        let customers: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT customer_id FROM campaign_target_customers WHERE campaign_id = $1",
        )
        .bind(campaign_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)?;

        let groups: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT group_id FROM campaign_target_groups WHERE campaign_id = $1",
        )
        .bind(campaign_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok((
            customers.into_iter().map(|(id,)| id).collect(),
            groups.into_iter().map(|(id,)| id).collect(),
        ))
    }

    async fn campaign_target_customers(&self, campaign_id: Uuid) -> Result<Vec<Customer>> {
        // Direct targets plus members of targeted groups, each customer once
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT DISTINCT c.* FROM campaign_customers c
            WHERE c.id IN (
                SELECT customer_id FROM campaign_target_customers WHERE campaign_id = $1
                UNION
                SELECT gm.customer_id FROM campaign_group_members gm
                INNER JOIN campaign_target_groups tg ON gm.group_id = tg.group_id
                WHERE tg.campaign_id = $1
            )
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(campaign_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn campaign_stats(&self, campaign_id: Uuid) -> Result<CampaignStats> {
        sqlx::query_as::<_, CampaignStats>(
            r#"
            SELECT
                COUNT(*) AS total_messages,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending_messages,
                COUNT(*) FILTER (WHERE status = 'sent') AS sent_messages,
                COUNT(*) FILTER (WHERE status = 'failed') AS failed_messages
            FROM campaign_messages
            WHERE campaign_id = $1
            "#,
        )
        .bind(campaign_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_db_err)
    }
}
