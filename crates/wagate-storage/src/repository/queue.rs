//! Queue store implementation

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use wagate_common::types::MessageStatus;
use wagate_common::Result;

use super::{map_db_err, DbStore};
use crate::models::{NewQueueItem, QueueItem};
use crate::store::QueueStore;

#[async_trait]
impl QueueStore for DbStore {
    async fn enqueue_messages(&self, items: Vec<NewQueueItem>) -> Result<()> {
        if items.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await.map_err(map_db_err)?;
        let now = Utc::now();

        for item in items {
            sqlx::query(
                r#"
                INSERT INTO campaign_messages (
                    id, campaign_id, customer_id, device_id, phone, message,
                    status, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, $7)
                ON CONFLICT (campaign_id, customer_id) DO NOTHING
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(item.campaign_id)
            .bind(item.customer_id)
            .bind(&item.device_id)
            .bind(&item.phone)
            .bind(&item.message)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)
    }

    async fn pending_messages(&self, device_id: &str, limit: i64) -> Result<Vec<QueueItem>> {
        sqlx::query_as::<_, QueueItem>(
            r#"
            SELECT m.* FROM campaign_messages m
            INNER JOIN campaigns c ON m.campaign_id = c.id
            WHERE m.device_id = $1 AND m.status = 'pending' AND c.status = 'running'
            ORDER BY m.created_at ASC
            LIMIT $2
            "#,
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn update_message_status(
        &self,
        id: Uuid,
        status: MessageStatus,
        error: Option<&str>,
    ) -> Result<()> {
        let sent_at = if status == MessageStatus::Sent {
            Some(Utc::now())
        } else {
            None
        };

        sqlx::query(
            r#"
            UPDATE campaign_messages SET
                status = $2, error = $3, sent_at = COALESCE($4, sent_at), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(status.as_str())
        .bind(error)
        .bind(sent_at)
        .execute(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn is_message_queued(&self, campaign_id: Uuid, customer_id: Uuid) -> Result<bool> {
        let count: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM campaign_messages WHERE campaign_id = $1 AND customer_id = $2",
        )
        .bind(campaign_id)
        .bind(customer_id)
        .fetch_one(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(count.0 > 0)
    }

    async fn active_device_ids(&self) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT DISTINCT device_id FROM campaign_messages WHERE status = 'pending'",
        )
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }
}
