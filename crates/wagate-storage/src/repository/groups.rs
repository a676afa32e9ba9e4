//! Group store implementation

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use wagate_common::Result;

use super::{map_db_err, DbStore};
use crate::models::{CreateGroup, Customer, Group};
use crate::store::GroupStore;

#[async_trait]
impl GroupStore for DbStore {
    async fn create_group(&self, input: CreateGroup) -> Result<Group> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO campaign_groups (id, device_id, name, description, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *, 0::BIGINT AS customer_count
            "#,
        )
        .bind(id)
        .bind(&input.device_id)
        .bind(&input.name)
        .bind(&input.description)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn get_group(&self, device_id: &str, id: Uuid) -> Result<Option<Group>> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT g.*,
                (SELECT COUNT(*) FROM campaign_group_members WHERE group_id = g.id) AS customer_count
            FROM campaign_groups g
            WHERE g.id = $1 AND g.device_id = $2
            "#,
        )
        .bind(id)
        .bind(device_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn list_groups(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Group>, i64)> {
        let total: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM campaign_groups WHERE device_id = $1")
                .bind(device_id)
                .fetch_one(self.pool())
                .await
                .map_err(map_db_err)?;

        let rows = sqlx::query_as::<_, Group>(
            r#"
            SELECT g.*,
                (SELECT COUNT(*) FROM campaign_group_members WHERE group_id = g.id) AS customer_count
            FROM campaign_groups g
            WHERE g.device_id = $1
            ORDER BY g.name ASC
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

    async fn update_group(&self, group: &Group) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE campaign_groups SET name = $3, description = $4, updated_at = NOW()
            WHERE id = $1 AND device_id = $2
            "#,
        )
        .bind(group.id)
        .bind(&group.device_id)
        .bind(&group.name)
        .bind(&group.description)
        .execute(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete_group(&self, device_id: &str, id: Uuid) -> Result<bool> {
        let mut tx = self.pool().begin().await.map_err(map_db_err)?;

        sqlx::query("DELETE FROM campaign_group_members WHERE group_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        let result = sqlx::query("DELETE FROM campaign_groups WHERE id = $1 AND device_id = $2")
            .bind(id)
            .bind(device_id)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;

        tx.commit().await.map_err(map_db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_group_members(&self, group_id: Uuid, customer_ids: &[Uuid]) -> Result<()> {
        if customer_ids.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool().begin().await.map_err(map_db_err)?;
        let now = Utc::now();

        for customer_id in customer_ids {
            sqlx::query(
                r#"
                INSERT INTO campaign_group_members (group_id, customer_id, created_at)
                VALUES ($1, $2, $3)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(group_id)
            .bind(customer_id)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(map_db_err)?;
        }

        tx.commit().await.map_err(map_db_err)
    }

    async fn remove_group_member(&self, group_id: Uuid, customer_id: Uuid) -> Result<()> {
        sqlx::query(
            "DELETE FROM campaign_group_members WHERE group_id = $1 AND customer_id = $2",
        )
        .bind(group_id)
        .bind(customer_id)
        .execute(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn group_customers(&self, group_id: Uuid) -> Result<Vec<Customer>> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT c.* FROM campaign_customers c
            INNER JOIN campaign_group_members gm ON c.id = gm.customer_id
            WHERE gm.group_id = $1
            ORDER BY c.created_at ASC
            "#,
        )
        .bind(group_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn customer_groups(&self, customer_id: Uuid) -> Result<Vec<Group>> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT g.*,
                (SELECT COUNT(*) FROM campaign_group_members WHERE group_id = g.id) AS customer_count
            FROM campaign_groups g
            INNER JOIN campaign_group_members gm ON g.id = gm.group_id
            WHERE gm.customer_id = $1
            ORDER BY g.name ASC
            "#,
        )
        .bind(customer_id)
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)
    }
}
