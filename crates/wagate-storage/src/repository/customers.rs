//! Customer store implementation

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use wagate_common::types::ValidationStatus;
use wagate_common::Result;

use super::{map_db_err, DbStore};
use crate::models::{CreateCustomer, Customer};
use crate::store::CustomerStore;

#[async_trait]
impl CustomerStore for DbStore {
    async fn create_customer(&self, input: CreateCustomer) -> Result<Customer> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO campaign_customers (
                id, device_id, phone, full_name, company, country, gender, birth_year,
                phone_valid, network_exists, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', 'pending', $9, $9)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&input.device_id)
        .bind(&input.phone)
        .bind(&input.full_name)
        .bind(&input.company)
        .bind(&input.country)
        .bind(&input.gender)
        .bind(input.birth_year)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn get_customer(&self, device_id: &str, id: Uuid) -> Result<Option<Customer>> {
        sqlx::query_as::<_, Customer>(
            "SELECT * FROM campaign_customers WHERE id = $1 AND device_id = $2",
        )
        .bind(id)
        .bind(device_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn get_customer_by_phone(
        &self,
        device_id: &str,
        phone: &str,
    ) -> Result<Option<Customer>> {
        sqlx::query_as::<_, Customer>(
            "SELECT * FROM campaign_customers WHERE phone = $1 AND device_id = $2",
        )
        .bind(phone)
        .bind(device_id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn list_customers(
        &self,
        device_id: &str,
        limit: i64,
        offset: i64,
        search: Option<&str>,
    ) -> Result<(Vec<Customer>, i64)> {
        let pattern = search
            .filter(|s| !s.trim().is_empty())
            .map(|s| format!("%{}%", s.trim()));

        let (total, rows) = match &pattern {
            Some(p) => {
                let total: (i64,) = sqlx::query_as(
                    r#"
                    SELECT COUNT(*) FROM campaign_customers
                    WHERE device_id = $1 AND (phone ILIKE $2 OR full_name ILIKE $2)
                    "#,
                )
                .bind(device_id)
                .bind(p.as_str())
                .fetch_one(self.pool())
                .await
                .map_err(map_db_err)?;

                let rows = sqlx::query_as::<_, Customer>(
                    r#"
                    SELECT * FROM campaign_customers
                    WHERE device_id = $1 AND (phone ILIKE $2 OR full_name ILIKE $2)
                    ORDER BY created_at DESC
                    LIMIT $3 OFFSET $4
                    "#,
                )
                .bind(device_id)
                .bind(p.as_str())
                .bind(limit)
                .bind(offset)
                .fetch_all(self.pool())
                .await
                .map_err(map_db_err)?;

                (total, rows)
            }
            None => {
                let total: (i64,) =
                    sqlx::query_as("SELECT COUNT(*) FROM campaign_customers WHERE device_id = $1")
                        .bind(device_id)
                        .fetch_one(self.pool())
                        .await
                        .map_err(map_db_err)?;

                let rows = sqlx::query_as::<_, Customer>(
                    r#"
                    SELECT * FROM campaign_customers
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

                (total, rows)
            }
        };

        Ok((rows, total.0))
    }

    async fn update_customer(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE campaign_customers SET
                phone = $3, full_name = $4, company = $5, country = $6, gender = $7,
                birth_year = $8, phone_valid = $9, network_exists = $10, updated_at = NOW()
            WHERE id = $1 AND device_id = $2
            "#,
        )
        .bind(customer.id)
        .bind(&customer.device_id)
        .bind(&customer.phone)
        .bind(&customer.full_name)
        .bind(&customer.company)
        .bind(&customer.country)
        .bind(&customer.gender)
        .bind(customer.birth_year)
        .bind(&customer.phone_valid)
        .bind(&customer.network_exists)
        .execute(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(())
    }

    async fn delete_customer(&self, device_id: &str, id: Uuid) -> Result<bool> {
        let result =
            sqlx::query("DELETE FROM campaign_customers WHERE id = $1 AND device_id = $2")
                .bind(id)
                .bind(device_id)
                .execute(self.pool())
                .await
                .map_err(map_db_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_customers(&self, device_id: &str, ids: &[Uuid]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "DELETE FROM campaign_customers WHERE device_id = $1 AND id = ANY($2)",
        )
        .bind(device_id)
        .bind(ids)
        .execute(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(result.rows_affected())
    }

    async fn bulk_create_customers(&self, customers: Vec<CreateCustomer>) -> Result<usize> {
        if customers.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool().begin().await.map_err(map_db_err)?;
        let now = Utc::now();
        let mut imported = 0usize;

        for input in customers {
            let result = sqlx::query(
                r#"
                INSERT INTO campaign_customers (
                    id, device_id, phone, full_name, company, country, gender, birth_year,
                    phone_valid, network_exists, created_at, updated_at
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'pending', 'pending', $9, $9)
                ON CONFLICT (device_id, phone) DO UPDATE SET
                    full_name = EXCLUDED.full_name,
                    company = EXCLUDED.company,
                    country = EXCLUDED.country,
                    gender = EXCLUDED.gender,
                    birth_year = EXCLUDED.birth_year,
                    updated_at = EXCLUDED.updated_at
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(&input.device_id)
            .bind(&input.phone)
            .bind(&input.full_name)
            .bind(&input.company)
            .bind(&input.country)
            .bind(&input.gender)
            .bind(input.birth_year)
            .bind(now)
            .execute(&mut *tx)
            .await;

            // Individual row failures are skipped; the batch continues
            if result.is_ok() {
                imported += 1;
            }
        }

        tx.commit().await.map_err(map_db_err)?;
        Ok(imported)
    }

    async fn customers_for_validation(
        &self,
        device_id: &str,
        limit: i64,
    ) -> Result<Vec<Customer>> {
        sqlx::query_as::<_, Customer>(
            r#"
            SELECT * FROM campaign_customers
            WHERE device_id = $1 AND (phone_valid = 'pending' OR network_exists = 'pending')
            ORDER BY created_at ASC
            LIMIT $2
            "#,
        )
        .bind(device_id)
        .bind(limit)
        .fetch_all(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn update_customer_validation(
        &self,
        id: Uuid,
        phone_valid: ValidationStatus,
        network_exists: ValidationStatus,
    ) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE campaign_customers SET
                phone_valid = $2, network_exists = $3, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(phone_valid.as_str())
        .bind(network_exists.as_str())
        .execute(self.pool())
        .await
        .map_err(map_db_err)?;

        Ok(())
    }
}
