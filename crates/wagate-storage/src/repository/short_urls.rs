//! Short URL store implementation

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;
use wagate_common::Result;

use super::{map_db_err, DbStore};
use crate::models::ShortUrl;
use crate::store::ShortUrlStore;

#[async_trait]
impl ShortUrlStore for DbStore {
    async fn create_short_url(
        &self,
        device_id: &str,
        code: &str,
        original_url: &str,
    ) -> Result<ShortUrl> {
        let id = Uuid::new_v4();
        let now = Utc::now();

        sqlx::query_as::<_, ShortUrl>(
            r#"
            INSERT INTO campaign_short_urls (id, device_id, code, original_url, clicks, created_at)
            VALUES ($1, $2, $3, $4, 0, $5)
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(device_id)
        .bind(code)
        .bind(original_url)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_db_err)
    }

    async fn short_url_by_code(&self, code: &str) -> Result<Option<ShortUrl>> {
        sqlx::query_as::<_, ShortUrl>("SELECT * FROM campaign_short_urls WHERE code = $1")
            .bind(code)
            .fetch_optional(self.pool())
            .await
            .map_err(map_db_err)
    }

    async fn increment_short_url_clicks(&self, code: &str) -> Result<()> {
        sqlx::query("UPDATE campaign_short_urls SET clicks = clicks + 1 WHERE code = $1")
            .bind(code)
            .execute(self.pool())
            .await
            .map_err(map_db_err)?;

        Ok(())
    }
}
