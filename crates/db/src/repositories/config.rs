use async_trait::async_trait;
use sqlx::Row;

use vantage_core::repository::{ConfigRepository, StoreError};

use super::store_err;
use crate::DbPool;

/// Stored JSON profile overrides, one active row per
/// (config type, business type) pair.
pub struct SqlConfigRepository {
    pool: DbPool,
}

impl SqlConfigRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn save_override(
        &self,
        kind: &str,
        business_type: &str,
        config_json: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO system_config (config_type, business_type, config_json, is_active, updated_at)
             VALUES (?, ?, ?, 1, ?)
             ON CONFLICT(config_type, business_type) DO UPDATE SET
                 config_json = excluded.config_json,
                 is_active = 1,
                 updated_at = excluded.updated_at",
        )
        .bind(kind)
        .bind(business_type)
        .bind(config_json)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(store_err)?;

        Ok(())
    }
}

#[async_trait]
impl ConfigRepository for SqlConfigRepository {
    async fn find_override(
        &self,
        kind: &str,
        business_type: &str,
    ) -> Result<Option<String>, StoreError> {
        let row = sqlx::query(
            "SELECT config_json FROM system_config
             WHERE config_type = ? AND business_type = ? AND is_active = 1",
        )
        .bind(kind)
        .bind(business_type)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;

        row.map(|row| row.try_get("config_json").map_err(store_err)).transpose()
    }
}

#[cfg(test)]
mod tests {
    use vantage_core::repository::ConfigRepository;

    use super::*;
    use crate::connect_with_settings;
    use crate::migrations::run_pending;

    #[tokio::test]
    async fn save_then_find_round_trips_and_upserts() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");

        let repo = SqlConfigRepository::new(pool);
        assert_eq!(repo.find_override("rfm", "default").await.expect("find"), None);

        repo.save_override("rfm", "default", r#"{"a":1}"#).await.expect("save");
        repo.save_override("rfm", "default", r#"{"a":2}"#).await.expect("save again");

        let stored = repo.find_override("rfm", "default").await.expect("find");
        assert_eq!(stored.as_deref(), Some(r#"{"a":2}"#));
        assert_eq!(repo.find_override("rfm", "retail").await.expect("find"), None);
    }
}
