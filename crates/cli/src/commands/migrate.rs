use serde_json::json;
use tracing::info;

use vantage_db::migrations;

use super::{open_pool, run_blocking, CommandResult};

pub fn run() -> CommandResult {
    run_blocking("migrate", |config| async move {
        let pool = open_pool(&config).await?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        pool.close().await;

        info!(url = %config.database.url, "applied pending migrations");
        Ok(json!({ "database": config.database.url, "migrations": "applied" }))
    })
}
