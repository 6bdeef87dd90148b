use serde_json::json;
use tracing::info;

use vantage_db::{fixtures, migrations};

use super::{open_pool, run_blocking, CommandResult};

pub fn run() -> CommandResult {
    run_blocking("seed", |config| async move {
        let pool = open_pool(&config).await?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let seeded = fixtures::seed_demo_data(&pool)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;
        pool.close().await;

        info!(
            customers = seeded.customers,
            products = seeded.products,
            orders = seeded.orders,
            "demo dataset loaded"
        );
        Ok(json!({
            "customers": seeded.customers,
            "products": seeded.products,
            "orders": seeded.orders,
        }))
    })
}
