use serde_json::json;

use super::{run_blocking, CommandResult};

pub fn run() -> CommandResult {
    run_blocking("config", |config| async move {
        Ok(json!({
            "database": {
                "url": config.database.url,
                "maxConnections": config.database.max_connections,
                "timeoutSecs": config.database.timeout_secs,
            },
            "analytics": {
                "businessType": config.analytics.business_type,
                "batchConcurrency": config.analytics.batch_concurrency,
            },
            "logging": {
                "level": config.logging.level,
                "format": config.logging.format,
            },
        }))
    })
}
