use vantage_core::domain::customer::CustomerId;

use super::{analytics_service, app_failure, business_type, open_pool, run_blocking, to_data, CommandResult};

pub fn run(customer_id: i64, requested_business_type: Option<String>) -> CommandResult {
    run_blocking("segment", move |config| async move {
        let pool = open_pool(&config).await?;
        let service = analytics_service(&pool);
        let business = business_type(&config, requested_business_type);

        let report =
            service.segment(CustomerId(customer_id), &business).await.map_err(app_failure)?;
        let data = to_data(&report)?;
        pool.close().await;
        Ok(data)
    })
}
