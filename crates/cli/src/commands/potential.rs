use vantage_core::domain::product::ProductId;
use vantage_core::repository::OrderFilter;

use super::{analytics_service, app_failure, business_type, open_pool, run_blocking, to_data, CommandResult};

pub fn run(
    product_ids: Vec<i64>,
    category_ids: Vec<i64>,
    limit: usize,
    requested_business_type: Option<String>,
) -> CommandResult {
    run_blocking("potential", move |config| async move {
        let pool = open_pool(&config).await?;
        let service = analytics_service(&pool);
        let business = business_type(&config, requested_business_type);
        let filter = OrderFilter {
            product_ids: product_ids.into_iter().map(ProductId).collect(),
            category_ids,
            ..OrderFilter::default()
        };

        let report =
            service.potential_customers(filter, limit, &business).await.map_err(app_failure)?;
        let data = to_data(&report)?;
        pool.close().await;
        Ok(data)
    })
}
