use super::{analytics_service, app_failure, business_type, open_pool, run_blocking, to_data, CommandResult};

pub fn run(inactive_days: Option<i64>, requested_business_type: Option<String>) -> CommandResult {
    run_blocking("churn", move |config| async move {
        let pool = open_pool(&config).await?;
        let service = analytics_service(&pool);
        let business = business_type(&config, requested_business_type);

        let report =
            service.churn_prediction(inactive_days, &business).await.map_err(app_failure)?;
        let data = to_data(&report)?;
        pool.close().await;
        Ok(data)
    })
}
