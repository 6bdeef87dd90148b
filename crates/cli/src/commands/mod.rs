pub mod churn;
pub mod config;
pub mod migrate;
pub mod potential;
pub mod predict;
pub mod rfm;
pub mod seed;
pub mod segment;

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;

use vantage_core::config::{AppConfig, LoadOptions, LogFormat};
use vantage_core::errors::{ApplicationError, DomainError};
use vantage_core::profiles::ConfigProvider;
use vantage_core::service::AnalyticsService;
use vantage_db::{
    connect_with_settings, DbPool, SqlConfigRepository, SqlCustomerRepository, SqlOrderRepository,
    SqlProductRepository,
};

#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

#[derive(Debug, Serialize)]
struct CommandOutcome {
    command: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<serde_json::Value>,
}

impl CommandResult {
    pub fn data(command: &str, data: serde_json::Value) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "ok".to_string(),
            error_class: None,
            message: None,
            data: Some(data),
        };
        Self { exit_code: 0, output: serialize_payload(payload) }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let payload = CommandOutcome {
            command: command.to_string(),
            status: "error".to_string(),
            error_class: Some(error_class.to_string()),
            message: Some(message.into()),
            data: None,
        };
        Self { exit_code, output: serialize_payload(payload) }
    }
}

fn serialize_payload(payload: CommandOutcome) -> String {
    serde_json::to_string_pretty(&payload).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"unknown\",\"status\":\"error\",\"error_class\":\"serialization\",\"message\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    })
}

/// (error class, message, exit code). Exit codes: 2 config, 3 runtime,
/// 4 database, 5 migration/seed, 6 not found, 7 serialization.
pub(crate) type CommandFailure = (&'static str, String, u8);

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(config.logging.level.clone()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let result = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    // A second init in-process (tests) is not an error worth surfacing.
    let _ = result;
}

/// Shared command scaffolding: load configuration, stand up a runtime,
/// then hand the async body the effective config.
pub(crate) fn run_blocking<F, Fut>(command: &'static str, work: F) -> CommandResult
where
    F: FnOnce(AppConfig) -> Fut,
    Fut: Future<Output = Result<serde_json::Value, CommandFailure>>,
{
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                command,
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };
    init_tracing(&config);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                command,
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                3,
            );
        }
    };

    match runtime.block_on(work(config)) {
        Ok(data) => CommandResult::data(command, data),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(command, error_class, message, exit_code)
        }
    }
}

pub(crate) async fn open_pool(config: &AppConfig) -> Result<DbPool, CommandFailure> {
    connect_with_settings(
        &config.database.url,
        config.database.max_connections,
        config.database.timeout_secs,
    )
    .await
    .map_err(|error| ("db_connectivity", error.to_string(), 4u8))
}

pub(crate) fn analytics_service(pool: &DbPool) -> AnalyticsService {
    AnalyticsService::new(
        Arc::new(SqlOrderRepository::new(pool.clone())),
        Arc::new(SqlCustomerRepository::new(pool.clone())),
        Arc::new(SqlProductRepository::new(pool.clone())),
        ConfigProvider::with_store(Arc::new(SqlConfigRepository::new(pool.clone()))),
    )
}

pub(crate) fn app_failure(error: ApplicationError) -> CommandFailure {
    let message = error.to_string();
    match error {
        ApplicationError::Domain(DomainError::UnknownCustomer(_)) => ("not_found", message, 6),
        ApplicationError::Domain(_) => ("bad_request", message, 2),
        ApplicationError::Persistence(_) => ("db_unavailable", message, 4),
        ApplicationError::Configuration(_) => ("config_validation", message, 2),
    }
}

pub(crate) fn to_data<T: Serialize>(report: &T) -> Result<serde_json::Value, CommandFailure> {
    serde_json::to_value(report).map_err(|error| ("serialization", error.to_string(), 7u8))
}

pub(crate) fn business_type(config: &AppConfig, requested: Option<String>) -> String {
    requested.unwrap_or_else(|| config.analytics.business_type.clone())
}
