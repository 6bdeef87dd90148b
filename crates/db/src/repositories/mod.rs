//! SQLite-backed implementations of the core storage traits, plus
//! in-memory stands-ins for tests and demos.

pub mod config;
pub mod customer;
pub mod memory;
pub mod orders;
pub mod product;

pub use config::SqlConfigRepository;
pub use customer::SqlCustomerRepository;
pub use memory::{
    InMemoryConfigRepository, InMemoryCustomerRepository, InMemoryOrderRepository,
    InMemoryProductRepository,
};
pub use orders::SqlOrderRepository;
pub use product::SqlProductRepository;

use chrono::{DateTime, Utc};
use vantage_core::repository::StoreError;

pub(crate) fn store_err(error: sqlx::Error) -> StoreError {
    match error {
        sqlx::Error::RowNotFound => StoreError::NotFound(error.to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(error.to_string())
        }
        other => StoreError::Unavailable(other.to_string()),
    }
}

/// Timestamps are stored as RFC 3339 text so lexicographic comparison
/// in SQL matches chronological order.
pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, StoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|err| StoreError::Decode(format!("bad timestamp {raw:?}: {err}")))
}
