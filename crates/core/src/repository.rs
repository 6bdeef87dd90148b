use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::customer::{Customer, CustomerId};
use crate::domain::order::Order;
use crate::domain::product::{Product, ProductId};

/// Storage contract errors. Backends map their driver errors onto
/// these; callers never see driver types.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("row decode failed: {0}")]
    Decode(String),
}

#[derive(Clone, Debug, Default)]
pub struct OrderFilter {
    pub customer_id: Option<CustomerId>,
    pub placed_after: Option<DateTime<Utc>>,
    pub placed_before: Option<DateTime<Utc>>,
    pub product_ids: Vec<ProductId>,
    pub category_ids: Vec<i64>,
}

impl OrderFilter {
    pub fn for_customer(customer_id: CustomerId) -> Self {
        Self { customer_id: Some(customer_id), ..Self::default() }
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Orders matching the filter, each with its lines, ordered by
    /// placement date ascending.
    async fn find_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError>;
}

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError>;
    async fn list_all(&self) -> Result<Vec<Customer>, StoreError>;
}

#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn list_active(&self) -> Result<Vec<Product>, StoreError>;
}

#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Raw JSON override for a (profile kind, business type) pair, if
    /// one is stored and active.
    async fn find_override(
        &self,
        kind: &str,
        business_type: &str,
    ) -> Result<Option<String>, StoreError>;
}
