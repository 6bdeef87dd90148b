use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use vantage_core::domain::customer::{Customer, CustomerId};
use vantage_core::domain::order::Order;
use vantage_core::domain::product::Product;
use vantage_core::repository::{
    ConfigRepository, CustomerRepository, OrderFilter, OrderRepository, ProductRepository,
    StoreError,
};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<Vec<Order>>,
}

impl InMemoryOrderRepository {
    pub async fn insert(&self, order: Order) {
        self.orders.write().await.push(order);
    }
}

fn matches(filter: &OrderFilter, order: &Order) -> bool {
    if filter.customer_id.map_or(false, |id| order.customer_id != id) {
        return false;
    }
    if filter.placed_after.map_or(false, |cutoff| order.placed_at <= cutoff) {
        return false;
    }
    if filter.placed_before.map_or(false, |cutoff| order.placed_at >= cutoff) {
        return false;
    }
    if filter.product_ids.is_empty() && filter.category_ids.is_empty() {
        return true;
    }
    order.lines.iter().any(|line| {
        filter.product_ids.contains(&line.item_id)
            || line.category_id.map_or(false, |id| filter.category_ids.contains(&id))
    })
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn find_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let orders = self.orders.read().await;
        let mut matched: Vec<Order> =
            orders.iter().filter(|order| matches(filter, order)).cloned().collect();
        matched.sort_by_key(|order| (order.placed_at, order.id));
        Ok(matched)
    }
}

#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<HashMap<CustomerId, Customer>>,
}

impl InMemoryCustomerRepository {
    pub async fn insert(&self, customer: Customer) {
        self.customers.write().await.insert(customer.id, customer);
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Customer>, StoreError> {
        let mut all: Vec<Customer> = self.customers.read().await.values().cloned().collect();
        all.sort_by_key(|customer| customer.id);
        Ok(all)
    }
}

#[derive(Default)]
pub struct InMemoryProductRepository {
    products: RwLock<Vec<Product>>,
}

impl InMemoryProductRepository {
    pub async fn insert(&self, product: Product) {
        self.products.write().await.push(product);
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        let products = self.products.read().await;
        Ok(products.iter().filter(|product| product.active).cloned().collect())
    }
}

#[derive(Default)]
pub struct InMemoryConfigRepository {
    overrides: RwLock<HashMap<(String, String), String>>,
}

impl InMemoryConfigRepository {
    pub async fn insert(&self, kind: &str, business_type: &str, config_json: &str) {
        self.overrides
            .write()
            .await
            .insert((kind.to_owned(), business_type.to_owned()), config_json.to_owned());
    }
}

#[async_trait]
impl ConfigRepository for InMemoryConfigRepository {
    async fn find_override(
        &self,
        kind: &str,
        business_type: &str,
    ) -> Result<Option<String>, StoreError> {
        Ok(self
            .overrides
            .read()
            .await
            .get(&(kind.to_owned(), business_type.to_owned()))
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use vantage_core::domain::order::{OrderId, OrderLine};
    use vantage_core::domain::product::ProductId;

    use super::*;

    fn order(id: i64, customer: i64, days_ago: i64, category_id: Option<i64>) -> Order {
        Order {
            id: OrderId(id),
            customer_id: CustomerId(customer),
            placed_at: Utc::now() - Duration::days(days_ago),
            lines: vec![OrderLine {
                item_id: ProductId(id),
                item_name: format!("item-{id}"),
                quantity: 1,
                price_per_unit: 100.0,
                discount_amount: 0.0,
                category_id,
                category_name: None,
                brand_id: None,
                brand_name: None,
            }],
        }
    }

    #[tokio::test]
    async fn order_filters_combine() {
        let repo = InMemoryOrderRepository::default();
        repo.insert(order(1, 1, 10, Some(3))).await;
        repo.insert(order(2, 1, 200, Some(4))).await;
        repo.insert(order(3, 2, 20, Some(3))).await;

        let all = repo.find_orders(&OrderFilter::default()).await.expect("all");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, OrderId(2));

        let mine = repo
            .find_orders(&OrderFilter::for_customer(CustomerId(1)))
            .await
            .expect("customer filter");
        assert_eq!(mine.len(), 2);

        let filter = OrderFilter {
            customer_id: Some(CustomerId(1)),
            category_ids: vec![3],
            ..OrderFilter::default()
        };
        let matched = repo.find_orders(&filter).await.expect("category filter");
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].id, OrderId(1));
    }

    #[tokio::test]
    async fn customer_and_config_round_trips() {
        let customers = InMemoryCustomerRepository::default();
        customers
            .insert(Customer {
                id: CustomerId(7),
                name: "ada".to_owned(),
                email: None,
                phone: None,
                created_at: Utc::now(),
            })
            .await;

        let found = customers.find_by_id(CustomerId(7)).await.expect("find");
        assert_eq!(found.map(|customer| customer.name), Some("ada".to_owned()));
        assert!(customers.find_by_id(CustomerId(8)).await.expect("find").is_none());

        let configs = InMemoryConfigRepository::default();
        configs.insert("churn", "default", "{}").await;
        assert_eq!(
            configs.find_override("churn", "default").await.expect("find").as_deref(),
            Some("{}")
        );
        assert!(configs.find_override("rfm", "default").await.expect("find").is_none());
    }
}
