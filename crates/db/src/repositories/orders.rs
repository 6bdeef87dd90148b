use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use vantage_core::domain::customer::CustomerId;
use vantage_core::domain::order::{Order, OrderId, OrderLine};
use vantage_core::domain::product::ProductId;
use vantage_core::repository::{OrderFilter, OrderRepository, StoreError};

use super::{parse_timestamp, store_err};
use crate::DbPool;

pub struct SqlOrderRepository {
    pool: DbPool,
}

impl SqlOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_LINES: &str = "SELECT o.id AS order_id, o.customer_id, o.placed_at,
        oi.item_id, i.name AS item_name, oi.quantity, oi.price_per_unit, oi.discount_amount,
        i.category_id, c.name AS category_name, i.brand_id, b.name AS brand_name
 FROM orders o
 JOIN order_item oi ON oi.order_id = o.id
 JOIN item i ON i.id = oi.item_id
 LEFT JOIN category c ON c.id = i.category_id
 LEFT JOIN brand b ON b.id = i.brand_id";

fn placeholders(count: usize) -> String {
    let mut list = String::new();
    for index in 0..count {
        if index > 0 {
            list.push_str(", ");
        }
        list.push('?');
    }
    list
}

/// An order matches a product/category filter when any of its lines
/// does; the full order is then returned intact.
fn build_query(filter: &OrderFilter) -> String {
    let mut clauses: Vec<String> = Vec::new();
    if filter.customer_id.is_some() {
        clauses.push("o.customer_id = ?".to_owned());
    }
    if filter.placed_after.is_some() {
        clauses.push("o.placed_at > ?".to_owned());
    }
    if filter.placed_before.is_some() {
        clauses.push("o.placed_at < ?".to_owned());
    }
    if !filter.product_ids.is_empty() || !filter.category_ids.is_empty() {
        let mut matches: Vec<String> = Vec::new();
        if !filter.product_ids.is_empty() {
            matches.push(format!("f.item_id IN ({})", placeholders(filter.product_ids.len())));
        }
        if !filter.category_ids.is_empty() {
            matches
                .push(format!("fi.category_id IN ({})", placeholders(filter.category_ids.len())));
        }
        clauses.push(format!(
            "EXISTS (SELECT 1 FROM order_item f JOIN item fi ON fi.id = f.item_id
              WHERE f.order_id = o.id AND ({}))",
            matches.join(" OR ")
        ));
    }

    let mut sql = SELECT_LINES.to_owned();
    if !clauses.is_empty() {
        sql.push_str("\n WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str("\n ORDER BY o.placed_at ASC, o.id ASC");
    sql
}

fn row_to_line(row: &SqliteRow) -> Result<OrderLine, StoreError> {
    Ok(OrderLine {
        item_id: ProductId(row.try_get("item_id").map_err(store_err)?),
        item_name: row.try_get("item_name").map_err(store_err)?,
        quantity: row.try_get("quantity").map_err(store_err)?,
        price_per_unit: row.try_get("price_per_unit").map_err(store_err)?,
        discount_amount: row.try_get("discount_amount").map_err(store_err)?,
        category_id: row.try_get("category_id").map_err(store_err)?,
        category_name: row.try_get("category_name").map_err(store_err)?,
        brand_id: row.try_get("brand_id").map_err(store_err)?,
        brand_name: row.try_get("brand_name").map_err(store_err)?,
    })
}

#[async_trait]
impl OrderRepository for SqlOrderRepository {
    async fn find_orders(&self, filter: &OrderFilter) -> Result<Vec<Order>, StoreError> {
        let sql = build_query(filter);
        let mut query = sqlx::query(&sql);
        if let Some(customer_id) = filter.customer_id {
            query = query.bind(customer_id.0);
        }
        if let Some(after) = filter.placed_after {
            query = query.bind(after.to_rfc3339());
        }
        if let Some(before) = filter.placed_before {
            query = query.bind(before.to_rfc3339());
        }
        for product_id in &filter.product_ids {
            query = query.bind(product_id.0);
        }
        for category_id in &filter.category_ids {
            query = query.bind(category_id);
        }

        let rows = query.fetch_all(&self.pool).await.map_err(store_err)?;

        let mut orders: Vec<Order> = Vec::new();
        for row in &rows {
            let order_id = OrderId(row.try_get("order_id").map_err(store_err)?);
            let line = row_to_line(row)?;
            match orders.last_mut() {
                Some(current) if current.id == order_id => current.lines.push(line),
                _ => orders.push(Order {
                    id: order_id,
                    customer_id: CustomerId(row.try_get("customer_id").map_err(store_err)?),
                    placed_at: parse_timestamp(
                        &row.try_get::<String, _>("placed_at").map_err(store_err)?,
                    )?,
                    lines: vec![line],
                }),
            }
        }
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use vantage_core::repository::{CustomerRepository, OrderRepository};

    use super::*;
    use crate::fixtures::seed_demo_data;
    use crate::migrations::run_pending;
    use crate::{connect_with_settings, SqlCustomerRepository};

    async fn seeded_pool() -> DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        seed_demo_data(&pool).await.expect("seed");
        pool
    }

    #[tokio::test]
    async fn loads_orders_with_lines_in_date_order() {
        let pool = seeded_pool().await;
        let repo = SqlOrderRepository::new(pool);

        let orders = repo.find_orders(&OrderFilter::default()).await.expect("query");
        assert!(!orders.is_empty());
        assert!(orders.windows(2).all(|pair| pair[0].placed_at <= pair[1].placed_at));
        assert!(orders.iter().all(|order| !order.lines.is_empty()));
        assert!(orders.iter().all(|order| order.total() > 0.0));
    }

    #[tokio::test]
    async fn customer_filter_restricts_rows() {
        let pool = seeded_pool().await;
        let customers = SqlCustomerRepository::new(pool.clone());
        let repo = SqlOrderRepository::new(pool);

        let first = customers.list_all().await.expect("customers")[0].clone();
        let orders =
            repo.find_orders(&OrderFilter::for_customer(first.id)).await.expect("query");
        assert!(!orders.is_empty());
        assert!(orders.iter().all(|order| order.customer_id == first.id));
    }

    #[tokio::test]
    async fn category_filter_keeps_whole_matching_orders() {
        let pool = seeded_pool().await;
        let repo = SqlOrderRepository::new(pool);

        let filter = OrderFilter { category_ids: vec![1], ..OrderFilter::default() };
        let orders = repo.find_orders(&filter).await.expect("query");
        assert!(!orders.is_empty());
        assert!(orders
            .iter()
            .all(|order| order.lines.iter().any(|line| line.category_id == Some(1))));
    }

    #[tokio::test]
    async fn placed_before_excludes_recent_orders() {
        let pool = seeded_pool().await;
        let repo = SqlOrderRepository::new(pool);

        let cutoff = Utc::now() - Duration::days(90);
        let filter = OrderFilter { placed_before: Some(cutoff), ..OrderFilter::default() };
        let orders = repo.find_orders(&filter).await.expect("query");
        assert!(orders.iter().all(|order| order.placed_at < cutoff));
    }
}
