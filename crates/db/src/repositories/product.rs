use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use vantage_core::domain::product::{Product, ProductId};
use vantage_core::repository::{ProductRepository, StoreError};

use super::store_err;
use crate::DbPool;

pub struct SqlProductRepository {
    pool: DbPool,
}

impl SqlProductRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_product(row: &SqliteRow) -> Result<Product, StoreError> {
    Ok(Product {
        id: ProductId(row.try_get("id").map_err(store_err)?),
        name: row.try_get("name").map_err(store_err)?,
        price: row.try_get("price").map_err(store_err)?,
        stock: row.try_get("stock_quantity").map_err(store_err)?,
        active: row.try_get::<i64, _>("is_active").map_err(store_err)? != 0,
        category_id: row.try_get("category_id").map_err(store_err)?,
        category_name: row.try_get("category_name").map_err(store_err)?,
        brand_id: row.try_get("brand_id").map_err(store_err)?,
        brand_name: row.try_get("brand_name").map_err(store_err)?,
    })
}

#[async_trait]
impl ProductRepository for SqlProductRepository {
    async fn list_active(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query(
            "SELECT i.id, i.name, i.price, i.stock_quantity, i.is_active,
                    i.category_id, c.name AS category_name, i.brand_id, b.name AS brand_name
             FROM item i
             LEFT JOIN category c ON c.id = i.category_id
             LEFT JOIN brand b ON b.id = i.brand_id
             WHERE i.is_active = 1
             ORDER BY i.id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(store_err)?;

        rows.iter().map(row_to_product).collect()
    }
}

#[cfg(test)]
mod tests {
    use vantage_core::repository::ProductRepository;

    use super::*;
    use crate::fixtures::seed_demo_data;
    use crate::migrations::run_pending;
    use crate::connect_with_settings;

    #[tokio::test]
    async fn lists_only_active_catalog_items() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");
        seed_demo_data(&pool).await.expect("seed");

        let repo = SqlProductRepository::new(pool);
        let products = repo.list_active().await.expect("list");
        assert!(!products.is_empty());
        assert!(products.iter().all(|product| product.active));
        assert!(products.iter().any(|product| product.category_name.is_some()));
    }
}
