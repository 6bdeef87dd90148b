use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use vantage_core::domain::customer::{Customer, CustomerId};
use vantage_core::repository::{CustomerRepository, StoreError};

use super::{parse_timestamp, store_err};
use crate::DbPool;

pub struct SqlCustomerRepository {
    pool: DbPool,
}

impl SqlCustomerRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn row_to_customer(row: &SqliteRow) -> Result<Customer, StoreError> {
    Ok(Customer {
        id: CustomerId(row.try_get("id").map_err(store_err)?),
        name: row.try_get("name").map_err(store_err)?,
        email: row.try_get("email").map_err(store_err)?,
        phone: row.try_get("phone").map_err(store_err)?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at").map_err(store_err)?)?,
    })
}

#[async_trait]
impl CustomerRepository for SqlCustomerRepository {
    async fn find_by_id(&self, id: CustomerId) -> Result<Option<Customer>, StoreError> {
        let row = sqlx::query("SELECT id, name, email, phone, created_at FROM customer WHERE id = ?")
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?;

        match row {
            Some(ref row) => Ok(Some(row_to_customer(row)?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<Customer>, StoreError> {
        let rows =
            sqlx::query("SELECT id, name, email, phone, created_at FROM customer ORDER BY id ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(store_err)?;

        rows.iter().map(row_to_customer).collect()
    }
}
