//! Demo dataset: a small electronics shop with customers across the
//! whole lifecycle spectrum, from whales to long-gone accounts.

use chrono::{Duration, Utc};
use serde_json::json;

use crate::DbPool;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SeedResult {
    pub customers: usize,
    pub products: usize,
    pub orders: usize,
}

struct SeedLine {
    item_id: i64,
    quantity: i64,
    price_per_unit: f64,
    discount_amount: f64,
}

struct SeedOrder {
    id: i64,
    customer_id: i64,
    days_ago: i64,
    lines: Vec<SeedLine>,
}

fn line(item_id: i64, quantity: i64, price_per_unit: f64) -> SeedLine {
    SeedLine { item_id, quantity, price_per_unit, discount_amount: 0.0 }
}

fn seed_orders() -> Vec<SeedOrder> {
    let mut orders = Vec::new();
    let mut next_id = 1;
    let mut push = |customer_id: i64, days_ago: i64, lines: Vec<SeedLine>| {
        orders.push(SeedOrder { id: next_id, customer_id, days_ago, lines });
        next_id += 1;
    };

    // Customer 1: high-value regular with a broad basket.
    for step in 0..12 {
        let mut lines = vec![line(3, 1, 2400.0)];
        if step % 3 == 0 {
            lines.push(line(1, 1, 1100.0));
        }
        if step % 4 == 0 {
            lines.push(line(6, 1, 320.0));
        }
        push(1, 15 + step * 30, lines);
    }

    // Customer 2: steady mid-tier buyer.
    for step in 0..6 {
        let lines = if step % 2 == 0 {
            vec![line(6, 1, 320.0), line(7, 2, 60.0)]
        } else {
            vec![line(10, 1, 900.0)]
        };
        push(2, 25 + step * 55, lines);
    }

    // Customer 3: occasional small-ticket shopper.
    for step in 0..4 {
        push(3, 40 + step * 80, vec![line(5, 1, 180.0), line(8, 1, 45.0)]);
    }

    // Customer 4: first order placed recently.
    push(4, 10, vec![line(1, 1, 1100.0)]);

    // Customer 5: solid history that stopped over a year ago.
    for step in 0..5 {
        push(5, 400 + step * 60, vec![line(4, 1, 1800.0), line(7, 1, 60.0)]);
    }

    // Customer 6: one tiny stale order.
    push(6, 500, vec![line(8, 1, 45.0)]);

    orders
}

/// Populate an empty, migrated database with the demo shop. Idempotence
/// is not attempted; seed into a fresh database.
pub async fn seed_demo_data(pool: &DbPool) -> Result<SeedResult, sqlx::Error> {
    let now = Utc::now();

    let categories: &[(i64, &str)] =
        &[(1, "Phones"), (2, "Laptops"), (3, "Audio"), (4, "Accessories")];
    for (id, name) in categories {
        sqlx::query("INSERT INTO category (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
    }

    let brands: &[(i64, &str)] = &[(1, "Apex"), (2, "Borealis"), (3, "Cobalt")];
    for (id, name) in brands {
        sqlx::query("INSERT INTO brand (id, name) VALUES (?, ?)")
            .bind(id)
            .bind(name)
            .execute(pool)
            .await?;
    }

    let customers: &[(i64, &str, &str, Option<&str>, i64)] = &[
        (1, "Mira Holt", "mira.holt@example.com", Some("+1-555-0101"), 400),
        (2, "Dario Fen", "dario.fen@example.com", Some("+1-555-0102"), 380),
        (3, "Lena Voss", "lena.voss@example.com", None, 360),
        (4, "Tom Iversen", "tom.iversen@example.com", None, 30),
        (5, "Greta Lund", "greta.lund@example.com", Some("+1-555-0105"), 720),
        (6, "Sam Opal", "sam.opal@example.com", None, 560),
    ];
    for (id, name, email, phone, created_days_ago) in customers {
        sqlx::query("INSERT INTO customer (id, name, email, phone, created_at) VALUES (?, ?, ?, ?, ?)")
            .bind(id)
            .bind(name)
            .bind(email)
            .bind(phone)
            .bind((now - Duration::days(*created_days_ago)).to_rfc3339())
            .execute(pool)
            .await?;
    }

    let items: &[(i64, &str, f64, i64, i64, i64, i64)] = &[
        (1, "Aurora Phone 12", 1100.0, 50, 1, 1, 1),
        (2, "Aurora Phone 12 Pro", 1400.0, 35, 1, 1, 1),
        (3, "Polar Laptop 15", 2400.0, 20, 1, 2, 2),
        (4, "Polar Laptop 13", 1800.0, 25, 1, 2, 2),
        (5, "Drift Earbuds", 180.0, 200, 1, 3, 3),
        (6, "Drift Headphones", 320.0, 120, 1, 3, 3),
        (7, "Charge Pad", 60.0, 300, 1, 4, 1),
        (8, "Sleeve 13", 45.0, 150, 1, 4, 2),
        (9, "Legacy Phone 8", 400.0, 0, 0, 1, 1),
        (10, "Studio Monitor", 900.0, 15, 1, 3, 3),
    ];
    for (id, name, price, stock, active, category_id, brand_id) in items {
        sqlx::query(
            "INSERT INTO item (id, name, price, stock_quantity, is_active, category_id, brand_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(name)
        .bind(price)
        .bind(stock)
        .bind(active)
        .bind(category_id)
        .bind(brand_id)
        .execute(pool)
        .await?;
    }

    let orders = seed_orders();
    for order in &orders {
        sqlx::query("INSERT INTO orders (id, customer_id, placed_at) VALUES (?, ?, ?)")
            .bind(order.id)
            .bind(order.customer_id)
            .bind((now - Duration::days(order.days_ago)).to_rfc3339())
            .execute(pool)
            .await?;
        for line in &order.lines {
            sqlx::query(
                "INSERT INTO order_item (order_id, item_id, quantity, price_per_unit, discount_amount)
                 VALUES (?, ?, ?, ?, ?)",
            )
            .bind(order.id)
            .bind(line.item_id)
            .bind(line.quantity)
            .bind(line.price_per_unit)
            .bind(line.discount_amount)
            .execute(pool)
            .await?;
        }
    }

    // A sample stored override: the retail business type lowers the
    // whale bar relative to the builtin defaults.
    let retail_segmentation = json!({
        "whale": {"minTotalSpent": 40000.0, "minOrders": 8, "minAvgOrderValue": 800.0},
        "vip": {"minTotalSpent": 8000.0, "maxTotalSpent": 40000.0, "minOrders": 4, "minAvgOrderValue": 300.0},
        "regular": {"minTotalSpent": 500.0, "maxTotalSpent": 8000.0, "minOrders": 2},
        "churn": {"maxDaysSinceLastOrder": 120}
    });
    sqlx::query(
        "INSERT INTO system_config (config_type, business_type, config_json, is_active, updated_at)
         VALUES (?, ?, ?, 1, ?)",
    )
    .bind("segmentation")
    .bind("retail")
    .bind(retail_segmentation.to_string())
    .bind(now.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(SeedResult { customers: customers.len(), products: items.len(), orders: orders.len() })
}

#[cfg(test)]
mod tests {
    use super::seed_demo_data;
    use crate::connect_with_settings;
    use crate::migrations::run_pending;

    #[tokio::test]
    async fn seed_populates_every_table() {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        run_pending(&pool).await.expect("migrate");

        let result = seed_demo_data(&pool).await.expect("seed");
        assert_eq!(result.customers, 6);
        assert_eq!(result.products, 10);
        assert!(result.orders > 20);
    }
}
