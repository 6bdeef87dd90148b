use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::product::ProductId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId(pub i64);

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// One line of a placed order. Spend math is `quantity x
/// price_per_unit`; `discount_amount` is carried as stored data and
/// never enters the analytics totals.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: ProductId,
    pub item_name: String,
    pub quantity: i64,
    pub price_per_unit: f64,
    pub discount_amount: f64,
    pub category_id: Option<i64>,
    pub category_name: Option<String>,
    pub brand_id: Option<i64>,
    pub brand_name: Option<String>,
}

impl OrderLine {
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.price_per_unit
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer_id: CustomerId,
    pub placed_at: DateTime<Utc>,
    pub lines: Vec<OrderLine>,
}

impl Order {
    pub fn total(&self) -> f64 {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn line(quantity: i64, price: f64, discount: f64) -> OrderLine {
        OrderLine {
            item_id: ProductId(1),
            item_name: "widget".to_owned(),
            quantity,
            price_per_unit: price,
            discount_amount: discount,
            category_id: None,
            category_name: None,
            brand_id: None,
            brand_name: None,
        }
    }

    #[test]
    fn order_total_is_price_times_quantity_ignoring_discounts() {
        let order = Order {
            id: OrderId(1),
            customer_id: CustomerId(7),
            placed_at: Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap(),
            lines: vec![line(2, 100.0, 20.0), line(1, 50.0, 0.0)],
        };

        assert_eq!(order.total(), 250.0);
        assert_eq!(order.item_count(), 3);
    }
}
