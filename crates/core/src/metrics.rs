//! Single-pass order aggregation into per-customer metrics.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::order::Order;

/// Stable breakdown key. Lines without a category or brand fold into
/// `Unknown` instead of colliding on a display name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum GroupKey {
    Id(i64),
    Unknown,
}

impl std::fmt::Display for GroupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Id(id) => write!(f, "{id}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for GroupKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for GroupKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if raw == "unknown" {
            return Ok(Self::Unknown);
        }
        raw.parse::<i64>().map(Self::Id).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub name: String,
    /// Distinct orders touching this group.
    pub orders: i64,
    pub spent: f64,
    pub items: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStats {
    pub orders: i64,
    pub spent: f64,
    pub items: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerMetrics {
    pub customer_id: CustomerId,
    pub total_spent: f64,
    pub total_orders: i64,
    pub total_items: i64,
    pub first_order_at: Option<DateTime<Utc>>,
    pub last_order_at: Option<DateTime<Utc>>,
    /// Second most recent order date, when there is one.
    pub previous_order_at: Option<DateTime<Utc>>,
    pub categories: BTreeMap<GroupKey, GroupStats>,
    pub brands: BTreeMap<GroupKey, GroupStats>,
}

impl CustomerMetrics {
    pub fn empty(customer_id: CustomerId) -> Self {
        Self {
            customer_id,
            total_spent: 0.0,
            total_orders: 0,
            total_items: 0,
            first_order_at: None,
            last_order_at: None,
            previous_order_at: None,
            categories: BTreeMap::new(),
            brands: BTreeMap::new(),
        }
    }

    pub fn avg_order_value(&self) -> f64 {
        if self.total_orders == 0 {
            0.0
        } else {
            self.total_spent / self.total_orders as f64
        }
    }

    pub fn days_since_last_order(&self, now: DateTime<Utc>) -> Option<i64> {
        self.last_order_at.map(|last| (now - last).num_days())
    }

    /// Categories ranked by spend, highest first.
    pub fn top_categories(&self, limit: usize) -> Vec<(GroupKey, &GroupStats)> {
        let mut ranked: Vec<(GroupKey, &GroupStats)> =
            self.categories.iter().map(|(key, stats)| (*key, stats)).collect();
        ranked.sort_by(|a, b| b.1.spent.partial_cmp(&a.1.spent).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(limit);
        ranked
    }

    fn fold_order(&mut self, order: &Order) {
        self.total_orders += 1;
        self.total_spent += order.total();
        self.total_items += order.item_count();

        match self.first_order_at {
            Some(first) if first <= order.placed_at => {}
            _ => self.first_order_at = Some(order.placed_at),
        }
        match self.last_order_at {
            Some(last) if last >= order.placed_at => {
                if self.previous_order_at.map_or(true, |prev| prev < order.placed_at) {
                    self.previous_order_at = Some(order.placed_at);
                }
            }
            previous => {
                self.previous_order_at = previous;
                self.last_order_at = Some(order.placed_at);
            }
        }

        let mut categories_touched = BTreeSet::new();
        let mut brands_touched = BTreeSet::new();
        for line in &order.lines {
            let category_key = line.category_id.map_or(GroupKey::Unknown, GroupKey::Id);
            let category = self.categories.entry(category_key).or_default();
            if category.name.is_empty() {
                category.name =
                    line.category_name.clone().unwrap_or_else(|| "Unknown".to_owned());
            }
            category.spent += line.line_total();
            category.items += line.quantity;
            categories_touched.insert(category_key);

            let brand_key = line.brand_id.map_or(GroupKey::Unknown, GroupKey::Id);
            let brand = self.brands.entry(brand_key).or_default();
            if brand.name.is_empty() {
                brand.name = line.brand_name.clone().unwrap_or_else(|| "Unknown".to_owned());
            }
            brand.spent += line.line_total();
            brand.items += line.quantity;
            brands_touched.insert(brand_key);
        }
        for key in categories_touched {
            if let Some(stats) = self.categories.get_mut(&key) {
                stats.orders += 1;
            }
        }
        for key in brands_touched {
            if let Some(stats) = self.brands.get_mut(&key) {
                stats.orders += 1;
            }
        }
    }
}

/// Fold one customer's orders into metrics. Order of input does not
/// matter; date extremes are tracked explicitly.
pub fn aggregate_customer(customer_id: CustomerId, orders: &[Order]) -> CustomerMetrics {
    let mut metrics = CustomerMetrics::empty(customer_id);
    for order in orders.iter().filter(|order| order.customer_id == customer_id) {
        metrics.fold_order(order);
    }
    metrics
}

/// Group a batch of orders by customer, one metrics row per customer,
/// sorted by customer id.
pub fn aggregate(orders: &[Order]) -> Vec<CustomerMetrics> {
    let mut by_customer: BTreeMap<CustomerId, CustomerMetrics> = BTreeMap::new();
    for order in orders {
        by_customer
            .entry(order.customer_id)
            .or_insert_with(|| CustomerMetrics::empty(order.customer_id))
            .fold_order(order);
    }
    by_customer.into_values().collect()
}

/// Roll orders up per calendar month (`YYYY-MM`).
pub fn monthly_trends(orders: &[Order]) -> BTreeMap<String, MonthlyStats> {
    let mut months: BTreeMap<String, MonthlyStats> = BTreeMap::new();
    for order in orders {
        let bucket = order.placed_at.format("%Y-%m").to_string();
        let stats = months.entry(bucket).or_default();
        stats.orders += 1;
        stats.spent += order.total();
        stats.items += order.item_count();
    }
    months
}
