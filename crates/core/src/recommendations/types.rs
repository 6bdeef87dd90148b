use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::product::ProductId;
use crate::metrics::GroupKey;
use crate::segmentation::Segment;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Calendar month (1-12) to season.
    pub fn from_month(month: u32) -> Self {
        match month {
            3..=5 => Self::Spring,
            6..=8 => Self::Summer,
            9..=11 => Self::Autumn,
            _ => Self::Winter,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Spring => "Spring",
            Self::Summer => "Summer",
            Self::Autumn => "Autumn",
            Self::Winter => "Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    CollaborativeFiltering,
    ContentBased,
    PopularityBased,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
    pub avg: f64,
}

/// What one customer's history says about their taste. Quantity maps
/// are keyed the same way as the metrics breakdowns.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPreferences {
    pub category_quantities: BTreeMap<GroupKey, i64>,
    pub brand_quantities: BTreeMap<GroupKey, i64>,
    pub price_range: PriceRange,
    pub seasonal_quantities: BTreeMap<Season, i64>,
    /// Orders per month since the first order.
    pub purchase_frequency: f64,
    pub avg_order_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecommendation {
    pub product_id: ProductId,
    pub name: String,
    pub reason: String,
    pub confidence: f64,
    pub algorithm: Algorithm,
    pub category: String,
    pub brand: String,
    pub price: f64,
    pub stock_quantity: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionRecommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub valid_until: chrono::NaiveDate,
    pub target_amount: f64,
    pub discount_rate: f64,
    pub segment: Segment,
    pub priority: Priority,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyRecommendation {
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub priority: Priority,
    pub expected_impact: f64,
    pub implementation_cost: f64,
}

/// Bundle returned alongside predictions when recommendations are
/// requested.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecommendationSet {
    pub products: Vec<ProductRecommendation>,
    pub promotions: Vec<PromotionRecommendation>,
    pub strategies: Vec<StrategyRecommendation>,
}
