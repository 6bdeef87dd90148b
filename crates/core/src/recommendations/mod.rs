//! Product, promotion and strategy recommendations.
//!
//! Three candidate generators feed a weighted ranking step:
//! collaborative filtering over customers with similar category tastes,
//! content-based matching against the customer's own preferences, and
//! a popularity fallback over all sales.

mod engine;
mod types;

pub use engine::{
    analyze_preferences, collaborative_filtering, content_based_filtering,
    popularity_based_filtering, promotions, rank, strategies,
};
pub use types::{
    Algorithm, CustomerPreferences, PriceRange, Priority, ProductRecommendation,
    PromotionRecommendation, RecommendationSet, Season, StrategyRecommendation,
};
