//! The three recommendation algorithms plus promotion and strategy
//! generation. Everything operates on in-memory snapshots so the
//! algorithms stay pure; the service layer is responsible for loading
//! the order and catalog data.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::domain::customer::CustomerId;
use crate::domain::order::Order;
use crate::domain::product::{Product, ProductId};
use crate::metrics::GroupKey;
use crate::num::round2;
use crate::profiles::RecommendationProfile;
use crate::segmentation::Segment;

use super::types::{
    Algorithm, CustomerPreferences, PriceRange, Priority, ProductRecommendation,
    PromotionRecommendation, Season, StrategyRecommendation,
};

fn category_key(id: Option<i64>) -> GroupKey {
    id.map_or(GroupKey::Unknown, GroupKey::Id)
}

/// Fold one customer's orders into taste signals: quantity per
/// category, brand and season, the unit-price range, and order cadence.
pub fn analyze_preferences(orders: &[Order], now: DateTime<Utc>) -> CustomerPreferences {
    let mut category_quantities: BTreeMap<GroupKey, i64> = BTreeMap::new();
    let mut brand_quantities: BTreeMap<GroupKey, i64> = BTreeMap::new();
    let mut seasonal_quantities: BTreeMap<Season, i64> = BTreeMap::new();
    let mut prices: Vec<f64> = Vec::new();
    let mut total_spent = 0.0;

    for order in orders {
        let season = Season::from_month(order.placed_at.month());
        for line in &order.lines {
            *category_quantities.entry(category_key(line.category_id)).or_default() +=
                line.quantity;
            *brand_quantities.entry(category_key(line.brand_id)).or_default() += line.quantity;
            *seasonal_quantities.entry(season).or_default() += line.quantity;
            prices.push(line.price_per_unit);
        }
        total_spent += order.total();
    }

    let price_range = if prices.is_empty() {
        PriceRange::default()
    } else {
        PriceRange {
            min: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            avg: prices.iter().sum::<f64>() / prices.len() as f64,
        }
    };

    let purchase_frequency = orders.first().map_or(0.0, |first| {
        let months = ((now - first.placed_at).num_seconds() as f64 / 86_400.0 / 30.0).max(1.0);
        orders.len() as f64 / months
    });
    let avg_order_value =
        if orders.is_empty() { 0.0 } else { total_spent / orders.len() as f64 };

    CustomerPreferences {
        category_quantities,
        brand_quantities,
        price_range,
        seasonal_quantities,
        purchase_frequency,
        avg_order_value,
    }
}

/// Customers who placed at least two orders touching the target's
/// preferred categories.
fn similar_customers(
    customer_id: CustomerId,
    all_orders: &[Order],
    preferences: &CustomerPreferences,
) -> Vec<CustomerId> {
    let mut matching_orders: BTreeMap<CustomerId, i64> = BTreeMap::new();
    for order in all_orders {
        if order.customer_id == customer_id {
            continue;
        }
        let touches_preferred = order
            .lines
            .iter()
            .any(|line| preferences.category_quantities.contains_key(&category_key(line.category_id)));
        if touches_preferred {
            *matching_orders.entry(order.customer_id).or_default() += 1;
        }
    }
    matching_orders
        .into_iter()
        .filter(|(_, count)| *count >= 2)
        .map(|(customer, _)| customer)
        .collect()
}

/// Products bought by customers with similar category tastes that the
/// target has not bought yet.
pub fn collaborative_filtering(
    customer_id: CustomerId,
    all_orders: &[Order],
    catalog: &[Product],
    preferences: &CustomerPreferences,
) -> Vec<ProductRecommendation> {
    let similar = similar_customers(customer_id, all_orders, preferences);
    if similar.is_empty() {
        return Vec::new();
    }
    let similar_set: BTreeSet<CustomerId> = similar.iter().copied().collect();

    let owned: BTreeSet<ProductId> = all_orders
        .iter()
        .filter(|order| order.customer_id == customer_id)
        .flat_map(|order| order.lines.iter().map(|line| line.item_id))
        .collect();

    let by_id: BTreeMap<ProductId, &Product> =
        catalog.iter().map(|product| (product.id, product)).collect();

    let mut seen: BTreeSet<ProductId> = BTreeSet::new();
    let mut recommendations = Vec::new();
    for order in all_orders.iter().filter(|order| similar_set.contains(&order.customer_id)) {
        for line in &order.lines {
            if owned.contains(&line.item_id) || !seen.insert(line.item_id) {
                continue;
            }
            let Some(product) = by_id.get(&line.item_id) else {
                continue;
            };
            let base_confidence = (0.5 + similar.len() as f64 * 0.1).min(0.9);
            let popularity_factor = (product.stock as f64 / 100.0).min(1.0);
            recommendations.push(ProductRecommendation {
                product_id: product.id,
                name: product.name.clone(),
                reason: "Popular among customers with similar preferences".to_owned(),
                confidence: round2(base_confidence * popularity_factor),
                algorithm: Algorithm::CollaborativeFiltering,
                category: product.category_name.clone().unwrap_or_else(|| "Unknown".to_owned()),
                brand: product.brand_name.clone().unwrap_or_else(|| "Unknown".to_owned()),
                price: product.price,
                stock_quantity: product.stock,
            });
        }
    }
    recommendations
}

/// In-stock products from the customer's top three categories whose
/// price sits near their historical range.
pub fn content_based_filtering(
    preferences: &CustomerPreferences,
    catalog: &[Product],
    profile: &RecommendationProfile,
) -> Vec<ProductRecommendation> {
    let mut ranked: Vec<(GroupKey, i64)> =
        preferences.category_quantities.iter().map(|(key, qty)| (*key, *qty)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    let top_categories: BTreeSet<GroupKey> =
        ranked.into_iter().take(3).map(|(key, _)| key).collect();

    let price_floor = preferences.price_range.min * 0.8;
    let price_ceiling = preferences.price_range.max * 1.2;

    catalog
        .iter()
        .filter(|product| {
            product.active
                && product.stock > 0
                && top_categories.contains(&category_key(product.category_id))
                && product.price >= price_floor
                && product.price <= price_ceiling
        })
        .take(profile.limits.products)
        .map(|product| {
            let category = product.category_name.clone().unwrap_or_else(|| "Unknown".to_owned());
            ProductRecommendation {
                product_id: product.id,
                name: product.name.clone(),
                reason: format!("Based on your preference for {category} products"),
                confidence: content_confidence(product, preferences),
                algorithm: Algorithm::ContentBased,
                category,
                brand: product.brand_name.clone().unwrap_or_else(|| "Unknown".to_owned()),
                price: product.price,
                stock_quantity: product.stock,
            }
        })
        .collect()
}

fn content_confidence(product: &Product, preferences: &CustomerPreferences) -> f64 {
    let category_quantity = preferences
        .category_quantities
        .get(&category_key(product.category_id))
        .copied()
        .unwrap_or(0);
    let brand_quantity =
        preferences.brand_quantities.get(&category_key(product.brand_id)).copied().unwrap_or(0);

    let category_score = (category_quantity as f64 / 10.0).min(1.0);
    let brand_score = (brand_quantity as f64 / 5.0).min(1.0);
    let in_range = product.price >= preferences.price_range.min
        && product.price <= preferences.price_range.max;
    let price_score = if in_range { 1.0 } else { 0.5 };

    round2(category_score * 0.4 + brand_score * 0.3 + price_score * 0.3)
}

/// Best sellers by total quantity across all customers, filtered to
/// what is active and in stock.
pub fn popularity_based_filtering(
    all_orders: &[Order],
    catalog: &[Product],
    profile: &RecommendationProfile,
) -> Vec<ProductRecommendation> {
    let mut quantities: BTreeMap<ProductId, i64> = BTreeMap::new();
    for order in all_orders {
        for line in &order.lines {
            *quantities.entry(line.item_id).or_default() += line.quantity;
        }
    }
    let mut ranked: Vec<(ProductId, i64)> = quantities.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.truncate(profile.limits.products);

    let by_id: BTreeMap<ProductId, &Product> =
        catalog.iter().map(|product| (product.id, product)).collect();

    ranked
        .into_iter()
        .filter_map(|(id, _)| by_id.get(&id).copied())
        .filter(|product| product.active && product.stock > 0)
        .map(|product| ProductRecommendation {
            product_id: product.id,
            name: product.name.clone(),
            reason: "Popular among all customers".to_owned(),
            confidence: 0.7,
            algorithm: Algorithm::PopularityBased,
            category: product.category_name.clone().unwrap_or_else(|| "Unknown".to_owned()),
            brand: product.brand_name.clone().unwrap_or_else(|| "Unknown".to_owned()),
            price: product.price,
            stock_quantity: product.stock,
        })
        .collect()
}

/// Order candidates by confidence weighted with the per-algorithm
/// weight, best first. The sort is stable so equal scores keep their
/// algorithm order.
pub fn rank(
    mut products: Vec<ProductRecommendation>,
    profile: &RecommendationProfile,
) -> Vec<ProductRecommendation> {
    let weight = |algorithm: Algorithm| match algorithm {
        Algorithm::CollaborativeFiltering => profile.algorithm_weights.collaborative_filtering,
        Algorithm::ContentBased => profile.algorithm_weights.content_based,
        Algorithm::PopularityBased => profile.algorithm_weights.popularity,
    };
    products.sort_by(|a, b| {
        let score_a = a.confidence * weight(a.algorithm);
        let score_b = b.confidence * weight(b.algorithm);
        score_b.partial_cmp(&score_a).unwrap_or(std::cmp::Ordering::Equal)
    });
    products
}

/// Loyalty discount for everyone, a seasonal offer when the current
/// season runs hot, and a comeback offer for churned customers.
pub fn promotions(
    segment: Segment,
    profile: &RecommendationProfile,
    now: DateTime<Utc>,
) -> Vec<PromotionRecommendation> {
    let discount_rate = profile.discount_rates.for_segment(segment);
    let target_amount = profile.target_amounts.for_segment(segment);
    let mut promotions = Vec::new();

    let loyalty_priority = if matches!(segment, Segment::Whale | Segment::Vip) {
        Priority::High
    } else {
        Priority::Medium
    };
    promotions.push(PromotionRecommendation {
        kind: "loyalty_discount".to_owned(),
        description: format!("{}% off on your next purchase", (discount_rate * 100.0).round()),
        valid_until: (now + Duration::days(30)).date_naive(),
        target_amount,
        discount_rate,
        segment,
        priority: loyalty_priority,
    });

    let season = Season::from_month(now.month());
    let seasonal_factor = profile.seasonal_factors.for_month(now.month());
    if seasonal_factor > 1.1 {
        promotions.push(PromotionRecommendation {
            kind: "seasonal_promotion".to_owned(),
            description: format!("{} season special offer", season.display_name()),
            valid_until: (now + Duration::days(60)).date_naive(),
            target_amount: target_amount * 0.8,
            discount_rate: discount_rate * 1.2,
            segment,
            priority: Priority::Medium,
        });
    }

    if segment == Segment::Churn {
        promotions.push(PromotionRecommendation {
            kind: "retention_offer".to_owned(),
            description: "Special comeback offer".to_owned(),
            valid_until: (now + Duration::days(15)).date_naive(),
            target_amount: target_amount * 0.5,
            discount_rate: discount_rate * 1.5,
            segment,
            priority: Priority::High,
        });
    }

    promotions.truncate(profile.limits.promotions);
    promotions
}

/// Marketing plays that fit the customer's breadth of taste and value
/// tier.
pub fn strategies(
    segment: Segment,
    preferences: &CustomerPreferences,
    profile: &RecommendationProfile,
    now: DateTime<Utc>,
) -> Vec<StrategyRecommendation> {
    let mut strategies = Vec::new();

    if preferences.category_quantities.len() > 1 {
        strategies.push(StrategyRecommendation {
            kind: "cross_selling".to_owned(),
            description: "Recommend complementary products from different categories".to_owned(),
            priority: Priority::High,
            expected_impact: 0.15,
            implementation_cost: 0.05,
        });
    }

    if matches!(segment, Segment::Whale | Segment::Vip) {
        strategies.push(StrategyRecommendation {
            kind: "upselling".to_owned(),
            description: "Recommend premium versions of purchased products".to_owned(),
            priority: Priority::High,
            expected_impact: 0.25,
            implementation_cost: 0.08,
        });
    }

    if preferences.brand_quantities.len() > 2 {
        strategies.push(StrategyRecommendation {
            kind: "personalization".to_owned(),
            description: "Create personalized product bundles based on brand preferences"
                .to_owned(),
            priority: Priority::Medium,
            expected_impact: 0.12,
            implementation_cost: 0.06,
        });
    }

    let season = Season::from_month(now.month());
    if profile.seasonal_factors.for_month(now.month()) > 1.1 {
        strategies.push(StrategyRecommendation {
            kind: "seasonal_marketing".to_owned(),
            description: format!("Focus on {season} seasonal products"),
            priority: Priority::Medium,
            expected_impact: 0.10,
            implementation_cost: 0.03,
        });
    }

    strategies.truncate(profile.limits.strategies);
    strategies
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::order::{OrderId, OrderLine};

    fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap()
    }

    fn line(item: i64, category: i64, brand: i64, quantity: i64, price: f64) -> OrderLine {
        OrderLine {
            item_id: ProductId(item),
            item_name: format!("item-{item}"),
            quantity,
            price_per_unit: price,
            discount_amount: 0.0,
            category_id: Some(category),
            category_name: Some(format!("category-{category}")),
            brand_id: Some(brand),
            brand_name: Some(format!("brand-{brand}")),
        }
    }

    fn order(id: i64, customer: i64, placed_at: DateTime<Utc>, lines: Vec<OrderLine>) -> Order {
        Order { id: OrderId(id), customer_id: CustomerId(customer), placed_at, lines }
    }

    fn product(id: i64, category: i64, price: f64, stock: i64) -> Product {
        Product {
            id: ProductId(id),
            name: format!("item-{id}"),
            price,
            stock,
            active: true,
            category_id: Some(category),
            category_name: Some(format!("category-{category}")),
            brand_id: Some(1),
            brand_name: Some("brand-1".to_owned()),
        }
    }

    fn profile() -> RecommendationProfile {
        RecommendationProfile::builtin("default")
    }

    #[test]
    fn preferences_tally_quantities_and_price_range() {
        let orders = vec![
            order(1, 7, at(2024, 4, 1), vec![line(1, 10, 1, 2, 100.0), line(2, 20, 2, 1, 40.0)]),
            order(2, 7, at(2024, 7, 1), vec![line(1, 10, 1, 3, 120.0)]),
        ];
        let preferences = analyze_preferences(&orders, at(2024, 7, 1));

        assert_eq!(preferences.category_quantities[&GroupKey::Id(10)], 5);
        assert_eq!(preferences.category_quantities[&GroupKey::Id(20)], 1);
        assert_eq!(preferences.seasonal_quantities[&Season::Spring], 3);
        assert_eq!(preferences.seasonal_quantities[&Season::Summer], 3);
        assert_eq!(preferences.price_range.min, 40.0);
        assert_eq!(preferences.price_range.max, 120.0);
        // Two orders over a three-month span.
        assert!((preferences.purchase_frequency - 2.0 / 3.0334).abs() < 0.01);
        assert_eq!(preferences.avg_order_value, 300.0);
    }

    #[test]
    fn empty_history_yields_neutral_preferences() {
        let preferences = analyze_preferences(&[], at(2024, 7, 1));
        assert!(preferences.category_quantities.is_empty());
        assert_eq!(preferences.price_range, PriceRange::default());
        assert_eq!(preferences.purchase_frequency, 0.0);
        assert_eq!(preferences.avg_order_value, 0.0);
    }

    #[test]
    fn collaborative_recommends_unowned_products_of_similar_customers() {
        // Customer 7 buys in category 10. Customer 8 shares the category
        // across two orders and also bought item 3.
        let all_orders = vec![
            order(1, 7, at(2024, 1, 1), vec![line(1, 10, 1, 1, 100.0)]),
            order(2, 8, at(2024, 1, 5), vec![line(1, 10, 1, 1, 100.0)]),
            order(3, 8, at(2024, 2, 5), vec![line(3, 10, 2, 1, 150.0)]),
            // Customer 9 only matched once, so they are not similar.
            order(4, 9, at(2024, 2, 6), vec![line(4, 10, 2, 1, 80.0)]),
        ];
        let catalog = vec![product(1, 10, 100.0, 50), product(3, 10, 150.0, 100)];
        let preferences =
            analyze_preferences(&all_orders[..1], at(2024, 3, 1));

        let recommendations =
            collaborative_filtering(CustomerId(7), &all_orders, &catalog, &preferences);

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].product_id, ProductId(3));
        assert_eq!(recommendations[0].algorithm, Algorithm::CollaborativeFiltering);
        // One similar customer and full stock: min(0.9, 0.6) * 1.0.
        assert_eq!(recommendations[0].confidence, 0.6);
    }

    #[test]
    fn content_based_honors_category_stock_and_price_window() {
        let orders =
            vec![order(1, 7, at(2024, 1, 1), vec![line(1, 10, 1, 10, 100.0)])];
        let preferences = analyze_preferences(&orders, at(2024, 3, 1));

        let catalog = vec![
            product(2, 10, 110.0, 5),
            product(3, 10, 500.0, 5),  // outside 0.8x..1.2x window
            product(4, 20, 100.0, 5),  // wrong category
            product(5, 10, 100.0, 0),  // out of stock
        ];
        let recommendations = content_based_filtering(&preferences, &catalog, &profile());

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].product_id, ProductId(2));
        // Category quantity 10 saturates, brand-1 quantity 10 saturates,
        // 110.0 sits outside the strict min..max range: 0.4 + 0.3 + 0.15.
        assert_eq!(recommendations[0].confidence, 0.85);
    }

    #[test]
    fn popularity_ranks_by_quantity_and_skips_inactive() {
        let all_orders = vec![
            order(1, 7, at(2024, 1, 1), vec![line(1, 10, 1, 5, 10.0)]),
            order(2, 8, at(2024, 1, 2), vec![line(2, 10, 1, 9, 10.0)]),
        ];
        let mut retired = product(2, 10, 10.0, 5);
        retired.active = false;
        let catalog = vec![product(1, 10, 10.0, 5), retired];

        let recommendations = popularity_based_filtering(&all_orders, &catalog, &profile());
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].product_id, ProductId(1));
        assert_eq!(recommendations[0].confidence, 0.7);
    }

    #[test]
    fn ranking_weights_algorithms_before_confidence() {
        let collaborative = ProductRecommendation {
            product_id: ProductId(1),
            name: "a".to_owned(),
            reason: String::new(),
            confidence: 0.6,
            algorithm: Algorithm::CollaborativeFiltering,
            category: String::new(),
            brand: String::new(),
            price: 1.0,
            stock_quantity: 1,
        };
        let popular = ProductRecommendation {
            product_id: ProductId(2),
            confidence: 0.7,
            algorithm: Algorithm::PopularityBased,
            ..collaborative.clone()
        };

        // 0.6 * 0.4 outranks 0.7 * 0.2.
        let ranked = rank(vec![popular, collaborative], &profile());
        assert_eq!(ranked[0].product_id, ProductId(1));
    }

    #[test]
    fn churned_customers_get_a_comeback_offer() {
        // July: default summer factor is 1.0, so no seasonal promotion.
        let promotions = promotions(Segment::Churn, &profile(), at(2024, 7, 1));
        assert_eq!(promotions.len(), 2);
        assert_eq!(promotions[0].kind, "loyalty_discount");
        assert_eq!(promotions[0].description, "25% off on your next purchase");
        assert_eq!(promotions[1].kind, "retention_offer");
        assert_eq!(promotions[1].priority, Priority::High);
        assert_eq!(promotions[1].target_amount, 750.0);
        assert_eq!(promotions[1].discount_rate, 0.375);
    }

    #[test]
    fn winter_triggers_seasonal_promotions_and_strategies() {
        let promotions = promotions(Segment::Vip, &profile(), at(2024, 1, 15));
        assert_eq!(promotions.len(), 2);
        assert_eq!(promotions[0].priority, Priority::High);
        assert_eq!(promotions[1].kind, "seasonal_promotion");
        assert_eq!(promotions[1].description, "Winter season special offer");

        let orders = vec![order(
            1,
            7,
            at(2024, 1, 1),
            vec![line(1, 10, 1, 1, 10.0), line(2, 20, 2, 1, 10.0)],
        )];
        let preferences = analyze_preferences(&orders, at(2024, 1, 15));
        let strategies = strategies(Segment::Vip, &preferences, &profile(), at(2024, 1, 15));

        // Cross-sell and upsell fill the two strategy slots before the
        // seasonal play can make the list.
        assert_eq!(strategies.len(), 2);
        assert_eq!(strategies[0].kind, "cross_selling");
        assert_eq!(strategies[1].kind, "upselling");
    }
}
