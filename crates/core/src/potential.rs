//! Potential-customer scoring for product launches: how interested is
//! an existing customer in a set of products, and what should
//! marketing, sales and inventory do about it.

use std::collections::BTreeSet;

use chrono::{DateTime, Datelike, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::customer::CustomerId;
use crate::domain::order::Order;
use crate::num::{round1, round2, round_currency};
use crate::profiles::{InterestLevelBands, PotentialProfile};

/// What a customer's history with the matching products looks like.
/// `similar_products` counts order lines, not distinct items.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInterestAnalysis {
    pub customer_id: CustomerId,
    pub total_spent: f64,
    pub similar_products: i64,
    pub categories: BTreeSet<String>,
    pub brands: BTreeSet<String>,
    pub first_purchase_at: DateTime<Utc>,
    pub last_purchase_at: DateTime<Utc>,
    /// Orders per month between the first and last purchase.
    pub purchase_frequency: f64,
    pub avg_order_value: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestScore {
    pub total_score: f64,
    pub purchase_frequency_score: f64,
    pub total_spent_score: f64,
    pub recency_score: f64,
    pub diversity_score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestLevel {
    High,
    Medium,
    Low,
}

impl InterestLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelSuggestion {
    pub channel: String,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingInsights {
    pub target_segment: String,
    pub target_segment_detail: String,
    pub preferred_channels: Vec<ChannelSuggestion>,
    pub optimal_timing: String,
    pub optimal_timing_detail: String,
    pub price_range: String,
    pub campaign_suggestions: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SalesCycle {
    Short,
    Medium,
    Long,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DealSize {
    Small,
    Medium,
    Large,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesIntelligence {
    pub lead_score: f64,
    pub lead_tier: InterestLevel,
    pub conversion_probability: f64,
    pub conversion_tier: InterestLevel,
    pub sales_cycle: SalesCycle,
    pub deal_size: DealSize,
    pub follow_up_actions: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockRecommendation {
    Increase,
    Maintain,
    Decrease,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupplyChainImpact {
    Minimal,
    Moderate,
    Significant,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryInsights {
    pub demand_forecast: f64,
    pub stock_recommendation: StockRecommendation,
    pub seasonal_factor: f64,
    pub supply_chain_impact: SupplyChainImpact,
}

/// Fold the customer's matching orders into an analysis row. Returns
/// `None` when there is no history to analyze.
pub fn analyze_history(
    customer_id: CustomerId,
    orders: &[Order],
) -> Option<ProductInterestAnalysis> {
    let first = orders.first()?;

    let mut analysis = ProductInterestAnalysis {
        customer_id,
        total_spent: 0.0,
        similar_products: 0,
        categories: BTreeSet::new(),
        brands: BTreeSet::new(),
        first_purchase_at: first.placed_at,
        last_purchase_at: first.placed_at,
        purchase_frequency: 0.0,
        avg_order_value: 0.0,
    };

    for order in orders {
        for line in &order.lines {
            analysis.total_spent += line.line_total();
            analysis.similar_products += 1;
            analysis
                .categories
                .insert(line.category_name.clone().unwrap_or_else(|| "Unknown".to_owned()));
            analysis.brands.insert(line.brand_name.clone().unwrap_or_else(|| "Unknown".to_owned()));
        }
        analysis.first_purchase_at = analysis.first_purchase_at.min(order.placed_at);
        analysis.last_purchase_at = analysis.last_purchase_at.max(order.placed_at);
    }

    let months = ((analysis.last_purchase_at - analysis.first_purchase_at).num_seconds() as f64
        / 86_400.0
        / 30.0)
        .max(1.0);
    analysis.purchase_frequency = orders.len() as f64 / months;
    analysis.avg_order_value = analysis.total_spent / orders.len() as f64;

    Some(analysis)
}

/// Four ladder scores summed and capped at 10. Ladders that nothing
/// reaches contribute the floor score of 1.
pub fn interest_score(
    analysis: &ProductInterestAnalysis,
    now: DateTime<Utc>,
    profile: &PotentialProfile,
) -> InterestScore {
    let scoring = &profile.scoring;

    let purchase_frequency_score = scoring
        .purchase_frequency
        .weight_at_or_above(analysis.similar_products as f64)
        .unwrap_or(1.0);
    let total_spent_score =
        scoring.total_spent.weight_at_or_above(analysis.total_spent).unwrap_or(1.0);

    let days_since_last_purchase = (now - analysis.last_purchase_at).num_days() as f64;
    let recency_score =
        scoring.recency.weight_at_or_below(days_since_last_purchase).unwrap_or(1.0);

    let diversity_score = scoring
        .diversity
        .weight_for(analysis.categories.len() as f64, analysis.brands.len() as f64)
        .unwrap_or(1.0);

    InterestScore {
        total_score: (purchase_frequency_score + total_spent_score + recency_score
            + diversity_score)
            .min(10.0),
        purchase_frequency_score,
        total_spent_score,
        recency_score,
        diversity_score,
    }
}

fn level_for(value: f64, bands: &InterestLevelBands) -> InterestLevel {
    if bands.high.contains(value) {
        InterestLevel::High
    } else if bands.medium.contains(value) {
        InterestLevel::Medium
    } else {
        InterestLevel::Low
    }
}

pub fn interest_level(total_score: f64, profile: &PotentialProfile) -> InterestLevel {
    level_for(total_score, &profile.interest_levels)
}

pub fn marketing_insights(
    analysis: &ProductInterestAnalysis,
    total_score: f64,
    profile: &PotentialProfile,
) -> MarketingInsights {
    let texts = &profile.marketing_insights;

    let (target_segment, target_segment_detail) =
        if analysis.total_spent >= 5000.0 && analysis.similar_products >= 5 {
            ("tech_enthusiasts", &texts.segments.tech_enthusiasts)
        } else if analysis.total_spent >= 2000.0 && analysis.avg_order_value >= 500.0 {
            ("premium_buyers", &texts.segments.premium_buyers)
        } else if analysis.total_spent >= 1000.0 && analysis.purchase_frequency >= 2.0 {
            ("value_seekers", &texts.segments.value_seekers)
        } else {
            ("casual_shoppers", &texts.segments.casual_shoppers)
        };

    let mut preferred_channels = vec![
        ChannelSuggestion { channel: "email".to_owned(), detail: texts.channels.email.clone() },
        ChannelSuggestion {
            channel: "social_media".to_owned(),
            detail: texts.channels.social_media.clone(),
        },
    ];
    if total_score >= 8.0 {
        preferred_channels.push(ChannelSuggestion {
            channel: "sms".to_owned(),
            detail: texts.channels.sms.clone(),
        });
        preferred_channels.push(ChannelSuggestion {
            channel: "push_notifications".to_owned(),
            detail: texts.channels.push_notifications.clone(),
        });
    }

    let last_purchase_hour = analysis.last_purchase_at.hour();
    let (optimal_timing, optimal_timing_detail) = if last_purchase_hour >= 18
        || last_purchase_hour <= 6
    {
        ("late_night", &texts.timing.late_night)
    } else if (12..=14).contains(&last_purchase_hour) {
        ("lunch_breaks", &texts.timing.lunch_breaks)
    } else if (17..=19).contains(&last_purchase_hour) {
        ("weekday_evenings", &texts.timing.weekday_evenings)
    } else {
        ("weekend_mornings", &texts.timing.weekend_mornings)
    };

    let price_range = if analysis.total_spent >= 5000.0 {
        "$1000+"
    } else if analysis.total_spent >= 2000.0 {
        "$500-$1000"
    } else {
        "$100-$500"
    };

    let campaign_suggestions: Vec<String> = if total_score >= 8.0 {
        ["early_bird_discount", "product_demo", "exclusive_access"]
    } else if total_score >= 5.0 {
        ["limited_time_offer", "product_showcase", "loyalty_rewards"]
    } else {
        ["awareness_campaign", "educational_content", "social_proof"]
    }
    .map(str::to_owned)
    .to_vec();

    MarketingInsights {
        target_segment: target_segment.to_owned(),
        target_segment_detail: target_segment_detail.clone(),
        preferred_channels,
        optimal_timing: optimal_timing.to_owned(),
        optimal_timing_detail: optimal_timing_detail.clone(),
        price_range: price_range.to_owned(),
        campaign_suggestions,
    }
}

pub fn sales_intelligence(
    analysis: &ProductInterestAnalysis,
    total_score: f64,
    profile: &PotentialProfile,
) -> SalesIntelligence {
    let lead_score = (total_score + if analysis.total_spent >= 5000.0 { 2.0 } else { 0.0 })
        .min(10.0);

    let conversion_probability = (total_score / 10.0 * 0.6
        + if analysis.total_spent >= 2000.0 { 0.2 } else { 0.0 }
        + if analysis.similar_products >= 3 { 0.2 } else { 0.0 })
    .min(1.0);

    let sales_cycle = if total_score >= 8.0 && analysis.total_spent >= 5000.0 {
        SalesCycle::Short
    } else if total_score <= 4.0 || analysis.total_spent < 500.0 {
        SalesCycle::Long
    } else {
        SalesCycle::Medium
    };

    let deal_size = if analysis.total_spent >= 5000.0 {
        DealSize::Large
    } else if analysis.total_spent < 1000.0 {
        DealSize::Small
    } else {
        DealSize::Medium
    };

    let follow_up_actions: Vec<String> = if total_score >= 8.0 {
        ["product_demo", "pricing_negotiation", "contract_discussion"]
    } else if total_score >= 5.0 {
        ["needs_assessment", "value_proposition", "trial_offer"]
    } else {
        ["relationship_building", "educational_content", "awareness_campaign"]
    }
    .map(str::to_owned)
    .to_vec();

    let bands = &profile.sales_intelligence;
    SalesIntelligence {
        lead_score: round1(lead_score),
        lead_tier: level_for(lead_score, &bands.lead_scoring),
        conversion_probability: round2(conversion_probability),
        conversion_tier: level_for(conversion_probability, &bands.conversion_probability),
        sales_cycle,
        deal_size,
        follow_up_actions,
    }
}

pub fn inventory_insights(
    analysis: &ProductInterestAnalysis,
    total_score: f64,
    now: DateTime<Utc>,
) -> InventoryInsights {
    let base_demand = analysis.similar_products as f64 * 2.0;
    let demand_forecast = round_currency(base_demand * (total_score / 10.0) * 10.0);

    let stock_recommendation = if total_score >= 8.0 && demand_forecast > 50.0 {
        StockRecommendation::Increase
    } else if total_score <= 4.0 || demand_forecast < 10.0 {
        StockRecommendation::Decrease
    } else {
        StockRecommendation::Maintain
    };

    let seasonal_factor = match now.month() {
        11 | 12 | 1 | 2 => 1.3,
        7..=9 => 0.8,
        _ => 1.0,
    };

    let supply_chain_impact = if demand_forecast > 500.0 {
        SupplyChainImpact::Significant
    } else if demand_forecast > 100.0 {
        SupplyChainImpact::Moderate
    } else {
        SupplyChainImpact::Minimal
    };

    InventoryInsights {
        demand_forecast,
        stock_recommendation,
        seasonal_factor,
        supply_chain_impact,
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::order::{OrderId, OrderLine};
    use crate::domain::product::ProductId;

    fn at(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, day, hour, 0, 0).unwrap()
    }

    fn line(category: &str, brand: &str, quantity: i64, price: f64) -> OrderLine {
        OrderLine {
            item_id: ProductId(1),
            item_name: "item".to_owned(),
            quantity,
            price_per_unit: price,
            discount_amount: 0.0,
            category_id: Some(1),
            category_name: Some(category.to_owned()),
            brand_id: Some(1),
            brand_name: Some(brand.to_owned()),
        }
    }

    fn order(id: i64, placed_at: DateTime<Utc>, lines: Vec<OrderLine>) -> Order {
        Order { id: OrderId(id), customer_id: CustomerId(7), placed_at, lines }
    }

    fn profile() -> PotentialProfile {
        PotentialProfile::builtin("default")
    }

    #[test]
    fn history_analysis_counts_lines_and_name_sets() {
        let orders = vec![
            order(1, at(2024, 1, 1, 10), vec![line("Phones", "Acme", 1, 600.0)]),
            order(
                2,
                at(2024, 3, 1, 10),
                vec![line("Phones", "Acme", 2, 300.0), line("Audio", "Bolt", 1, 200.0)],
            ),
        ];
        let analysis = analyze_history(CustomerId(7), &orders).unwrap();

        assert_eq!(analysis.similar_products, 3);
        assert_eq!(analysis.total_spent, 1400.0);
        assert_eq!(analysis.categories.len(), 2);
        assert_eq!(analysis.brands.len(), 2);
        assert_eq!(analysis.avg_order_value, 700.0);
        // Two orders over a two-month span.
        assert!((analysis.purchase_frequency - 1.0).abs() < 0.02);

        assert_eq!(analyze_history(CustomerId(7), &[]), None);
    }

    #[test]
    fn interest_score_sums_ladders_and_caps_at_ten() {
        let orders = vec![
            order(1, at(2024, 1, 1, 10), vec![line("Phones", "Acme", 1, 400.0)]),
            order(
                2,
                at(2024, 3, 1, 10),
                vec![
                    line("Phones", "Acme", 1, 400.0),
                    line("Audio", "Bolt", 1, 200.0),
                    line("Audio", "Bolt", 1, 100.0),
                    line("Wearables", "Crux", 1, 100.0),
                ],
            ),
        ];
        let analysis = analyze_history(CustomerId(7), &orders).unwrap();
        let score = interest_score(&analysis, at(2024, 4, 15, 10), &profile());

        // 5 lines, 1200 spent, 45 days since the last purchase, 3 of
        // each diversity dimension.
        assert_eq!(score.purchase_frequency_score, 3.0);
        assert_eq!(score.total_spent_score, 3.0);
        assert_eq!(score.recency_score, 4.0);
        assert_eq!(score.diversity_score, 3.0);
        assert_eq!(score.total_score, 10.0);
        assert_eq!(interest_level(score.total_score, &profile()), InterestLevel::High);
    }

    #[test]
    fn stale_thin_history_bottoms_out_low() {
        let orders = vec![order(1, at(2022, 1, 1, 10), vec![line("Phones", "Acme", 1, 50.0)])];
        let analysis = analyze_history(CustomerId(7), &orders).unwrap();
        let score = interest_score(&analysis, at(2024, 1, 1, 10), &profile());

        // Every ladder falls through to the floor of 1.
        assert_eq!(score.total_score, 4.0);
        assert_eq!(interest_level(score.total_score, &profile()), InterestLevel::Medium);
    }

    #[test]
    fn marketing_insights_pick_segment_channels_and_timing() {
        let orders = vec![order(
            1,
            at(2024, 3, 1, 13),
            vec![
                line("Phones", "Acme", 1, 2000.0),
                line("Audio", "Bolt", 1, 1500.0),
                line("Audio", "Bolt", 1, 800.0),
                line("Wearables", "Crux", 1, 500.0),
                line("Phones", "Acme", 1, 400.0),
            ],
        )];
        let analysis = analyze_history(CustomerId(7), &orders).unwrap();
        let insights = marketing_insights(&analysis, 9.0, &profile());

        assert_eq!(insights.target_segment, "tech_enthusiasts");
        assert!(insights.target_segment_detail.contains("technology"));
        assert_eq!(insights.preferred_channels.len(), 4);
        assert_eq!(insights.optimal_timing, "lunch_breaks");
        assert_eq!(insights.price_range, "$1000+");
        assert_eq!(
            insights.campaign_suggestions,
            vec!["early_bird_discount", "product_demo", "exclusive_access"]
        );
    }

    #[test]
    fn evening_hours_fold_into_late_night() {
        let orders = vec![order(1, at(2024, 3, 1, 19), vec![line("Phones", "Acme", 1, 100.0)])];
        let analysis = analyze_history(CustomerId(7), &orders).unwrap();
        let insights = marketing_insights(&analysis, 3.0, &profile());

        assert_eq!(insights.optimal_timing, "late_night");
        assert_eq!(insights.preferred_channels.len(), 2);
        assert_eq!(insights.price_range, "$100-$500");
    }

    #[test]
    fn sales_intelligence_boosts_big_spenders() {
        let orders = vec![order(
            1,
            at(2024, 3, 1, 10),
            vec![
                line("Phones", "Acme", 1, 3000.0),
                line("Audio", "Bolt", 1, 2000.0),
                line("Audio", "Bolt", 1, 1000.0),
            ],
        )];
        let analysis = analyze_history(CustomerId(7), &orders).unwrap();
        let intel = sales_intelligence(&analysis, 9.0, &profile());

        assert_eq!(intel.lead_score, 10.0);
        assert_eq!(intel.lead_tier, InterestLevel::High);
        // 0.54 from the score plus both spend and breadth bonuses.
        assert_eq!(intel.conversion_probability, 0.94);
        assert_eq!(intel.conversion_tier, InterestLevel::High);
        assert_eq!(intel.sales_cycle, SalesCycle::Short);
        assert_eq!(intel.deal_size, DealSize::Large);
        assert_eq!(
            intel.follow_up_actions,
            vec!["product_demo", "pricing_negotiation", "contract_discussion"]
        );
    }

    #[test]
    fn inventory_scales_demand_with_interest() {
        let orders = vec![order(
            1,
            at(2024, 3, 1, 10),
            (0..30).map(|_| line("Phones", "Acme", 1, 100.0)).collect(),
        )];
        let analysis = analyze_history(CustomerId(7), &orders).unwrap();

        let hot = inventory_insights(&analysis, 10.0, at(2024, 12, 1, 10));
        assert_eq!(hot.demand_forecast, 600.0);
        assert_eq!(hot.stock_recommendation, StockRecommendation::Increase);
        assert_eq!(hot.seasonal_factor, 1.3);
        assert_eq!(hot.supply_chain_impact, SupplyChainImpact::Significant);

        let cold = inventory_insights(&analysis, 2.0, at(2024, 8, 1, 10));
        assert_eq!(cold.demand_forecast, 120.0);
        assert_eq!(cold.stock_recommendation, StockRecommendation::Decrease);
        assert_eq!(cold.seasonal_factor, 0.8);
        assert_eq!(cold.supply_chain_impact, SupplyChainImpact::Moderate);
    }
}
