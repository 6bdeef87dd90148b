//! Churn risk: a four-factor weighted blend with insight and retention
//! strategy generation.

use serde::{Deserialize, Serialize};

use crate::domain::order::Order;
use crate::num::{round2, round_currency};
use crate::profiles::ChurnProfile;

/// Blend weights for the four risk factors.
const INACTIVITY_WEIGHT: f64 = 0.4;
const FREQUENCY_WEIGHT: f64 = 0.25;
const VALUE_WEIGHT: f64 = 0.2;
const ENGAGEMENT_WEIGHT: f64 = 0.15;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnFactors {
    pub inactivity: f64,
    pub order_frequency: f64,
    pub order_value: f64,
    pub engagement: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnAssessment {
    pub churn_risk: f64,
    pub factors: ChurnFactors,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinbackDifficulty {
    Easy,
    Medium,
    Hard,
}

impl WinbackDifficulty {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnInsightReport {
    pub primary_reason: String,
    pub primary_reason_detail: String,
    pub secondary_reason: String,
    pub secondary_reason_detail: String,
    pub retention_probability: f64,
    pub winback_difficulty: WinbackDifficulty,
    pub winback_note: String,
    pub estimated_revenue_loss: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPlan {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendReport {
    pub order_decline: f64,
    pub value_decline: f64,
}

/// Composite engagement in 0..=1 from order count, spend, recency and
/// average order value.
pub fn engagement_score(
    total_orders: i64,
    total_spent: f64,
    days_since_last_order: i64,
    avg_order_value: f64,
) -> f64 {
    let order_score = (total_orders as f64 / 10.0).min(1.0);
    let value_score = (total_spent / 10_000.0).min(1.0);
    let recency_score = (1.0 - days_since_last_order as f64 / 365.0).max(0.0);
    let avg_value_score = (avg_order_value / 1000.0).min(1.0);

    round2(order_score * 0.3 + value_score * 0.3 + recency_score * 0.3 + avg_value_score * 0.1)
}

/// Score each factor on its ladder and blend. Inactivity climbs with
/// days since the last order; the other three rise as their inputs
/// fall, so they scan from the small end.
pub fn assess(
    days_since_last_order: i64,
    total_orders: i64,
    total_spent: f64,
    engagement: f64,
    profile: &ChurnProfile,
) -> ChurnAssessment {
    let ladders = &profile.risk_factors;
    let inactivity =
        ladders.inactivity.weight_at_or_above(days_since_last_order as f64).unwrap_or(0.0);
    let order_frequency =
        ladders.order_frequency.weight_at_or_below(total_orders as f64).unwrap_or(0.0);
    let order_value = ladders.order_value.weight_at_or_below(total_spent).unwrap_or(0.0);
    let engagement_risk = ladders.engagement.weight_at_or_below(engagement).unwrap_or(0.0);

    let blended = inactivity * INACTIVITY_WEIGHT
        + order_frequency * FREQUENCY_WEIGHT
        + order_value * VALUE_WEIGHT
        + engagement_risk * ENGAGEMENT_WEIGHT;

    ChurnAssessment {
        churn_risk: round2(blended.min(1.0)),
        factors: ChurnFactors {
            inactivity: round2(inactivity),
            order_frequency: round2(order_frequency),
            order_value: round2(order_value),
            engagement: round2(engagement_risk),
        },
    }
}

pub fn risk_level(churn_risk: f64, profile: &ChurnProfile) -> RiskLevel {
    if profile.risk_levels.high.contains(churn_risk) {
        RiskLevel::High
    } else if profile.risk_levels.medium.contains(churn_risk) {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

pub fn insights(
    churn_risk: f64,
    factors: &ChurnFactors,
    total_spent: f64,
    profile: &ChurnProfile,
) -> ChurnInsightReport {
    let mut ranked = [
        ("inactivity", factors.inactivity),
        ("orderFrequency", factors.order_frequency),
        ("orderValue", factors.order_value),
        ("engagement", factors.engagement),
    ];
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let reasons = &profile.insights.reasons;
    let reason_for = |factor: &str| -> (String, String) {
        match factor {
            "inactivity" => ("lack_of_engagement".to_owned(), reasons.lack_of_engagement.clone()),
            "orderFrequency" => ("price_sensitivity".to_owned(), reasons.price_sensitivity.clone()),
            "orderValue" => ("poor_experience".to_owned(), reasons.poor_experience.clone()),
            "engagement" => ("competitor_switch".to_owned(), reasons.competitor_switch.clone()),
            _ => ("life_change".to_owned(), reasons.life_change.clone()),
        }
    };
    let (primary_reason, primary_reason_detail) = reason_for(ranked[0].0);
    let (secondary_reason, secondary_reason_detail) = reason_for(ranked[1].0);

    let winback_difficulty = if churn_risk < 0.4 {
        WinbackDifficulty::Easy
    } else if churn_risk > 0.7 {
        WinbackDifficulty::Hard
    } else {
        WinbackDifficulty::Medium
    };
    let winback_note = match winback_difficulty {
        WinbackDifficulty::Easy => profile.insights.difficulty.easy.clone(),
        WinbackDifficulty::Medium => profile.insights.difficulty.medium.clone(),
        WinbackDifficulty::Hard => profile.insights.difficulty.hard.clone(),
    };

    ChurnInsightReport {
        primary_reason,
        primary_reason_detail,
        secondary_reason,
        secondary_reason_detail,
        retention_probability: round2((1.0 - churn_risk).max(0.1)),
        winback_difficulty,
        winback_note,
        // Assume half of the historical value is at stake.
        estimated_revenue_loss: round_currency(total_spent * churn_risk * 0.5),
    }
}

/// Base strategy lists from the profile plus one extra per factor that
/// crosses 0.5, each horizon capped at three.
pub fn retention_plan(factors: &ChurnFactors, profile: &ChurnProfile) -> RetentionPlan {
    let base = &profile.retention_strategies;
    let mut plan = RetentionPlan {
        immediate: base.immediate.clone(),
        short_term: base.short_term.clone(),
        long_term: base.long_term.clone(),
    };

    if factors.inactivity > 0.5 {
        plan.immediate.push("re_engagement_campaign".to_owned());
    }
    if factors.order_frequency > 0.5 {
        plan.short_term.push("frequency_incentives".to_owned());
    }
    if factors.order_value > 0.5 {
        plan.short_term.push("value_based_offers".to_owned());
    }
    if factors.engagement > 0.5 {
        plan.immediate.push("personalized_communication".to_owned());
    }

    plan.immediate.truncate(3);
    plan.short_term.truncate(3);
    plan.long_term.truncate(3);
    plan
}

/// Compare the recent half of a customer's orders against the older
/// half. Expects chronological input; fewer than two orders reports no
/// decline.
pub fn trends(orders: &[Order]) -> TrendReport {
    if orders.len() < 2 {
        return TrendReport::default();
    }

    let recent_count = orders.len() / 2;
    let older_count = orders.len() - recent_count;
    let (older, recent) = orders.split_at(older_count);

    let avg = |window: &[Order]| -> f64 {
        window.iter().map(Order::total).sum::<f64>() / window.len() as f64
    };
    let older_avg = avg(older);
    let recent_avg = avg(recent);

    TrendReport {
        order_decline: round2((older.len() as f64 - recent.len() as f64) / older.len() as f64),
        value_decline: if older_avg > 0.0 {
            round2((older_avg - recent_avg) / older_avg)
        } else {
            0.0
        },
    }
}

/// Coarse step-function risk used by the CLV batch, cheaper than the
/// full four-factor blend.
pub fn simple_churn_risk(days_since_last_order: i64, total_orders: i64) -> f64 {
    let mut churn_risk: f64 = 0.1;

    if days_since_last_order > 180 {
        churn_risk += 0.4;
    } else if days_since_last_order > 90 {
        churn_risk += 0.3;
    } else if days_since_last_order > 60 {
        churn_risk += 0.2;
    }

    if total_orders <= 2 {
        churn_risk += 0.2;
    }

    churn_risk.min(1.0)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::domain::customer::CustomerId;
    use crate::domain::order::{OrderId, OrderLine};
    use crate::domain::product::ProductId;
    use crate::profiles::ChurnProfile;

    fn profile() -> ChurnProfile {
        ChurnProfile::builtin("default")
    }

    #[test]
    fn engagement_blends_and_rounds() {
        // 10+ orders, $10k spend, bought today, $1k average: all maxed.
        assert_eq!(engagement_score(12, 15_000.0, 0, 1200.0), 1.0);
        assert_eq!(engagement_score(0, 0.0, 365, 0.0), 0.0);
        assert_eq!(engagement_score(5, 5000.0, 0, 500.0), 0.65);
    }

    #[test]
    fn dormant_customer_scores_high_risk() {
        let assessment = assess(400, 1, 80.0, 0.1, &profile());
        // inactivity 0.8, frequency 0.4, value 0.3, engagement 0.8
        assert_eq!(assessment.factors.inactivity, 0.8);
        assert_eq!(assessment.factors.order_frequency, 0.4);
        assert_eq!(assessment.factors.order_value, 0.3);
        assert_eq!(assessment.factors.engagement, 0.8);
        assert_eq!(assessment.churn_risk, 0.6);
        assert_eq!(risk_level(assessment.churn_risk, &profile()), RiskLevel::Medium);
    }

    #[test]
    fn active_customer_scores_near_zero() {
        let assessment = assess(10, 20, 50_000.0, 0.95, &profile());
        assert_eq!(assessment.churn_risk, round2(0.1 * 0.15));
        assert_eq!(risk_level(assessment.churn_risk, &profile()), RiskLevel::Low);
    }

    #[test]
    fn risk_never_exceeds_one() {
        let worst = assess(1000, 0, 0.0, 0.0, &profile());
        assert!(worst.churn_risk <= 1.0);
        assert!(worst.churn_risk >= 0.0);
    }

    #[test]
    fn insights_rank_factors_and_floor_retention() {
        let factors = ChurnFactors {
            inactivity: 0.8,
            order_frequency: 0.4,
            order_value: 0.2,
            engagement: 0.6,
        };
        let report = insights(0.95, &factors, 10_000.0, &profile());
        assert_eq!(report.primary_reason, "lack_of_engagement");
        assert_eq!(report.secondary_reason, "competitor_switch");
        assert_eq!(report.retention_probability, 0.1);
        assert_eq!(report.winback_difficulty, WinbackDifficulty::Hard);
        assert_eq!(report.estimated_revenue_loss, 4750.0);
    }

    #[test]
    fn retention_plan_appends_factor_strategies_and_caps_at_three() {
        let factors = ChurnFactors {
            inactivity: 0.8,
            order_frequency: 0.6,
            order_value: 0.0,
            engagement: 0.0,
        };
        let plan = retention_plan(&factors, &profile());
        assert_eq!(plan.immediate.len(), 3);
        assert_eq!(plan.short_term.len(), 3);
        assert_eq!(plan.long_term.len(), 3);
        // Base lists already hold more than three entries, so the extra
        // factor strategies never surface with the default profile.
        assert!(!plan.immediate.contains(&"re_engagement_campaign".to_owned()));
    }

    fn order_worth(id: i64, day: u32, total: f64) -> Order {
        Order {
            id: OrderId(id),
            customer_id: CustomerId(1),
            placed_at: Utc.with_ymd_and_hms(2024, 1, day, 0, 0, 0).unwrap(),
            lines: vec![OrderLine {
                item_id: ProductId(1),
                item_name: "item".to_owned(),
                quantity: 1,
                price_per_unit: total,
                discount_amount: 0.0,
                category_id: None,
                category_name: None,
                brand_id: None,
                brand_name: None,
            }],
        }
    }

    #[test]
    fn trends_compare_order_halves() {
        let orders = vec![
            order_worth(1, 1, 100.0),
            order_worth(2, 5, 100.0),
            order_worth(3, 10, 50.0),
            order_worth(4, 15, 50.0),
        ];
        let report = trends(&orders);
        assert_eq!(report.order_decline, 0.0);
        assert_eq!(report.value_decline, 0.5);

        assert_eq!(trends(&orders[..1]), TrendReport::default());
    }

    #[test]
    fn simple_risk_steps_with_inactivity_and_thin_history() {
        assert_eq!(simple_churn_risk(30, 10), 0.1);
        assert_eq!(simple_churn_risk(70, 10), 0.1 + 0.2);
        assert_eq!(simple_churn_risk(100, 10), 0.1 + 0.3);
        assert_eq!(simple_churn_risk(200, 1), 0.1 + 0.4 + 0.2);
        assert!(simple_churn_risk(10_000, 0) <= 1.0);
    }
}
