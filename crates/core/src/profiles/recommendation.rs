use serde::{Deserialize, Serialize};

use super::ProfileError;
use crate::segmentation::Segment;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationProfile {
    pub confidence: ConfidenceThresholds,
    pub discount_rates: SegmentAmounts,
    pub target_amounts: SegmentAmounts,
    pub limits: RecommendationLimits,
    pub algorithm_weights: AlgorithmWeights,
    pub performance: PerformanceThresholds,
    pub seasonal_factors: SeasonalFactors,
    pub price_sensitivity: ConfidenceThresholds,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfidenceThresholds {
    pub high: f64,
    pub medium: f64,
    pub low: f64,
}

/// Per-segment numeric table, used for both discount rates and
/// promotion target amounts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentAmounts {
    pub whale: f64,
    pub vip: f64,
    pub regular: f64,
    pub new: f64,
    pub churn: f64,
}

impl SegmentAmounts {
    pub fn for_segment(&self, segment: Segment) -> f64 {
        match segment {
            Segment::Whale => self.whale,
            Segment::Vip => self.vip,
            Segment::Regular => self.regular,
            Segment::New => self.new,
            Segment::Churn => self.churn,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationLimits {
    pub products: usize,
    pub promotions: usize,
    pub strategies: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmWeights {
    pub collaborative_filtering: f64,
    pub content_based: f64,
    pub popularity: f64,
    pub recency: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceThresholds {
    pub min_click_rate: f64,
    pub min_conversion_rate: f64,
    pub min_revenue_impact: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalFactors {
    pub spring: f64,
    pub summer: f64,
    pub autumn: f64,
    pub winter: f64,
}

impl SeasonalFactors {
    pub fn for_month(&self, month: u32) -> f64 {
        match month {
            3..=5 => self.spring,
            6..=8 => self.summer,
            9..=11 => self.autumn,
            _ => self.winter,
        }
    }
}

const DEFAULT_CONFIDENCE: ConfidenceThresholds =
    ConfidenceThresholds { high: 0.8, medium: 0.6, low: 0.4 };
const DEFAULT_LIMITS: RecommendationLimits =
    RecommendationLimits { products: 5, promotions: 3, strategies: 2 };
const DEFAULT_PERFORMANCE: PerformanceThresholds =
    PerformanceThresholds { min_click_rate: 0.05, min_conversion_rate: 0.02, min_revenue_impact: 100.0 };
const DEFAULT_SEASONAL: SeasonalFactors =
    SeasonalFactors { spring: 1.1, summer: 1.0, autumn: 1.05, winter: 1.15 };
const DEFAULT_PRICE_SENSITIVITY: ConfidenceThresholds =
    ConfidenceThresholds { high: 0.8, medium: 0.5, low: 0.2 };

impl RecommendationProfile {
    pub fn builtin(business_type: &str) -> Self {
        let default = Self {
            confidence: DEFAULT_CONFIDENCE,
            discount_rates: SegmentAmounts {
                whale: 0.20,
                vip: 0.15,
                regular: 0.10,
                new: 0.05,
                churn: 0.25,
            },
            target_amounts: SegmentAmounts {
                whale: 10_000.0,
                vip: 5000.0,
                regular: 2000.0,
                new: 1000.0,
                churn: 1500.0,
            },
            limits: DEFAULT_LIMITS,
            algorithm_weights: AlgorithmWeights {
                collaborative_filtering: 0.4,
                content_based: 0.3,
                popularity: 0.2,
                recency: 0.1,
            },
            performance: DEFAULT_PERFORMANCE,
            seasonal_factors: DEFAULT_SEASONAL,
            price_sensitivity: DEFAULT_PRICE_SENSITIVITY,
        };

        match business_type.trim().to_ascii_lowercase().as_str() {
            "high_value" => Self {
                discount_rates: SegmentAmounts {
                    whale: 0.25,
                    vip: 0.20,
                    regular: 0.15,
                    new: 0.10,
                    churn: 0.30,
                },
                target_amounts: SegmentAmounts {
                    whale: 20_000.0,
                    vip: 10_000.0,
                    regular: 5000.0,
                    new: 2000.0,
                    churn: 3000.0,
                },
                algorithm_weights: AlgorithmWeights {
                    collaborative_filtering: 0.5,
                    content_based: 0.3,
                    popularity: 0.1,
                    recency: 0.1,
                },
                ..default
            },
            "electronics" => Self {
                discount_rates: SegmentAmounts {
                    whale: 0.15,
                    vip: 0.12,
                    regular: 0.08,
                    new: 0.05,
                    churn: 0.20,
                },
                target_amounts: SegmentAmounts {
                    whale: 15_000.0,
                    vip: 8000.0,
                    regular: 3000.0,
                    new: 1500.0,
                    churn: 2500.0,
                },
                algorithm_weights: AlgorithmWeights {
                    collaborative_filtering: 0.3,
                    content_based: 0.5,
                    popularity: 0.1,
                    recency: 0.1,
                },
                ..default
            },
            "fashion" | "sports" => Self {
                discount_rates: SegmentAmounts {
                    whale: 0.18,
                    vip: 0.14,
                    regular: 0.10,
                    new: 0.06,
                    churn: 0.22,
                },
                target_amounts: SegmentAmounts {
                    whale: 8000.0,
                    vip: 4000.0,
                    regular: 2000.0,
                    new: 1000.0,
                    churn: 1800.0,
                },
                algorithm_weights: AlgorithmWeights {
                    collaborative_filtering: 0.4,
                    content_based: 0.2,
                    popularity: 0.3,
                    recency: 0.1,
                },
                seasonal_factors: SeasonalFactors {
                    spring: 1.2,
                    summer: 1.1,
                    autumn: 1.0,
                    winter: 1.3,
                },
                ..default
            },
            "small_business" => Self {
                discount_rates: SegmentAmounts {
                    whale: 0.12,
                    vip: 0.10,
                    regular: 0.08,
                    new: 0.05,
                    churn: 0.15,
                },
                target_amounts: SegmentAmounts {
                    whale: 5000.0,
                    vip: 2500.0,
                    regular: 1000.0,
                    new: 500.0,
                    churn: 800.0,
                },
                algorithm_weights: AlgorithmWeights {
                    collaborative_filtering: 0.2,
                    content_based: 0.3,
                    popularity: 0.4,
                    recency: 0.1,
                },
                ..default
            },
            _ => default,
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.limits.products == 0 {
            return Err(ProfileError::OutOfRange {
                field: "recommendation.limits.products",
                message: "must be at least 1".to_owned(),
            });
        }
        let weights = &self.algorithm_weights;
        for (field, value) in [
            ("recommendation.algorithmWeights.collaborativeFiltering", weights.collaborative_filtering),
            ("recommendation.algorithmWeights.contentBased", weights.content_based),
            ("recommendation.algorithmWeights.popularity", weights.popularity),
            ("recommendation.algorithmWeights.recency", weights.recency),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ProfileError::OutOfRange {
                    field,
                    message: format!("weight {value} must be within 0..=1"),
                });
            }
        }
        Ok(())
    }
}
