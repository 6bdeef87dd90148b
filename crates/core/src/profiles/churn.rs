use serde::{Deserialize, Serialize};

use super::{ProfileError, ScoreBand, StepLadder};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnProfile {
    pub risk_factors: RiskFactorLadders,
    pub risk_levels: RiskLevelBands,
    pub retention_strategies: RetentionStrategyLists,
    pub insights: ChurnInsightTexts,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskFactorLadders {
    pub inactivity: StepLadder,
    pub order_frequency: StepLadder,
    pub order_value: StepLadder,
    pub engagement: StepLadder,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLevelBands {
    pub high: ScoreBand,
    pub medium: ScoreBand,
    pub low: ScoreBand,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionStrategyLists {
    pub immediate: Vec<String>,
    pub short_term: Vec<String>,
    pub long_term: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnInsightTexts {
    pub reasons: ChurnReasonTexts,
    pub difficulty: ChurnDifficultyTexts,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnReasonTexts {
    pub price_sensitivity: String,
    pub lack_of_engagement: String,
    pub poor_experience: String,
    pub competitor_switch: String,
    pub seasonal_pattern: String,
    pub life_change: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChurnDifficultyTexts {
    pub easy: String,
    pub medium: String,
    pub hard: String,
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_owned()).collect()
}

fn default_risk_levels() -> RiskLevelBands {
    RiskLevelBands {
        high: ScoreBand::new(0.7, 1.0),
        medium: ScoreBand::new(0.4, 0.69),
        low: ScoreBand::new(0.0, 0.39),
    }
}

impl ChurnProfile {
    pub fn builtin(business_type: &str) -> Self {
        match business_type.trim().to_ascii_lowercase().as_str() {
            "high_value" | "high_value_business" => Self {
                risk_factors: RiskFactorLadders {
                    inactivity: StepLadder::new(
                        vec![15.0, 30.0, 60.0, 120.0, 180.0],
                        vec![0.2, 0.3, 0.5, 0.7, 0.9],
                    ),
                    order_frequency: StepLadder::new(
                        vec![2.0, 5.0, 10.0, 20.0, 50.0],
                        vec![0.5, 0.3, 0.2, 0.1, 0.05],
                    ),
                    order_value: StepLadder::new(
                        vec![1000.0, 5000.0, 10_000.0, 50_000.0, 100_000.0],
                        vec![0.4, 0.3, 0.2, 0.1, 0.05],
                    ),
                    engagement: StepLadder::new(
                        vec![0.3, 0.5, 0.7, 0.9, 1.0],
                        vec![0.9, 0.7, 0.5, 0.3, 0.1],
                    ),
                },
                risk_levels: default_risk_levels(),
                retention_strategies: RetentionStrategyLists {
                    immediate: strings(&[
                        "vip_contact",
                        "premium_offer",
                        "dedicated_support",
                        "exclusive_event",
                    ]),
                    short_term: strings(&[
                        "vip_loyalty_program",
                        "premium_recommendations",
                        "early_access",
                        "personalized_service",
                    ]),
                    long_term: strings(&[
                        "relationship_management",
                        "premium_value_proposition",
                        "exclusive_community",
                        "referral_incentives",
                    ]),
                },
                insights: ChurnInsightTexts {
                    reasons: ChurnReasonTexts {
                        price_sensitivity: "VIP customer may be exploring premium alternatives"
                            .to_owned(),
                        lack_of_engagement: "VIP customer engagement has declined significantly"
                            .to_owned(),
                        poor_experience: "VIP customer may have had service quality issues"
                            .to_owned(),
                        competitor_switch: "VIP customer may be courted by competitors".to_owned(),
                        seasonal_pattern: "VIP customer follows luxury seasonal patterns"
                            .to_owned(),
                        life_change: "VIP customer circumstances may have changed".to_owned(),
                    },
                    difficulty: ChurnDifficultyTexts {
                        easy: "VIP customer likely to respond to premium retention efforts"
                            .to_owned(),
                        medium: "VIP customer requires personalized retention approach".to_owned(),
                        hard: "VIP customer may require exceptional retention strategies"
                            .to_owned(),
                    },
                },
            },
            "small_business" | "small_business_config" => Self {
                risk_factors: RiskFactorLadders {
                    inactivity: StepLadder::new(
                        vec![60.0, 120.0, 180.0, 365.0, 730.0],
                        vec![0.05, 0.1, 0.2, 0.4, 0.7],
                    ),
                    order_frequency: StepLadder::new(
                        vec![1.0, 2.0, 3.0, 5.0, 10.0],
                        vec![0.2, 0.15, 0.1, 0.05, 0.02],
                    ),
                    order_value: StepLadder::new(
                        vec![50.0, 200.0, 500.0, 1000.0, 5000.0],
                        vec![0.2, 0.15, 0.1, 0.05, 0.02],
                    ),
                    engagement: StepLadder::new(
                        vec![0.1, 0.3, 0.5, 0.7, 1.0],
                        vec![0.6, 0.4, 0.3, 0.2, 0.1],
                    ),
                },
                risk_levels: default_risk_levels(),
                retention_strategies: RetentionStrategyLists {
                    immediate: strings(&[
                        "friendly_contact",
                        "simple_offer",
                        "feedback_request",
                        "problem_resolution",
                    ]),
                    short_term: strings(&[
                        "simple_loyalty_program",
                        "basic_recommendations",
                        "regular_communication",
                        "helpful_resources",
                    ]),
                    long_term: strings(&[
                        "community_building",
                        "value_education",
                        "trust_building",
                        "referral_program",
                    ]),
                },
                insights: ChurnInsightTexts {
                    reasons: ChurnReasonTexts {
                        price_sensitivity: "Small business customer is price-conscious".to_owned(),
                        lack_of_engagement: "Small business customer needs more support"
                            .to_owned(),
                        poor_experience: "Small business customer may have had issues".to_owned(),
                        competitor_switch:
                            "Small business customer may be exploring alternatives".to_owned(),
                        seasonal_pattern: "Small business customer follows business cycles"
                            .to_owned(),
                        life_change: "Small business customer circumstances may have changed"
                            .to_owned(),
                    },
                    difficulty: ChurnDifficultyTexts {
                        easy:
                            "Small business customer likely to respond to simple retention efforts"
                                .to_owned(),
                        medium: "Small business customer needs personalized attention".to_owned(),
                        hard: "Small business customer may require significant retention effort"
                            .to_owned(),
                    },
                },
            },
            _ => Self {
                risk_factors: RiskFactorLadders {
                    inactivity: StepLadder::new(
                        vec![30.0, 60.0, 90.0, 180.0, 365.0],
                        vec![0.1, 0.2, 0.3, 0.5, 0.8],
                    ),
                    order_frequency: StepLadder::new(
                        vec![1.0, 2.0, 3.0, 5.0, 10.0],
                        vec![0.4, 0.3, 0.2, 0.1, 0.05],
                    ),
                    order_value: StepLadder::new(
                        vec![100.0, 500.0, 1000.0, 5000.0, 10_000.0],
                        vec![0.3, 0.2, 0.15, 0.1, 0.05],
                    ),
                    engagement: StepLadder::new(
                        vec![0.2, 0.4, 0.6, 0.8, 1.0],
                        vec![0.8, 0.6, 0.4, 0.2, 0.1],
                    ),
                },
                risk_levels: default_risk_levels(),
                retention_strategies: RetentionStrategyLists {
                    immediate: strings(&[
                        "personal_contact",
                        "special_offer",
                        "account_review",
                        "feedback_survey",
                    ]),
                    short_term: strings(&[
                        "loyalty_program",
                        "product_recommendations",
                        "exclusive_access",
                        "early_bird_offers",
                    ]),
                    long_term: strings(&[
                        "relationship_building",
                        "value_proposition",
                        "community_engagement",
                        "referral_program",
                    ]),
                },
                insights: ChurnInsightTexts {
                    reasons: ChurnReasonTexts {
                        price_sensitivity:
                            "Customer shows signs of price sensitivity and may be comparing with competitors"
                                .to_owned(),
                        lack_of_engagement:
                            "Customer has low engagement with brand communications and promotions"
                                .to_owned(),
                        poor_experience:
                            "Customer may have had negative experiences with products or service"
                                .to_owned(),
                        competitor_switch:
                            "Customer behavior suggests they may be exploring competitor offerings"
                                .to_owned(),
                        seasonal_pattern: "Customer follows seasonal purchasing patterns"
                            .to_owned(),
                        life_change:
                            "Customer behavior change may indicate life circumstances have changed"
                                .to_owned(),
                    },
                    difficulty: ChurnDifficultyTexts {
                        easy: "High probability of retention with targeted engagement".to_owned(),
                        medium:
                            "Moderate effort required for retention, focus on value proposition"
                                .to_owned(),
                        hard:
                            "Low probability of retention, may require aggressive win-back strategies"
                                .to_owned(),
                    },
                },
            },
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        self.risk_factors.inactivity.validate("churn.inactivity")?;
        self.risk_factors.order_frequency.validate("churn.orderFrequency")?;
        self.risk_factors.order_value.validate("churn.orderValue")?;
        self.risk_factors.engagement.validate("churn.engagement")?;
        self.risk_levels.high.validate("churn.riskLevels.high")?;
        self.risk_levels.medium.validate("churn.riskLevels.medium")?;
        self.risk_levels.low.validate("churn.riskLevels.low")?;
        Ok(())
    }
}
