use serde::{Deserialize, Serialize};

use super::{ProfileError, ScoreBand, StepLadder};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialProfile {
    pub scoring: PotentialScoring,
    pub interest_levels: InterestLevelBands,
    pub marketing_insights: MarketingInsightTexts,
    pub sales_intelligence: SalesIntelligenceBands,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialScoring {
    pub purchase_frequency: StepLadder,
    pub total_spent: StepLadder,
    pub recency: StepLadder,
    pub diversity: DiversityLadder,
}

/// Diversity scores when BOTH the category and the brand count reach a
/// rung, taking the highest rung both sides reach.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiversityLadder {
    pub category_thresholds: Vec<f64>,
    pub brand_thresholds: Vec<f64>,
    pub weights: Vec<f64>,
}

impl DiversityLadder {
    pub fn weight_for(&self, categories: f64, brands: f64) -> Option<f64> {
        for idx in (0..self.weights.len()).rev() {
            let category_ok =
                self.category_thresholds.get(idx).is_some_and(|threshold| categories >= *threshold);
            let brand_ok =
                self.brand_thresholds.get(idx).is_some_and(|threshold| brands >= *threshold);
            if category_ok && brand_ok {
                return self.weights.get(idx).copied();
            }
        }
        None
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ProfileError> {
        StepLadder::new(self.category_thresholds.clone(), self.weights.clone()).validate(field)?;
        StepLadder::new(self.brand_thresholds.clone(), self.weights.clone()).validate(field)?;
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterestLevelBands {
    pub high: ScoreBand,
    pub medium: ScoreBand,
    pub low: ScoreBand,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketingInsightTexts {
    pub segments: SegmentTexts,
    pub channels: ChannelTexts,
    pub timing: TimingTexts,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SegmentTexts {
    pub tech_enthusiasts: String,
    pub value_seekers: String,
    pub premium_buyers: String,
    pub casual_shoppers: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChannelTexts {
    pub email: String,
    pub social_media: String,
    pub sms: String,
    pub push_notifications: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimingTexts {
    pub weekend_mornings: String,
    pub weekday_evenings: String,
    pub lunch_breaks: String,
    pub late_night: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesIntelligenceBands {
    pub lead_scoring: InterestLevelBands,
    pub conversion_probability: InterestLevelBands,
}

fn default_interest_levels() -> InterestLevelBands {
    InterestLevelBands {
        high: ScoreBand::new(7.0, 10.0),
        medium: ScoreBand::new(4.0, 6.0),
        low: ScoreBand::new(1.0, 3.0),
    }
}

fn default_sales_intelligence() -> SalesIntelligenceBands {
    SalesIntelligenceBands {
        lead_scoring: InterestLevelBands {
            high: ScoreBand::new(8.0, 10.0),
            medium: ScoreBand::new(5.0, 7.0),
            low: ScoreBand::new(1.0, 4.0),
        },
        conversion_probability: InterestLevelBands {
            high: ScoreBand::new(0.7, 1.0),
            medium: ScoreBand::new(0.4, 0.69),
            low: ScoreBand::new(0.0, 0.39),
        },
    }
}

impl PotentialProfile {
    pub fn builtin(business_type: &str) -> Self {
        match business_type.trim().to_ascii_lowercase().as_str() {
            "high_value" | "high_value_business" => Self {
                scoring: PotentialScoring {
                    purchase_frequency: StepLadder::new(
                        vec![2.0, 5.0, 10.0, 20.0, 50.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    total_spent: StepLadder::new(
                        vec![1000.0, 5000.0, 10_000.0, 50_000.0, 100_000.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    recency: StepLadder::new(
                        vec![15.0, 30.0, 60.0, 120.0, 180.0],
                        vec![5.0, 4.0, 3.0, 2.0, 1.0],
                    ),
                    diversity: DiversityLadder {
                        category_thresholds: vec![2.0, 3.0, 5.0, 10.0, 20.0],
                        brand_thresholds: vec![2.0, 3.0, 5.0, 10.0, 20.0],
                        weights: vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    },
                },
                interest_levels: default_interest_levels(),
                marketing_insights: MarketingInsightTexts {
                    segments: SegmentTexts {
                        tech_enthusiasts:
                            "VIP customers with high technology spending and premium preferences"
                                .to_owned(),
                        value_seekers:
                            "High-value customers who focus on quality and features over price"
                                .to_owned(),
                        premium_buyers:
                            "Luxury customers who prefer exclusive and high-end products"
                                .to_owned(),
                        casual_shoppers:
                            "Affluent customers with diverse interests and occasional purchases"
                                .to_owned(),
                    },
                    channels: ChannelTexts {
                        email: "Premium email campaigns with exclusive content and early access"
                            .to_owned(),
                        social_media: "Luxury brand positioning and influencer partnerships"
                            .to_owned(),
                        sms: "VIP notifications and exclusive offers".to_owned(),
                        push_notifications:
                            "Premium app experience with personalized content".to_owned(),
                    },
                    timing: TimingTexts {
                        weekend_mornings: "Luxury shopping experience and exclusive events"
                            .to_owned(),
                        weekday_evenings: "After-hours VIP shopping and consultations".to_owned(),
                        lunch_breaks: "Executive shopping and business solutions".to_owned(),
                        late_night: "Premium mobile experience and exclusive access".to_owned(),
                    },
                },
                sales_intelligence: default_sales_intelligence(),
            },
            "small_business" | "small_business_config" => Self {
                scoring: PotentialScoring {
                    purchase_frequency: StepLadder::new(
                        vec![1.0, 2.0, 3.0, 5.0, 10.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    total_spent: StepLadder::new(
                        vec![50.0, 200.0, 500.0, 1000.0, 5000.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    recency: StepLadder::new(
                        vec![60.0, 120.0, 180.0, 365.0, 730.0],
                        vec![5.0, 4.0, 3.0, 2.0, 1.0],
                    ),
                    diversity: DiversityLadder {
                        category_thresholds: vec![1.0, 2.0, 3.0, 5.0, 10.0],
                        brand_thresholds: vec![1.0, 2.0, 3.0, 5.0, 10.0],
                        weights: vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    },
                },
                interest_levels: default_interest_levels(),
                marketing_insights: MarketingInsightTexts {
                    segments: SegmentTexts {
                        tech_enthusiasts:
                            "Small business customers interested in technology solutions"
                                .to_owned(),
                        value_seekers:
                            "Budget-conscious customers looking for affordable options".to_owned(),
                        premium_buyers:
                            "Small business owners willing to invest in quality".to_owned(),
                        casual_shoppers:
                            "Local customers with occasional technology needs".to_owned(),
                    },
                    channels: ChannelTexts {
                        email: "Simple email campaigns with clear value propositions".to_owned(),
                        social_media: "Local community engagement and word-of-mouth".to_owned(),
                        sms: "Simple notifications and local offers".to_owned(),
                        push_notifications: "Basic app functionality and local updates".to_owned(),
                    },
                    timing: TimingTexts {
                        weekend_mornings: "Local business hours and community events".to_owned(),
                        weekday_evenings:
                            "After-work local shopping and consultations".to_owned(),
                        lunch_breaks:
                            "Local business networking and quick purchases".to_owned(),
                        late_night: "Online research and mobile browsing".to_owned(),
                    },
                },
                sales_intelligence: default_sales_intelligence(),
            },
            _ => Self {
                scoring: PotentialScoring {
                    purchase_frequency: StepLadder::new(
                        vec![1.0, 3.0, 5.0, 10.0, 20.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    total_spent: StepLadder::new(
                        vec![100.0, 500.0, 1000.0, 5000.0, 10_000.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    recency: StepLadder::new(
                        vec![30.0, 60.0, 90.0, 180.0, 365.0],
                        vec![5.0, 4.0, 3.0, 2.0, 1.0],
                    ),
                    diversity: DiversityLadder {
                        category_thresholds: vec![1.0, 2.0, 3.0, 5.0, 10.0],
                        brand_thresholds: vec![1.0, 2.0, 3.0, 5.0, 10.0],
                        weights: vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    },
                },
                interest_levels: default_interest_levels(),
                marketing_insights: MarketingInsightTexts {
                    segments: SegmentTexts {
                        tech_enthusiasts:
                            "Customers who frequently purchase technology products and show high engagement with tech categories"
                                .to_owned(),
                        value_seekers:
                            "Customers who focus on price-performance ratio and look for deals"
                                .to_owned(),
                        premium_buyers:
                            "Customers who prefer high-end products and are less price-sensitive"
                                .to_owned(),
                        casual_shoppers:
                            "Customers with occasional purchases and varied interests".to_owned(),
                    },
                    channels: ChannelTexts {
                        email:
                            "Most effective for detailed product information and personalized offers"
                                .to_owned(),
                        social_media: "Best for brand awareness and product discovery".to_owned(),
                        sms: "Effective for time-sensitive offers and quick updates".to_owned(),
                        push_notifications:
                            "Good for app users and immediate engagement".to_owned(),
                    },
                    timing: TimingTexts {
                        weekend_mornings:
                            "Optimal for leisurely browsing and major purchases".to_owned(),
                        weekday_evenings:
                            "Good for after-work shopping and research".to_owned(),
                        lunch_breaks:
                            "Effective for quick purchases and mobile shopping".to_owned(),
                        late_night:
                            "Suitable for impulse purchases and mobile users".to_owned(),
                    },
                },
                sales_intelligence: default_sales_intelligence(),
            },
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        self.scoring.purchase_frequency.validate("potential.purchaseFrequency")?;
        self.scoring.total_spent.validate("potential.totalSpent")?;
        self.scoring.recency.validate("potential.recency")?;
        self.scoring.diversity.validate("potential.diversity")?;
        self.interest_levels.high.validate("potential.interestLevels.high")?;
        self.interest_levels.medium.validate("potential.interestLevels.medium")?;
        self.interest_levels.low.validate("potential.interestLevels.low")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PotentialProfile;

    #[test]
    fn builtins_validate() {
        for business_type in ["default", "high_value", "small_business"] {
            PotentialProfile::builtin(business_type)
                .validate()
                .unwrap_or_else(|err| panic!("{business_type}: {err}"));
        }
    }

    #[test]
    fn diversity_weight_requires_both_dimensions() {
        let profile = PotentialProfile::builtin("default");
        let diversity = &profile.scoring.diversity;

        assert_eq!(diversity.weight_for(10.0, 10.0), Some(5.0));
        // Brand side only reaches the second rung.
        assert_eq!(diversity.weight_for(10.0, 2.0), Some(2.0));
        assert_eq!(diversity.weight_for(0.0, 5.0), None);
    }
}
