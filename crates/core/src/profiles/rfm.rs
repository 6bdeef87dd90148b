use serde::{Deserialize, Serialize};

use super::{GradedLadder, ProfileError, ScoreBand};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmProfile {
    pub scoring: RfmScoring,
    pub segments: RfmBands,
    pub insights: RfmInsights,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmScoring {
    pub recency: GradedLadder,
    pub frequency: GradedLadder,
    pub monetary: GradedLadder,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmBands {
    pub champions: ScoreBand,
    pub loyal: ScoreBand,
    pub at_risk: ScoreBand,
    pub cant_lose: ScoreBand,
    pub lost: ScoreBand,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmInsights {
    pub recency: InsightTexts,
    pub frequency: InsightTexts,
    pub monetary: InsightTexts,
}

/// Per-dimension commentary keyed by score bucket (5 down to 1).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightTexts {
    pub excellent: String,
    pub good: String,
    pub average: String,
    pub poor: String,
    pub critical: String,
}

impl InsightTexts {
    fn new(
        excellent: &str,
        good: &str,
        average: &str,
        poor: &str,
        critical: &str,
    ) -> Self {
        Self {
            excellent: excellent.to_owned(),
            good: good.to_owned(),
            average: average.to_owned(),
            poor: poor.to_owned(),
            critical: critical.to_owned(),
        }
    }

    pub fn for_score(&self, score: f64) -> &str {
        if score >= 5.0 {
            &self.excellent
        } else if score >= 4.0 {
            &self.good
        } else if score >= 3.0 {
            &self.average
        } else if score >= 2.0 {
            &self.poor
        } else {
            &self.critical
        }
    }
}

fn default_bands() -> RfmBands {
    RfmBands {
        champions: ScoreBand::new(13.0, 15.0),
        loyal: ScoreBand::new(11.0, 12.0),
        at_risk: ScoreBand::new(8.0, 10.0),
        cant_lose: ScoreBand::new(6.0, 7.0),
        lost: ScoreBand::new(3.0, 5.0),
    }
}

impl RfmProfile {
    pub fn builtin(business_type: &str) -> Self {
        match business_type.trim().to_ascii_lowercase().as_str() {
            "high_value" | "high_value_business" => Self {
                scoring: RfmScoring {
                    recency: GradedLadder::new(
                        vec![15.0, 30.0, 60.0, 120.0],
                        vec![5.0, 4.0, 3.0, 2.0, 1.0],
                    ),
                    frequency: GradedLadder::new(
                        vec![5.0, 10.0, 20.0, 50.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    monetary: GradedLadder::new(
                        vec![2000.0, 10_000.0, 50_000.0, 200_000.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                },
                segments: default_bands(),
                insights: RfmInsights {
                    recency: InsightTexts::new(
                        "VIP customer purchased very recently (within 15 days)",
                        "VIP customer purchased recently (within 30 days)",
                        "VIP customer purchased within 60 days",
                        "VIP customer purchased within 120 days",
                        "VIP customer hasn't purchased for over 120 days",
                    ),
                    frequency: InsightTexts::new(
                        "VIP customer orders very frequently (50+ orders)",
                        "VIP customer orders frequently (20-49 orders)",
                        "VIP customer orders moderately (10-19 orders)",
                        "VIP customer orders occasionally (5-9 orders)",
                        "VIP customer has only 1-4 orders",
                    ),
                    monetary: InsightTexts::new(
                        "VIP customer spends very high amounts ($200K+)",
                        "VIP customer spends high amounts ($50K-$200K)",
                        "VIP customer spends moderate amounts ($10K-$50K)",
                        "VIP customer spends low amounts ($2K-$10K)",
                        "VIP customer spends very low amounts (<$2K)",
                    ),
                },
            },
            "small_business" | "small_business_config" => Self {
                scoring: RfmScoring {
                    recency: GradedLadder::new(
                        vec![60.0, 120.0, 180.0, 365.0],
                        vec![5.0, 4.0, 3.0, 2.0, 1.0],
                    ),
                    frequency: GradedLadder::new(
                        vec![1.0, 2.0, 3.0, 5.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    monetary: GradedLadder::new(
                        vec![100.0, 500.0, 1000.0, 5000.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                },
                segments: default_bands(),
                insights: RfmInsights {
                    recency: InsightTexts::new(
                        "Small business customer purchased very recently (within 60 days)",
                        "Small business customer purchased recently (within 120 days)",
                        "Small business customer purchased within 180 days",
                        "Small business customer purchased within 365 days",
                        "Small business customer hasn't purchased for over 365 days",
                    ),
                    frequency: InsightTexts::new(
                        "Small business customer orders very frequently (5+ orders)",
                        "Small business customer orders frequently (3-4 orders)",
                        "Small business customer orders moderately (2 orders)",
                        "Small business customer orders occasionally (1 order)",
                        "Small business customer has no orders",
                    ),
                    monetary: InsightTexts::new(
                        "Small business customer spends very high amounts ($5K+)",
                        "Small business customer spends high amounts ($1K-$5K)",
                        "Small business customer spends moderate amounts ($500-$1K)",
                        "Small business customer spends low amounts ($100-$500)",
                        "Small business customer spends very low amounts (<$100)",
                    ),
                },
            },
            _ => Self {
                scoring: RfmScoring {
                    recency: GradedLadder::new(
                        vec![30.0, 60.0, 90.0, 180.0],
                        vec![5.0, 4.0, 3.0, 2.0, 1.0],
                    ),
                    frequency: GradedLadder::new(
                        vec![2.0, 3.0, 5.0, 10.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                    monetary: GradedLadder::new(
                        vec![500.0, 2000.0, 10_000.0, 50_000.0],
                        vec![1.0, 2.0, 3.0, 4.0, 5.0],
                    ),
                },
                segments: default_bands(),
                insights: RfmInsights {
                    recency: InsightTexts::new(
                        "Customer purchased very recently (within 30 days)",
                        "Customer purchased recently (within 60 days)",
                        "Customer purchased within 90 days",
                        "Customer purchased within 180 days",
                        "Customer hasn't purchased for over 180 days",
                    ),
                    frequency: InsightTexts::new(
                        "Customer orders very frequently (10+ orders)",
                        "Customer orders frequently (5-9 orders)",
                        "Customer orders moderately (3-4 orders)",
                        "Customer orders occasionally (2 orders)",
                        "Customer has only 1 order",
                    ),
                    monetary: InsightTexts::new(
                        "Customer spends very high amounts ($50K+)",
                        "Customer spends high amounts ($10K-$50K)",
                        "Customer spends moderate amounts ($2K-$10K)",
                        "Customer spends low amounts ($500-$2K)",
                        "Customer spends very low amounts (<$500)",
                    ),
                },
            },
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        self.scoring.recency.validate("rfm.recency")?;
        self.scoring.frequency.validate("rfm.frequency")?;
        self.scoring.monetary.validate("rfm.monetary")?;
        self.segments.champions.validate("rfm.segments.champions")?;
        self.segments.loyal.validate("rfm.segments.loyal")?;
        self.segments.at_risk.validate("rfm.segments.atRisk")?;
        self.segments.cant_lose.validate("rfm.segments.cantLose")?;
        self.segments.lost.validate("rfm.segments.lost")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::RfmProfile;

    #[test]
    fn builtins_validate() {
        for business_type in ["default", "high_value", "small_business", "unknown"] {
            RfmProfile::builtin(business_type)
                .validate()
                .unwrap_or_else(|err| panic!("{business_type}: {err}"));
        }
    }

    #[test]
    fn insight_text_tracks_score_bucket() {
        let profile = RfmProfile::builtin("default");
        assert!(profile.insights.recency.for_score(5.0).contains("within 30 days"));
        assert!(profile.insights.monetary.for_score(1.0).contains("very low"));
    }

    #[test]
    fn override_shape_round_trips_through_json() {
        let profile = RfmProfile::builtin("default");
        let raw = serde_json::to_string(&profile).unwrap();
        let decoded: RfmProfile = serde_json::from_str(&raw).unwrap();
        assert_eq!(decoded, profile);
    }
}
