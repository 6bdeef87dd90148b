//! RFM scoring: recency / frequency / monetary ladders, band segment,
//! insight text, and next-step recommendations.

use serde::{Deserialize, Serialize};

use crate::profiles::RfmProfile;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmScore {
    pub recency_score: f64,
    pub frequency_score: f64,
    pub monetary_score: f64,
    pub rfm_score: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfmSegment {
    Champions,
    Loyal,
    AtRisk,
    CantLose,
    Lost,
    /// Score fell outside every configured band. Only reachable with
    /// override bands that leave gaps.
    Unclassified,
}

impl RfmSegment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Champions => "champions",
            Self::Loyal => "loyal",
            Self::AtRisk => "at_risk",
            Self::CantLose => "cant_lose",
            Self::Lost => "lost",
            Self::Unclassified => "unclassified",
        }
    }
}

impl std::fmt::Display for RfmSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmInsightSet {
    pub recency_insight: String,
    pub frequency_insight: String,
    pub monetary_insight: String,
    pub overall_insight: String,
}

/// Score the three dimensions. `recency_days` runs the fresher-is-better
/// ladder; frequency and monetary run the bigger-is-better ladders.
pub fn score(recency_days: f64, frequency: f64, monetary: f64, profile: &RfmProfile) -> RfmScore {
    let recency_score = profile.scoring.recency.score_low_is_better(recency_days);
    let frequency_score = profile.scoring.frequency.score_high_is_better(frequency);
    let monetary_score = profile.scoring.monetary.score_high_is_better(monetary);

    RfmScore {
        recency_score,
        frequency_score,
        monetary_score,
        rfm_score: recency_score + frequency_score + monetary_score,
    }
}

pub fn segment(rfm_score: f64, profile: &RfmProfile) -> RfmSegment {
    let bands = &profile.segments;
    if bands.champions.contains(rfm_score) {
        RfmSegment::Champions
    } else if bands.loyal.contains(rfm_score) {
        RfmSegment::Loyal
    } else if bands.at_risk.contains(rfm_score) {
        RfmSegment::AtRisk
    } else if bands.cant_lose.contains(rfm_score) {
        RfmSegment::CantLose
    } else if bands.lost.contains(rfm_score) {
        RfmSegment::Lost
    } else {
        RfmSegment::Unclassified
    }
}

pub fn insights(score: &RfmScore, profile: &RfmProfile) -> RfmInsightSet {
    let overall = if score.rfm_score >= 13.0 {
        "High-value customer with excellent engagement across all metrics"
    } else if score.rfm_score >= 11.0 {
        "Loyal customer with good engagement patterns"
    } else if score.rfm_score >= 8.0 {
        "Customer showing signs of declining engagement"
    } else if score.rfm_score >= 6.0 {
        "Customer at risk of churning, needs immediate attention"
    } else {
        "Customer has disengaged and may be lost"
    };

    RfmInsightSet {
        recency_insight: profile.insights.recency.for_score(score.recency_score).to_owned(),
        frequency_insight: profile.insights.frequency.for_score(score.frequency_score).to_owned(),
        monetary_insight: profile.insights.monetary.for_score(score.monetary_score).to_owned(),
        overall_insight: overall.to_owned(),
    }
}

/// Segment playbook plus weak-dimension nudges, capped at three.
pub fn recommendations(segment: RfmSegment, score: &RfmScore) -> Vec<String> {
    let mut recommendations: Vec<String> = Vec::new();
    let base: &[&str] = match segment {
        RfmSegment::Champions => &[
            "Exclusive VIP treatment and early access to new products",
            "Personalized premium service and dedicated account manager",
            "Referral program incentives and loyalty rewards",
        ],
        RfmSegment::Loyal => &[
            "Cross-selling opportunities and product recommendations",
            "Loyalty program enrollment and tier benefits",
            "Regular engagement campaigns and personalized offers",
        ],
        RfmSegment::AtRisk => &[
            "Re-engagement campaigns with special offers",
            "Customer feedback surveys to understand concerns",
            "Win-back campaigns with personalized incentives",
        ],
        RfmSegment::CantLose => &[
            "Immediate contact to understand their needs",
            "Special retention offers and personalized service",
            "Account review and relationship building",
        ],
        RfmSegment::Lost => &[
            "Win-back campaigns with aggressive offers",
            "Customer feedback to understand churn reasons",
            "Reactivation campaigns with new product introductions",
        ],
        RfmSegment::Unclassified => &[],
    };
    recommendations.extend(base.iter().map(|text| (*text).to_owned()));

    if score.recency_score <= 2.0 {
        recommendations.push("Send re-engagement email campaigns".to_owned());
    }
    if score.frequency_score <= 2.0 {
        recommendations.push("Implement frequency-based loyalty programs".to_owned());
    }
    if score.monetary_score <= 2.0 {
        recommendations.push("Upselling campaigns to higher-value products".to_owned());
    }

    recommendations.truncate(3);
    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::{RfmProfile, ScoreBand};

    fn profile() -> RfmProfile {
        RfmProfile::builtin("default")
    }

    #[test]
    fn fresh_frequent_big_spender_is_a_champion() {
        let score = score(20.0, 12.0, 60_000.0, &profile());
        assert_eq!(score.recency_score, 5.0);
        assert_eq!(score.frequency_score, 5.0);
        assert_eq!(score.monetary_score, 5.0);
        assert_eq!(score.rfm_score, 15.0);
        assert_eq!(segment(score.rfm_score, &profile()), RfmSegment::Champions);
    }

    #[test]
    fn stale_single_order_customer_bottoms_out() {
        let score = score(400.0, 1.0, 100.0, &profile());
        assert_eq!(score.rfm_score, 3.0);
        assert_eq!(segment(score.rfm_score, &profile()), RfmSegment::Lost);
    }

    #[test]
    fn band_gaps_yield_unclassified() {
        let mut gapped = profile();
        gapped.segments.lost = ScoreBand::new(3.0, 4.0);
        assert_eq!(segment(5.0, &gapped), RfmSegment::Unclassified);
    }

    #[test]
    fn insights_follow_the_score_buckets() {
        let score = score(45.0, 4.0, 3000.0, &profile());
        let insights = insights(&score, &profile());
        assert!(insights.recency_insight.contains("within 60 days"));
        assert!(insights.frequency_insight.contains("moderately"));
        assert!(insights.monetary_insight.contains("moderate amounts"));
        assert!(insights.overall_insight.contains("declining engagement"));
    }

    #[test]
    fn recommendations_cap_at_three_and_include_weak_dimension_nudges() {
        let weak = RfmScore {
            recency_score: 1.0,
            frequency_score: 1.0,
            monetary_score: 1.0,
            rfm_score: 3.0,
        };
        let list = recommendations(RfmSegment::Lost, &weak);
        assert_eq!(list.len(), 3);
        assert!(list[0].contains("Win-back"));

        let unclassified = recommendations(RfmSegment::Unclassified, &weak);
        assert_eq!(
            unclassified,
            vec![
                "Send re-engagement email campaigns".to_owned(),
                "Implement frequency-based loyalty programs".to_owned(),
                "Upselling campaigns to higher-value products".to_owned(),
            ]
        );
    }
}
