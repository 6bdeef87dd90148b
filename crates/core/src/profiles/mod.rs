//! Typed per-engine configuration profiles.
//!
//! Each engine reads a profile resolved by [`ConfigProvider`]: a stored
//! JSON override when one exists for the (kind, business type) pair,
//! otherwise a compiled-in builtin. Overrides are validated before use
//! and fall back to the builtin when malformed.

mod churn;
mod potential;
mod provider;
mod recommendation;
mod rfm;
mod segmentation;

pub use churn::{
    ChurnDifficultyTexts, ChurnInsightTexts, ChurnProfile, ChurnReasonTexts, RetentionStrategyLists,
};
pub use potential::{DiversityLadder, InterestLevelBands, PotentialProfile};
pub use provider::{ConfigProvider, ProfileKind};
pub use recommendation::{
    AlgorithmWeights, RecommendationLimits, RecommendationProfile, SeasonalFactors, SegmentAmounts,
};
pub use rfm::{InsightTexts, RfmProfile};
pub use segmentation::SegmentationProfile;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq)]
pub enum ProfileError {
    #[error("`{field}` ladder must not be empty")]
    EmptyLadder { field: &'static str },
    #[error("`{field}` ladder thresholds must be strictly ascending")]
    UnorderedThresholds { field: &'static str },
    #[error("`{field}` ladder expects {expected} weights, found {found}")]
    WeightArity { field: &'static str, expected: usize, found: usize },
    #[error("`{field}` is out of range: {message}")]
    OutOfRange { field: &'static str, message: String },
}

/// Ladder with one more weight than thresholds, so every value lands on
/// a rung. Used by the RFM scoring dimensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GradedLadder {
    pub thresholds: Vec<f64>,
    pub weights: Vec<f64>,
}

impl GradedLadder {
    pub fn new(thresholds: Vec<f64>, weights: Vec<f64>) -> Self {
        Self { thresholds, weights }
    }

    /// Lower values score into earlier rungs: the first threshold at or
    /// above `value` selects its weight, values past the last threshold
    /// take the final weight. Fits recency-style "fresher is better"
    /// ladders whose weights descend.
    pub fn score_low_is_better(&self, value: f64) -> f64 {
        for (threshold, weight) in self.thresholds.iter().zip(&self.weights) {
            if value <= *threshold {
                return *weight;
            }
        }
        self.weights.last().copied().unwrap_or_default()
    }

    /// Higher values score into later rungs: the largest threshold at
    /// or below `value` selects the weight one past it, values under
    /// the first threshold take the first weight.
    pub fn score_high_is_better(&self, value: f64) -> f64 {
        for idx in (0..self.thresholds.len()).rev() {
            if value >= self.thresholds[idx] {
                return self.weights.get(idx + 1).copied().unwrap_or_default();
            }
        }
        self.weights.first().copied().unwrap_or_default()
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ProfileError> {
        validate_thresholds(field, &self.thresholds)?;
        if self.weights.len() != self.thresholds.len() + 1 {
            return Err(ProfileError::WeightArity {
                field,
                expected: self.thresholds.len() + 1,
                found: self.weights.len(),
            });
        }
        Ok(())
    }
}

/// Ladder with threshold/weight pairs and no implicit rung: values that
/// match no threshold yield `None` and the caller picks the floor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepLadder {
    pub thresholds: Vec<f64>,
    pub weights: Vec<f64>,
}

impl StepLadder {
    pub fn new(thresholds: Vec<f64>, weights: Vec<f64>) -> Self {
        Self { thresholds, weights }
    }

    /// Weight of the largest threshold at or below `value`.
    pub fn weight_at_or_above(&self, value: f64) -> Option<f64> {
        for idx in (0..self.thresholds.len()).rev() {
            if value >= self.thresholds[idx] {
                return self.weights.get(idx).copied();
            }
        }
        None
    }

    /// Weight of the smallest threshold at or above `value`.
    pub fn weight_at_or_below(&self, value: f64) -> Option<f64> {
        for (threshold, weight) in self.thresholds.iter().zip(&self.weights) {
            if value <= *threshold {
                return Some(*weight);
            }
        }
        None
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ProfileError> {
        validate_thresholds(field, &self.thresholds)?;
        if self.weights.len() != self.thresholds.len() {
            return Err(ProfileError::WeightArity {
                field,
                expected: self.thresholds.len(),
                found: self.weights.len(),
            });
        }
        Ok(())
    }
}

fn validate_thresholds(field: &'static str, thresholds: &[f64]) -> Result<(), ProfileError> {
    if thresholds.is_empty() {
        return Err(ProfileError::EmptyLadder { field });
    }
    if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
        return Err(ProfileError::UnorderedThresholds { field });
    }
    Ok(())
}

/// Inclusive score band, e.g. champions at 13..=15.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBand {
    pub min_score: f64,
    pub max_score: f64,
}

impl ScoreBand {
    pub fn new(min_score: f64, max_score: f64) -> Self {
        Self { min_score, max_score }
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min_score && score <= self.max_score
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ProfileError> {
        if self.min_score > self.max_score {
            return Err(ProfileError::OutOfRange {
                field,
                message: format!("min {} exceeds max {}", self.min_score, self.max_score),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graded_ladder_scores_recency_style_values() {
        let ladder =
            GradedLadder::new(vec![30.0, 60.0, 90.0, 180.0], vec![5.0, 4.0, 3.0, 2.0, 1.0]);

        assert_eq!(ladder.score_low_is_better(20.0), 5.0);
        assert_eq!(ladder.score_low_is_better(60.0), 4.0);
        assert_eq!(ladder.score_low_is_better(400.0), 1.0);
    }

    #[test]
    fn graded_ladder_scores_frequency_style_values() {
        let ladder = GradedLadder::new(vec![2.0, 3.0, 5.0, 10.0], vec![1.0, 2.0, 3.0, 4.0, 5.0]);

        assert_eq!(ladder.score_high_is_better(0.0), 1.0);
        assert_eq!(ladder.score_high_is_better(2.0), 2.0);
        assert_eq!(ladder.score_high_is_better(4.0), 3.0);
        assert_eq!(ladder.score_high_is_better(12.0), 5.0);
    }

    #[test]
    fn step_ladder_returns_none_below_floor() {
        let ladder = StepLadder::new(
            vec![30.0, 60.0, 90.0, 180.0, 365.0],
            vec![0.1, 0.2, 0.3, 0.5, 0.8],
        );

        assert_eq!(ladder.weight_at_or_above(10.0), None);
        assert_eq!(ladder.weight_at_or_above(60.0), Some(0.2));
        assert_eq!(ladder.weight_at_or_above(1000.0), Some(0.8));
    }

    #[test]
    fn step_ladder_first_match_ascending() {
        let ladder =
            StepLadder::new(vec![1.0, 2.0, 3.0, 5.0, 10.0], vec![0.4, 0.3, 0.2, 0.1, 0.05]);

        assert_eq!(ladder.weight_at_or_below(1.0), Some(0.4));
        assert_eq!(ladder.weight_at_or_below(4.0), Some(0.1));
        assert_eq!(ladder.weight_at_or_below(25.0), None);
    }

    #[test]
    fn validation_rejects_bad_ladders() {
        let unordered = GradedLadder::new(vec![30.0, 30.0], vec![3.0, 2.0, 1.0]);
        assert!(matches!(
            unordered.validate("recency"),
            Err(ProfileError::UnorderedThresholds { field: "recency" })
        ));

        let short = StepLadder::new(vec![1.0, 2.0], vec![0.5]);
        assert!(matches!(
            short.validate("inactivity"),
            Err(ProfileError::WeightArity { expected: 2, found: 1, .. })
        ));

        let empty = StepLadder::new(vec![], vec![]);
        assert!(matches!(
            empty.validate("engagement"),
            Err(ProfileError::EmptyLadder { .. })
        ));
    }

    #[test]
    fn score_band_bounds_are_inclusive() {
        let band = ScoreBand::new(13.0, 15.0);
        assert!(band.contains(13.0));
        assert!(band.contains(15.0));
        assert!(!band.contains(12.99));
    }
}
