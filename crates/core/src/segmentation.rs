//! Lifecycle segmentation: whale / vip / regular / new / churn.

use serde::{Deserialize, Serialize};

use crate::profiles::SegmentationProfile;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Segment {
    Whale,
    Vip,
    Regular,
    New,
    Churn,
}

impl Segment {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Whale => "whale",
            Self::Vip => "vip",
            Self::Regular => "regular",
            Self::New => "new",
            Self::Churn => "churn",
        }
    }
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SegmentInputs {
    pub total_spent: f64,
    pub total_orders: i64,
    pub avg_order_value: f64,
    pub days_since_last_order: i64,
}

/// Rules fire in a fixed order: the churn window trumps everything,
/// then whale, vip and regular thresholds, with `new` as the default.
/// A customer without orders is always `new`.
pub fn classify(inputs: SegmentInputs, profile: &SegmentationProfile) -> Segment {
    if inputs.total_orders == 0 {
        return Segment::New;
    }

    if inputs.days_since_last_order > profile.churn.max_days_since_last_order {
        return Segment::Churn;
    }

    if inputs.total_spent >= profile.whale.min_total_spent
        && inputs.total_orders >= profile.whale.min_orders
        && inputs.avg_order_value >= profile.whale.min_avg_order_value
    {
        return Segment::Whale;
    }

    if inputs.total_spent >= profile.vip.min_total_spent
        && inputs.total_spent <= profile.vip.max_total_spent
        && inputs.total_orders >= profile.vip.min_orders
        && inputs.avg_order_value >= profile.vip.min_avg_order_value
    {
        return Segment::Vip;
    }

    if inputs.total_spent >= profile.regular.min_total_spent
        && inputs.total_spent < profile.regular.max_total_spent
        && inputs.total_orders >= profile.regular.min_orders
    {
        return Segment::Regular;
    }

    Segment::New
}
