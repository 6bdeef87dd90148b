use serde::{Deserialize, Serialize};

use super::ProfileError;

/// Thresholds for lifecycle segmentation. Rules are evaluated in order:
/// churn window first, then whale, vip, regular, with `new` as the
/// catch-all.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentationProfile {
    pub whale: WhaleRule,
    pub vip: VipRule,
    pub regular: RegularRule,
    pub churn: ChurnWindow,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhaleRule {
    pub min_total_spent: f64,
    pub min_orders: i64,
    pub min_avg_order_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VipRule {
    pub min_total_spent: f64,
    pub max_total_spent: f64,
    pub min_orders: i64,
    pub min_avg_order_value: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegularRule {
    pub min_total_spent: f64,
    pub max_total_spent: f64,
    pub min_orders: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnWindow {
    pub max_days_since_last_order: i64,
}

impl SegmentationProfile {
    pub fn builtin(business_type: &str) -> Self {
        match business_type.trim().to_ascii_lowercase().as_str() {
            "high_value" | "luxury" | "premium" => Self {
                whale: WhaleRule {
                    min_total_spent: 1200.0,
                    min_orders: 10,
                    min_avg_order_value: 100.0,
                },
                vip: VipRule {
                    min_total_spent: 400.0,
                    max_total_spent: 1200.0,
                    min_orders: 6,
                    min_avg_order_value: 60.0,
                },
                regular: RegularRule {
                    min_total_spent: 120.0,
                    max_total_spent: 400.0,
                    min_orders: 4,
                },
                churn: ChurnWindow { max_days_since_last_order: 120 },
            },
            "high_frequency" | "grocery" | "daily" => Self {
                whale: WhaleRule {
                    min_total_spent: 320.0,
                    min_orders: 20,
                    min_avg_order_value: 12.0,
                },
                vip: VipRule {
                    min_total_spent: 120.0,
                    max_total_spent: 320.0,
                    min_orders: 12,
                    min_avg_order_value: 8.0,
                },
                regular: RegularRule {
                    min_total_spent: 32.0,
                    max_total_spent: 120.0,
                    min_orders: 6,
                },
                churn: ChurnWindow { max_days_since_last_order: 60 },
            },
            "small_business" | "startup" => Self {
                whale: WhaleRule {
                    min_total_spent: 200.0,
                    min_orders: 6,
                    min_avg_order_value: 32.0,
                },
                vip: VipRule {
                    min_total_spent: 80.0,
                    max_total_spent: 200.0,
                    min_orders: 4,
                    min_avg_order_value: 16.0,
                },
                regular: RegularRule {
                    min_total_spent: 20.0,
                    max_total_spent: 80.0,
                    min_orders: 2,
                },
                churn: ChurnWindow { max_days_since_last_order: 75 },
            },
            "electronics" | "tech" | "gadgets" => Self {
                whale: WhaleRule {
                    min_total_spent: 1000.0,
                    min_orders: 6,
                    min_avg_order_value: 120.0,
                },
                vip: VipRule {
                    min_total_spent: 320.0,
                    max_total_spent: 1000.0,
                    min_orders: 4,
                    min_avg_order_value: 60.0,
                },
                regular: RegularRule {
                    min_total_spent: 80.0,
                    max_total_spent: 320.0,
                    min_orders: 3,
                },
                churn: ChurnWindow { max_days_since_last_order: 105 },
            },
            "fashion" | "sports" | "clothing" => Self {
                whale: WhaleRule {
                    min_total_spent: 480.0,
                    min_orders: 10,
                    min_avg_order_value: 40.0,
                },
                vip: VipRule {
                    min_total_spent: 160.0,
                    max_total_spent: 480.0,
                    min_orders: 6,
                    min_avg_order_value: 24.0,
                },
                regular: RegularRule {
                    min_total_spent: 40.0,
                    max_total_spent: 160.0,
                    min_orders: 3,
                },
                churn: ChurnWindow { max_days_since_last_order: 90 },
            },
            _ => Self {
                whale: WhaleRule {
                    min_total_spent: 80_000.0,
                    min_orders: 15,
                    min_avg_order_value: 4000.0,
                },
                vip: VipRule {
                    min_total_spent: 40_000.0,
                    max_total_spent: 80_000.0,
                    min_orders: 10,
                    min_avg_order_value: 2000.0,
                },
                regular: RegularRule {
                    min_total_spent: 10_000.0,
                    max_total_spent: 40_000.0,
                    min_orders: 5,
                },
                churn: ChurnWindow { max_days_since_last_order: 500 },
            },
        }
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.vip.min_total_spent >= self.vip.max_total_spent {
            return Err(ProfileError::OutOfRange {
                field: "vip",
                message: "minTotalSpent must be below maxTotalSpent".to_owned(),
            });
        }
        if self.regular.min_total_spent >= self.regular.max_total_spent {
            return Err(ProfileError::OutOfRange {
                field: "regular",
                message: "minTotalSpent must be below maxTotalSpent".to_owned(),
            });
        }
        if self.churn.max_days_since_last_order <= 0 {
            return Err(ProfileError::OutOfRange {
                field: "churn",
                message: "maxDaysSinceLastOrder must be positive".to_owned(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SegmentationProfile;

    #[test]
    fn unknown_business_type_falls_back_to_default_thresholds() {
        let profile = SegmentationProfile::builtin("pet_supplies");
        assert_eq!(profile.whale.min_total_spent, 80_000.0);
        assert_eq!(profile.churn.max_days_since_last_order, 500);
    }

    #[test]
    fn business_type_aliases_resolve() {
        assert_eq!(
            SegmentationProfile::builtin("luxury"),
            SegmentationProfile::builtin("high_value")
        );
        assert_eq!(
            SegmentationProfile::builtin("TECH"),
            SegmentationProfile::builtin("electronics")
        );
    }

    #[test]
    fn builtins_validate() {
        for business_type in
            ["default", "high_value", "high_frequency", "small_business", "electronics", "fashion"]
        {
            SegmentationProfile::builtin(business_type)
                .validate()
                .unwrap_or_else(|err| panic!("{business_type}: {err}"));
        }
    }
}
