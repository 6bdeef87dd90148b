use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    ChurnProfile, PotentialProfile, ProfileError, RecommendationProfile, RfmProfile,
    SegmentationProfile,
};
use crate::repository::ConfigRepository;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileKind {
    Segmentation,
    Churn,
    Rfm,
    Recommendation,
    PotentialCustomers,
}

impl ProfileKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Segmentation => "segmentation",
            Self::Churn => "churn",
            Self::Rfm => "rfm",
            Self::Recommendation => "recommendation",
            Self::PotentialCustomers => "potential_customers",
        }
    }
}

/// Read-through profile lookup. Stored overrides win when they decode
/// and validate; anything else falls back to the builtin table for the
/// business type, so profile resolution itself never fails.
#[derive(Clone)]
pub struct ConfigProvider {
    store: Option<Arc<dyn ConfigRepository>>,
}

impl ConfigProvider {
    pub fn builtin_only() -> Self {
        Self { store: None }
    }

    pub fn with_store(store: Arc<dyn ConfigRepository>) -> Self {
        Self { store: Some(store) }
    }

    pub async fn segmentation(&self, business_type: &str) -> SegmentationProfile {
        self.resolve(ProfileKind::Segmentation, business_type, SegmentationProfile::validate)
            .await
            .unwrap_or_else(|| SegmentationProfile::builtin(business_type))
    }

    pub async fn rfm(&self, business_type: &str) -> RfmProfile {
        self.resolve(ProfileKind::Rfm, business_type, RfmProfile::validate)
            .await
            .unwrap_or_else(|| RfmProfile::builtin(business_type))
    }

    pub async fn churn(&self, business_type: &str) -> ChurnProfile {
        self.resolve(ProfileKind::Churn, business_type, ChurnProfile::validate)
            .await
            .unwrap_or_else(|| ChurnProfile::builtin(business_type))
    }

    pub async fn recommendation(&self, business_type: &str) -> RecommendationProfile {
        self.resolve(ProfileKind::Recommendation, business_type, RecommendationProfile::validate)
            .await
            .unwrap_or_else(|| RecommendationProfile::builtin(business_type))
    }

    pub async fn potential(&self, business_type: &str) -> PotentialProfile {
        self.resolve(ProfileKind::PotentialCustomers, business_type, PotentialProfile::validate)
            .await
            .unwrap_or_else(|| PotentialProfile::builtin(business_type))
    }

    async fn resolve<T>(
        &self,
        kind: ProfileKind,
        business_type: &str,
        validate: impl Fn(&T) -> Result<(), ProfileError>,
    ) -> Option<T>
    where
        T: DeserializeOwned,
    {
        let store = self.store.as_ref()?;
        let raw = match store.find_override(kind.as_str(), business_type).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!(kind = kind.as_str(), business_type, "no stored profile, using builtin");
                return None;
            }
            Err(err) => {
                warn!(
                    kind = kind.as_str(),
                    business_type,
                    error = %err,
                    "profile lookup failed, using builtin"
                );
                return None;
            }
        };

        let profile = match serde_json::from_str::<T>(&raw) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(
                    kind = kind.as_str(),
                    business_type,
                    error = %err,
                    "stored profile does not decode, using builtin"
                );
                return None;
            }
        };

        if let Err(err) = validate(&profile) {
            warn!(
                kind = kind.as_str(),
                business_type,
                error = %err,
                "stored profile fails validation, using builtin"
            );
            return None;
        }

        Some(profile)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use async_trait::async_trait;

    use super::ConfigProvider;
    use crate::repository::{ConfigRepository, StoreError};

    struct MapStore {
        entries: HashMap<(String, String), String>,
        fail: bool,
    }

    #[async_trait]
    impl ConfigRepository for MapStore {
        async fn find_override(
            &self,
            kind: &str,
            business_type: &str,
        ) -> Result<Option<String>, StoreError> {
            if self.fail {
                return Err(StoreError::Unavailable("store offline".to_owned()));
            }
            Ok(self.entries.get(&(kind.to_owned(), business_type.to_owned())).cloned())
        }
    }

    fn store_with(kind: &str, business_type: &str, raw: &str) -> ConfigProvider {
        let mut entries = HashMap::new();
        entries.insert((kind.to_owned(), business_type.to_owned()), raw.to_owned());
        ConfigProvider::with_store(Arc::new(MapStore { entries, fail: false }))
    }

    #[tokio::test]
    async fn stored_override_wins_over_builtin() {
        let raw = r#"{
            "whale": {"minTotalSpent": 999.0, "minOrders": 3, "minAvgOrderValue": 50.0},
            "vip": {"minTotalSpent": 100.0, "maxTotalSpent": 999.0, "minOrders": 2, "minAvgOrderValue": 20.0},
            "regular": {"minTotalSpent": 10.0, "maxTotalSpent": 100.0, "minOrders": 1},
            "churn": {"maxDaysSinceLastOrder": 45}
        }"#;
        let provider = store_with("segmentation", "default", raw);

        let profile = provider.segmentation("default").await;
        assert_eq!(profile.whale.min_total_spent, 999.0);
        assert_eq!(profile.churn.max_days_since_last_order, 45);
    }

    #[tokio::test]
    async fn malformed_override_falls_back_to_builtin() {
        let provider = store_with("segmentation", "default", "{not json");

        let profile = provider.segmentation("default").await;
        assert_eq!(profile.whale.min_total_spent, 80_000.0);
    }

    #[tokio::test]
    async fn invalid_override_falls_back_to_builtin() {
        // vip min above max fails validation.
        let raw = r#"{
            "whale": {"minTotalSpent": 999.0, "minOrders": 3, "minAvgOrderValue": 50.0},
            "vip": {"minTotalSpent": 999.0, "maxTotalSpent": 100.0, "minOrders": 2, "minAvgOrderValue": 20.0},
            "regular": {"minTotalSpent": 10.0, "maxTotalSpent": 100.0, "minOrders": 1},
            "churn": {"maxDaysSinceLastOrder": 45}
        }"#;
        let provider = store_with("segmentation", "default", raw);

        let profile = provider.segmentation("default").await;
        assert_eq!(profile.whale.min_total_spent, 80_000.0);
    }

    #[tokio::test]
    async fn store_failure_falls_back_to_builtin() {
        let provider =
            ConfigProvider::with_store(Arc::new(MapStore { entries: HashMap::new(), fail: true }));

        let profile = provider.rfm("high_value").await;
        assert_eq!(profile.scoring.recency.thresholds, vec![15.0, 30.0, 60.0, 120.0]);
    }

    #[tokio::test]
    async fn builtin_only_provider_never_touches_a_store() {
        let provider = ConfigProvider::builtin_only();
        let profile = provider.churn("default").await;
        assert_eq!(profile.risk_levels.high.min_score, 0.7);
    }
}
