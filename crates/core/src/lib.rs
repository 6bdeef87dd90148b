pub mod churn;
pub mod clv;
pub mod config;
pub mod domain;
pub mod errors;
pub mod metrics;
mod num;
pub mod potential;
pub mod profiles;
pub mod recommendations;
pub mod repository;
pub mod rfm;
pub mod segmentation;
pub mod service;

pub use churn::{
    ChurnAssessment, ChurnFactors, ChurnInsightReport, RetentionPlan, RiskLevel, TrendReport,
    WinbackDifficulty,
};
pub use clv::ClvEstimate;
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};
pub use domain::customer::{Customer, CustomerId};
pub use domain::order::{Order, OrderId, OrderLine};
pub use domain::product::{Product, ProductId};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use metrics::{CustomerMetrics, GroupKey, GroupStats, MonthlyStats};
pub use potential::{
    InterestLevel, InterestScore, InventoryInsights, MarketingInsights, ProductInterestAnalysis,
    SalesIntelligence,
};
pub use profiles::{ConfigProvider, ProfileError, ProfileKind};
pub use recommendations::{
    CustomerPreferences, ProductRecommendation, PromotionRecommendation, RecommendationSet,
    StrategyRecommendation,
};
pub use repository::{
    ConfigRepository, CustomerRepository, OrderFilter, OrderRepository, ProductRepository,
    StoreError,
};
pub use rfm::{RfmInsightSet, RfmScore, RfmSegment};
pub use segmentation::{Segment, SegmentInputs};
pub use service::{
    AnalyticsService, ChurnReport, PotentialReport, PredictionReport, RfmReport, SegmentReport,
};
