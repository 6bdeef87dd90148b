//! Application facade: loads data through the repository traits, runs
//! the pure engines, and shapes the JSON-facing reports.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::churn::{
    self, ChurnAssessment, ChurnInsightReport, RetentionPlan, RiskLevel, TrendReport,
};
use crate::clv::{self, ClvEstimate};
use crate::domain::customer::{Customer, CustomerId};
use crate::errors::{ApplicationError, DomainError};
use crate::metrics::{self, GroupKey, GroupStats, MonthlyStats};
use crate::num::{round2, round_currency};
use crate::potential::{
    self, InterestLevel, InterestScore, InventoryInsights, MarketingInsights, SalesIntelligence,
};
use crate::profiles::ConfigProvider;
use crate::recommendations::{self, RecommendationSet};
use crate::repository::{CustomerRepository, OrderFilter, OrderRepository, ProductRepository};
use crate::rfm::{self, RfmInsightSet, RfmScore, RfmSegment};
use crate::segmentation::{self, Segment, SegmentInputs};

pub struct AnalyticsService {
    orders: Arc<dyn OrderRepository>,
    customers: Arc<dyn CustomerRepository>,
    products: Arc<dyn ProductRepository>,
    profiles: ConfigProvider,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub id: CustomerId,
    pub name: String,
    pub email: Option<String>,
}

impl CustomerSummary {
    fn from_customer(customer: &Customer) -> Self {
        Self { id: customer.id, name: customer.name.clone(), email: customer.email.clone() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentReport {
    pub customer: CustomerSummary,
    pub analysis: SegmentAnalysis,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentAnalysis {
    pub total_orders: i64,
    pub total_spent: f64,
    pub total_items: i64,
    pub avg_order_value: f64,
    pub last_order_date: Option<DateTime<Utc>>,
    pub days_since_last_order: Option<i64>,
    pub segment: Segment,
    pub category_breakdown: BTreeMap<GroupKey, GroupStats>,
    pub brand_breakdown: BTreeMap<GroupKey, GroupStats>,
    pub monthly_trends: BTreeMap<String, MonthlyStats>,
    /// Top five category names by spend.
    pub top_categories: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmRow {
    pub customer: CustomerSummary,
    pub recency_days: i64,
    pub frequency: i64,
    pub monetary: f64,
    #[serde(flatten)]
    pub scores: RfmScore,
    pub segment: RfmSegment,
    pub insights: RfmInsightSet,
    pub recommendations: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmSummary {
    pub total_customers: usize,
    pub avg_rfm_score: f64,
    pub segment_counts: BTreeMap<String, i64>,
    pub recency_thresholds: Vec<f64>,
    pub frequency_thresholds: Vec<f64>,
    pub monetary_thresholds: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RfmReport {
    pub customers: Vec<RfmRow>,
    pub summary: RfmSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnRow {
    pub customer: CustomerSummary,
    pub total_spent: f64,
    pub total_orders: i64,
    pub avg_order_value: f64,
    pub days_since_last_order: i64,
    pub engagement_score: f64,
    #[serde(flatten)]
    pub assessment: ChurnAssessment,
    pub risk_level: RiskLevel,
    pub insights: ChurnInsightReport,
    pub retention_plan: RetentionPlan,
    pub trends: TrendReport,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnSummary {
    pub total_analyzed: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub avg_churn_risk: f64,
    /// Estimated revenue loss summed over the high-risk rows.
    pub revenue_at_risk: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChurnReport {
    pub customers: Vec<ChurnRow>,
    pub summary: ChurnSummary,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPrediction {
    pub customer_id: CustomerId,
    pub customer_name: String,
    #[serde(flatten)]
    pub estimate: ClvEstimate,
    pub churn_risk: f64,
    pub next_purchase_date: Option<DateTime<Utc>>,
    pub recommended_actions: Vec<String>,
    pub acquisition_cost: f64,
    pub retention_rate: f64,
    pub segment: Segment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommendations: Option<RecommendationSet>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallPredictionMetrics {
    pub total_predicted_revenue: f64,
    pub avg_churn_risk: f64,
    pub avg_retention_rate: f64,
    pub total_customers: usize,
    pub high_value_customers: usize,
    pub at_risk_customers: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionReport {
    pub horizon_months: u32,
    pub predictions: Vec<CustomerPrediction>,
    pub overall_metrics: OverallPredictionMetrics,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialCustomerRow {
    pub customer: CustomerSummary,
    pub phone: Option<String>,
    pub total_spent: f64,
    pub similar_products: i64,
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub first_purchase_at: DateTime<Utc>,
    pub last_purchase_at: DateTime<Utc>,
    pub purchase_frequency: f64,
    pub avg_order_value: f64,
    #[serde(flatten)]
    pub interest: InterestScore,
    pub interest_level: InterestLevel,
    pub marketing_insights: MarketingInsights,
    pub sales_intelligence: SalesIntelligence,
    pub inventory_insights: InventoryInsights,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialSummary {
    pub total_analyzed: usize,
    pub avg_interest_score: f64,
    pub high_interest_customers: usize,
    pub medium_interest_customers: usize,
    pub low_interest_customers: usize,
    /// Conversion-weighted spend of the returned rows.
    pub total_potential_revenue: f64,
    pub purchase_frequency_thresholds: Vec<f64>,
    pub total_spent_thresholds: Vec<f64>,
    pub recency_thresholds: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PotentialReport {
    pub potential_customers: Vec<PotentialCustomerRow>,
    pub summary: PotentialSummary,
}

impl AnalyticsService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        customers: Arc<dyn CustomerRepository>,
        products: Arc<dyn ProductRepository>,
        profiles: ConfigProvider,
    ) -> Self {
        Self { orders, customers, products, profiles }
    }

    /// Full single-customer analysis: metrics, breakdowns, monthly
    /// trends and the lifecycle segment.
    pub async fn segment(
        &self,
        customer_id: CustomerId,
        business_type: &str,
    ) -> Result<SegmentReport, ApplicationError> {
        let customer = self
            .customers
            .find_by_id(customer_id)
            .await?
            .ok_or(DomainError::UnknownCustomer(customer_id))?;

        let orders = self.orders.find_orders(&OrderFilter::for_customer(customer_id)).await?;
        let profile = self.profiles.segmentation(business_type).await;
        let now = Utc::now();

        let customer_metrics = metrics::aggregate_customer(customer_id, &orders);
        let days_since_last_order = customer_metrics.days_since_last_order(now);
        let segment = segmentation::classify(
            SegmentInputs {
                total_spent: customer_metrics.total_spent,
                total_orders: customer_metrics.total_orders,
                avg_order_value: customer_metrics.avg_order_value(),
                days_since_last_order: days_since_last_order.unwrap_or(0),
            },
            &profile,
        );

        let top_categories = customer_metrics
            .top_categories(5)
            .into_iter()
            .map(|(_, stats)| stats.name.clone())
            .collect();

        debug!(customer = %customer_id, segment = %segment, "segmented customer");

        Ok(SegmentReport {
            customer: CustomerSummary::from_customer(&customer),
            analysis: SegmentAnalysis {
                total_orders: customer_metrics.total_orders,
                total_spent: customer_metrics.total_spent,
                total_items: customer_metrics.total_items,
                avg_order_value: round2(customer_metrics.avg_order_value()),
                last_order_date: customer_metrics.last_order_at,
                days_since_last_order,
                segment,
                category_breakdown: customer_metrics.categories,
                brand_breakdown: customer_metrics.brands,
                monthly_trends: metrics::monthly_trends(&orders),
                top_categories,
            },
        })
    }

    /// RFM rows for one customer or the whole base, sorted by score
    /// descending.
    pub async fn rfm(
        &self,
        customer_id: Option<CustomerId>,
        business_type: &str,
    ) -> Result<RfmReport, ApplicationError> {
        let profile = self.profiles.rfm(business_type).await;
        let now = Utc::now();

        let (orders, customer_index) = match customer_id {
            Some(id) => {
                let customer = self
                    .customers
                    .find_by_id(id)
                    .await?
                    .ok_or(DomainError::UnknownCustomer(id))?;
                let orders = self.orders.find_orders(&OrderFilter::for_customer(id)).await?;
                (orders, BTreeMap::from([(id, customer)]))
            }
            None => {
                let orders = self.orders.find_orders(&OrderFilter::default()).await?;
                (orders, self.customer_index().await?)
            }
        };

        let mut rows = Vec::new();
        for customer_metrics in metrics::aggregate(&orders) {
            let Some(customer) = customer_index.get(&customer_metrics.customer_id) else {
                warn!(customer = %customer_metrics.customer_id, "customer record missing, skipping");
                continue;
            };
            let recency_days =
                customer_metrics.days_since_last_order(now).unwrap_or_default();

            let scores = rfm::score(
                recency_days as f64,
                customer_metrics.total_orders as f64,
                customer_metrics.total_spent,
                &profile,
            );
            let segment = rfm::segment(scores.rfm_score, &profile);
            rows.push(RfmRow {
                customer: CustomerSummary::from_customer(customer),
                recency_days,
                frequency: customer_metrics.total_orders,
                monetary: customer_metrics.total_spent,
                scores,
                segment,
                insights: rfm::insights(&scores, &profile),
                recommendations: rfm::recommendations(segment, &scores),
            });
        }

        rows.sort_by(|a, b| {
            b.scores
                .rfm_score
                .partial_cmp(&a.scores.rfm_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut segment_counts: BTreeMap<String, i64> = BTreeMap::new();
        for row in &rows {
            *segment_counts.entry(row.segment.as_str().to_owned()).or_default() += 1;
        }
        let avg_rfm_score = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|row| row.scores.rfm_score).sum::<f64>() / rows.len() as f64
        };

        let summary = RfmSummary {
            total_customers: rows.len(),
            avg_rfm_score: round2(avg_rfm_score),
            segment_counts,
            recency_thresholds: profile.scoring.recency.thresholds.clone(),
            frequency_thresholds: profile.scoring.frequency.thresholds.clone(),
            monetary_thresholds: profile.scoring.monetary.thresholds.clone(),
        };

        Ok(RfmReport { customers: rows, summary })
    }

    /// Churn assessment across the base. With `inactive_days` set, only
    /// orders placed before that cutoff are considered, surfacing
    /// customers whose activity has gone quiet.
    pub async fn churn_prediction(
        &self,
        inactive_days: Option<i64>,
        business_type: &str,
    ) -> Result<ChurnReport, ApplicationError> {
        let profile = self.profiles.churn(business_type).await;
        let now = Utc::now();

        let filter = OrderFilter {
            placed_before: inactive_days.map(|days| now - chrono::Duration::days(days)),
            ..OrderFilter::default()
        };
        let orders = self.orders.find_orders(&filter).await?;
        let customer_index = self.customer_index().await?;

        info!(customers = customer_index.len(), orders = orders.len(), "predicting churn");

        let mut rows = Vec::new();
        for customer_metrics in metrics::aggregate(&orders) {
            let Some(customer) = customer_index.get(&customer_metrics.customer_id) else {
                warn!(customer = %customer_metrics.customer_id, "customer record missing, skipping");
                continue;
            };
            let days_since_last_order =
                customer_metrics.days_since_last_order(now).unwrap_or_default();
            let avg_order_value = customer_metrics.avg_order_value();

            let engagement = churn::engagement_score(
                customer_metrics.total_orders,
                customer_metrics.total_spent,
                days_since_last_order,
                avg_order_value,
            );
            let assessment = churn::assess(
                days_since_last_order,
                customer_metrics.total_orders,
                customer_metrics.total_spent,
                engagement,
                &profile,
            );
            let customer_orders: Vec<_> = orders
                .iter()
                .filter(|order| order.customer_id == customer_metrics.customer_id)
                .cloned()
                .collect();

            rows.push(ChurnRow {
                customer: CustomerSummary::from_customer(customer),
                total_spent: customer_metrics.total_spent,
                total_orders: customer_metrics.total_orders,
                avg_order_value: round2(avg_order_value),
                days_since_last_order,
                engagement_score: engagement,
                risk_level: churn::risk_level(assessment.churn_risk, &profile),
                insights: churn::insights(
                    assessment.churn_risk,
                    &assessment.factors,
                    customer_metrics.total_spent,
                    &profile,
                ),
                retention_plan: churn::retention_plan(&assessment.factors, &profile),
                trends: churn::trends(&customer_orders),
                assessment,
            });
        }

        rows.sort_by(|a, b| {
            b.assessment
                .churn_risk
                .partial_cmp(&a.assessment.churn_risk)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let high_risk = rows.iter().filter(|row| row.risk_level == RiskLevel::High).count();
        let medium_risk = rows.iter().filter(|row| row.risk_level == RiskLevel::Medium).count();
        let low_risk = rows.len() - high_risk - medium_risk;
        let avg_churn_risk = if rows.is_empty() {
            0.0
        } else {
            rows.iter().map(|row| row.assessment.churn_risk).sum::<f64>() / rows.len() as f64
        };
        let revenue_at_risk = rows
            .iter()
            .filter(|row| row.risk_level == RiskLevel::High)
            .map(|row| row.insights.estimated_revenue_loss)
            .sum::<f64>();

        let summary = ChurnSummary {
            total_analyzed: rows.len(),
            high_risk,
            medium_risk,
            low_risk,
            avg_churn_risk: round2(avg_churn_risk),
            revenue_at_risk: round_currency(revenue_at_risk),
        };

        Ok(ChurnReport { customers: rows, summary })
    }

    /// CLV predictions for a batch of customers. Unknown ids are logged
    /// and skipped so one bad id never sinks the batch.
    pub async fn predict(
        &self,
        customer_ids: &[CustomerId],
        horizon_months: u32,
        include_recommendations: bool,
        business_type: &str,
    ) -> Result<PredictionReport, ApplicationError> {
        let segmentation_profile = self.profiles.segmentation(business_type).await;
        let recommendation_profile = self.profiles.recommendation(business_type).await;
        let now = Utc::now();

        // Snapshot the full order book and catalog once when product
        // recommendations were requested.
        let (all_orders, catalog) = if include_recommendations {
            (
                self.orders.find_orders(&OrderFilter::default()).await?,
                self.products.list_active().await?,
            )
        } else {
            (Vec::new(), Vec::new())
        };

        let mut predictions = Vec::new();
        for &customer_id in customer_ids {
            let Some(customer) = self.customers.find_by_id(customer_id).await? else {
                warn!(customer = %customer_id, "customer not found, skipping");
                continue;
            };
            let orders =
                self.orders.find_orders(&OrderFilter::for_customer(customer_id)).await?;

            let customer_metrics = metrics::aggregate_customer(customer_id, &orders);
            let days_since_last_order =
                customer_metrics.days_since_last_order(now).unwrap_or_default();

            let estimate = clv::estimate(&orders, now);
            let churn_risk =
                churn::simple_churn_risk(days_since_last_order, customer_metrics.total_orders);
            let segment = segmentation::classify(
                SegmentInputs {
                    total_spent: customer_metrics.total_spent,
                    total_orders: customer_metrics.total_orders,
                    avg_order_value: customer_metrics.avg_order_value(),
                    days_since_last_order,
                },
                &segmentation_profile,
            );

            let recommendations = if include_recommendations {
                let preferences = recommendations::analyze_preferences(&orders, now);
                let mut products = recommendations::collaborative_filtering(
                    customer_id,
                    &all_orders,
                    &catalog,
                    &preferences,
                );
                products.extend(recommendations::content_based_filtering(
                    &preferences,
                    &catalog,
                    &recommendation_profile,
                ));
                products.extend(recommendations::popularity_based_filtering(
                    &all_orders,
                    &catalog,
                    &recommendation_profile,
                ));
                let mut ranked = recommendations::rank(products, &recommendation_profile);
                ranked.truncate(recommendation_profile.limits.products);

                Some(RecommendationSet {
                    products: ranked,
                    promotions: recommendations::promotions(
                        segment,
                        &recommendation_profile,
                        now,
                    ),
                    strategies: recommendations::strategies(
                        segment,
                        &preferences,
                        &recommendation_profile,
                        now,
                    ),
                })
            } else {
                None
            };

            predictions.push(CustomerPrediction {
                customer_id,
                customer_name: customer.name,
                churn_risk,
                next_purchase_date: clv::next_purchase_date(&orders, now),
                recommended_actions: clv::recommended_actions(
                    churn_risk,
                    estimate.predicted_clv,
                ),
                acquisition_cost: clv::acquisition_cost(estimate.predicted_clv),
                retention_rate: round2(clv::retention_rate(&orders)),
                segment,
                recommendations,
                estimate,
            });
        }

        let total = predictions.len();
        let overall_metrics = OverallPredictionMetrics {
            total_predicted_revenue: round_currency(
                predictions.iter().map(|p| p.estimate.predicted_clv).sum(),
            ),
            avg_churn_risk: if total == 0 {
                0.0
            } else {
                round2(predictions.iter().map(|p| p.churn_risk).sum::<f64>() / total as f64)
            },
            avg_retention_rate: if total == 0 {
                0.0
            } else {
                round2(predictions.iter().map(|p| p.retention_rate).sum::<f64>() / total as f64)
            },
            total_customers: total,
            high_value_customers: predictions
                .iter()
                .filter(|p| p.estimate.predicted_clv > 50_000.0)
                .count(),
            at_risk_customers: predictions.iter().filter(|p| p.churn_risk > 0.7).count(),
        };

        Ok(PredictionReport { horizon_months, predictions, overall_metrics })
    }

    /// Rank customers by their interest in a set of products or
    /// categories, with marketing, sales and inventory insights.
    pub async fn potential_customers(
        &self,
        filter: OrderFilter,
        limit: usize,
        business_type: &str,
    ) -> Result<PotentialReport, ApplicationError> {
        let profile = self.profiles.potential(business_type).await;
        let now = Utc::now();

        let orders = self.orders.find_orders(&filter).await?;
        let customer_index = self.customer_index().await?;

        let mut by_customer: BTreeMap<CustomerId, Vec<_>> = BTreeMap::new();
        for order in orders {
            by_customer.entry(order.customer_id).or_default().push(order);
        }

        let mut rows = Vec::new();
        for (customer_id, customer_orders) in &by_customer {
            let Some(customer) = customer_index.get(customer_id) else {
                warn!(customer = %customer_id, "customer record missing, skipping");
                continue;
            };
            let Some(analysis) = potential::analyze_history(*customer_id, customer_orders)
            else {
                continue;
            };

            let interest = potential::interest_score(&analysis, now, &profile);
            let interest_level = potential::interest_level(interest.total_score, &profile);

            rows.push(PotentialCustomerRow {
                customer: CustomerSummary::from_customer(customer),
                phone: customer.phone.clone(),
                total_spent: analysis.total_spent,
                similar_products: analysis.similar_products,
                categories: analysis.categories.iter().cloned().collect(),
                brands: analysis.brands.iter().cloned().collect(),
                first_purchase_at: analysis.first_purchase_at,
                last_purchase_at: analysis.last_purchase_at,
                purchase_frequency: round2(analysis.purchase_frequency),
                avg_order_value: round_currency(analysis.avg_order_value),
                interest_level,
                marketing_insights: potential::marketing_insights(
                    &analysis,
                    interest.total_score,
                    &profile,
                ),
                sales_intelligence: potential::sales_intelligence(
                    &analysis,
                    interest.total_score,
                    &profile,
                ),
                inventory_insights: potential::inventory_insights(
                    &analysis,
                    interest.total_score,
                    now,
                ),
                interest,
            });
        }

        rows.sort_by(|a, b| {
            b.interest
                .total_score
                .partial_cmp(&a.interest.total_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let total_analyzed = rows.len();
        let avg_interest_score = if total_analyzed == 0 {
            0.0
        } else {
            rows.iter().map(|row| row.interest.total_score).sum::<f64>() / total_analyzed as f64
        };
        let high = rows.iter().filter(|r| r.interest_level == InterestLevel::High).count();
        let medium = rows.iter().filter(|r| r.interest_level == InterestLevel::Medium).count();
        let low = rows.iter().filter(|r| r.interest_level == InterestLevel::Low).count();

        rows.truncate(limit);
        let total_potential_revenue = rows
            .iter()
            .map(|row| row.sales_intelligence.conversion_probability * row.total_spent)
            .sum::<f64>();

        info!(returned = rows.len(), analyzed = total_analyzed, "ranked potential customers");

        let summary = PotentialSummary {
            total_analyzed,
            avg_interest_score: round2(avg_interest_score),
            high_interest_customers: high,
            medium_interest_customers: medium,
            low_interest_customers: low,
            total_potential_revenue: round_currency(total_potential_revenue),
            purchase_frequency_thresholds: profile.scoring.purchase_frequency.thresholds.clone(),
            total_spent_thresholds: profile.scoring.total_spent.thresholds.clone(),
            recency_thresholds: profile.scoring.recency.thresholds.clone(),
        };

        Ok(PotentialReport { potential_customers: rows, summary })
    }

    async fn customer_index(&self) -> Result<BTreeMap<CustomerId, Customer>, ApplicationError> {
        let customers = self.customers.list_all().await?;
        Ok(customers.into_iter().map(|customer| (customer.id, customer)).collect())
    }
}
