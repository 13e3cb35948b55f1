use std::sync::Arc;

use chrono::NaiveDate;
use dashmap::DashMap;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::analytics::forecasting::{self, ConfidenceTier, ForecastResult};
use crate::analytics::pricing::{self, PriceAction, PricingResult};
use crate::analytics::recommendation::{self, Recommendation};
use crate::analytics::risk::{self, ExpiryRisk, RiskLevel, RiskResult};
use crate::analytics::seasonality::{self, SeasonalityResult};
use crate::analytics::{mean, round1, DailyRecord};
use crate::config::AnalyticsConfig;
use crate::errors::ServiceError;

use super::timeseries::TimeSeriesStore;

/// Valid forecast horizon bounds enforced at the boundary.
pub const MIN_FORECAST_DAYS: u32 = 1;
pub const MAX_FORECAST_DAYS: u32 = 30;

/// Names listed in the catalog insights summary.
const INSIGHT_LIST_LIMIT: usize = 10;

/// Metrics snapshot used as the scenario-simulation baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub current_price: f64,
    pub current_inventory: i32,
    /// 7-day average daily sales
    pub current_sales: f64,
    pub last_date: Option<NaiveDate>,
}

/// The combined output of the analytics pipeline for one product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub product_name: String,
    pub category: String,
    pub metrics: MetricsSnapshot,
    pub forecast: ForecastResult,
    pub risk: RiskResult,
    pub pricing: PricingResult,
    pub seasonality: SeasonalityResult,
    pub recommendation: Recommendation,
}

impl AnalysisResult {
    /// Scenario baseline: current price, 7-day demand, projected demand,
    /// and days of cover.
    pub fn baseline(&self) -> crate::analytics::simulator::ScenarioBaseline {
        let demand = self.metrics.current_sales;
        let forecast_demand = mean(
            &self
                .forecast
                .next_days
                .iter()
                .map(|&d| d as f64)
                .collect::<Vec<_>>(),
        );
        let denom = if demand > 0.0 { demand } else { 1.0 };
        crate::analytics::simulator::ScenarioBaseline {
            current_price: self.metrics.current_price,
            current_demand: demand,
            forecast_demand,
            current_stock_days: self.metrics.current_inventory as f64 / denom,
        }
    }
}

/// One-line listing entry per product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSummary {
    pub product_name: String,
    pub category: String,
    pub risk_level: RiskLevel,
    pub days_of_stock: f64,
    pub demand_trend_pct: f64,
    pub current_price: f64,
    pub expiry_risk: ExpiryRisk,
    pub pricing_action: PriceAction,
    pub confidence_tier: ConfidenceTier,
    pub risk_reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightCounts {
    pub total_products: usize,
    pub high_risk: usize,
    pub opportunities: usize,
}

/// Catalog-level digest of where the attention should go today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsightsSummary {
    pub counts: InsightCounts,
    pub insights: Vec<String>,
    pub high_risk_products: Vec<String>,
    pub opportunity_products: Vec<String>,
}

/// Cache of per-product analysis results, keyed by product name. Entries
/// live until the next ledger write for that product.
#[derive(Clone, Default)]
pub struct AnalysisCache {
    entries: Arc<DashMap<String, Arc<AnalysisResult>>>,
}

impl AnalysisCache {
    pub fn get(&self, product_name: &str) -> Option<Arc<AnalysisResult>> {
        self.entries.get(product_name).map(|e| e.value().clone())
    }

    pub fn insert(&self, product_name: String, result: Arc<AnalysisResult>) {
        self.entries.insert(product_name, result);
    }

    pub fn invalidate(&self, product_name: &str) {
        self.entries.remove(product_name);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}

/// Runs the full analytics pipeline per product and caches the result.
#[derive(Clone)]
pub struct AnalysisService {
    store: TimeSeriesStore,
    cache: AnalysisCache,
    horizon: u32,
}

impl AnalysisService {
    pub fn new(store: TimeSeriesStore, cache: AnalysisCache, analytics: &AnalyticsConfig) -> Self {
        Self {
            store,
            cache,
            horizon: analytics.forecast_horizon_days,
        }
    }

    /// Full pipeline for one product, served from cache when the history
    /// has not changed since the last run.
    #[instrument(skip(self))]
    pub async fn analyze(&self, product_name: &str) -> Result<Arc<AnalysisResult>, ServiceError> {
        if let Some(cached) = self.cache.get(product_name) {
            return Ok(cached);
        }

        let (product, history) = self.store.product_history(product_name).await?;
        let result = Arc::new(run_pipeline(
            &product.name,
            &product.category,
            &history,
            self.horizon,
        ));
        self.cache.insert(product.name.clone(), result.clone());
        Ok(result)
    }

    /// Demand forecast only, with a caller-chosen horizon.
    #[instrument(skip(self))]
    pub async fn forecast(
        &self,
        product_name: &str,
        days: u32,
    ) -> Result<ForecastResult, ServiceError> {
        if !(MIN_FORECAST_DAYS..=MAX_FORECAST_DAYS).contains(&days) {
            return Err(ServiceError::InvalidInput(format!(
                "Forecast horizon must be between {MIN_FORECAST_DAYS} and {MAX_FORECAST_DAYS} days, got {days}"
            )));
        }
        let (_, history) = self.store.product_history(product_name).await?;
        Ok(forecasting::forecast(&history, days))
    }

    /// Risk classification only.
    #[instrument(skip(self))]
    pub async fn risk(&self, product_name: &str) -> Result<RiskResult, ServiceError> {
        Ok(self.analyze(product_name).await?.risk.clone())
    }

    /// Pricing recommendation only.
    #[instrument(skip(self))]
    pub async fn pricing(&self, product_name: &str) -> Result<PricingResult, ServiceError> {
        Ok(self.analyze(product_name).await?.pricing.clone())
    }

    pub fn invalidate(&self, product_name: &str) {
        self.cache.invalidate(product_name);
    }

    /// All product names known to the store.
    pub async fn product_names(&self) -> Result<Vec<String>, ServiceError> {
        self.store.list_product_names().await
    }

    /// Summaries for every product, analyzed concurrently. Products whose
    /// analysis fails are skipped rather than failing the listing.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Vec<ProductSummary>, ServiceError> {
        let names = self.store.list_product_names().await?;
        let analyses = join_all(names.iter().map(|name| self.analyze(name))).await;

        let summaries = names
            .iter()
            .zip(analyses)
            .filter_map(|(name, outcome)| match outcome {
                Ok(analysis) => Some(ProductSummary {
                    product_name: analysis.product_name.clone(),
                    category: analysis.category.clone(),
                    risk_level: analysis.risk.risk_level,
                    days_of_stock: analysis.risk.days_of_stock,
                    demand_trend_pct: analysis.forecast.trend_pct,
                    current_price: analysis.metrics.current_price,
                    expiry_risk: analysis.risk.expiry_risk,
                    pricing_action: analysis.pricing.action,
                    confidence_tier: analysis.forecast.confidence_tier,
                    risk_reason: analysis.risk.reason.clone(),
                }),
                Err(err) => {
                    warn!(product = %name, error = %err, "skipping product in listing");
                    None
                }
            })
            .collect();

        Ok(summaries)
    }

    /// Catalog digest: how many products sit in each bucket and which ones.
    #[instrument(skip(self))]
    pub async fn insights_summary(&self) -> Result<InsightsSummary, ServiceError> {
        let summaries = self.list_products().await?;

        let high_risk: Vec<String> = summaries
            .iter()
            .filter(|s| s.risk_level == RiskLevel::HighRisk)
            .map(|s| s.product_name.clone())
            .collect();
        let opportunities: Vec<String> = summaries
            .iter()
            .filter(|s| s.risk_level == RiskLevel::Opportunity)
            .map(|s| s.product_name.clone())
            .collect();

        let mut insights = Vec::new();
        if !high_risk.is_empty() {
            insights.push(format!(
                "Found {} products at high risk of stockout or expiry.",
                high_risk.len()
            ));
        }
        if !opportunities.is_empty() {
            insights.push(format!(
                "Identified {} products with pricing opportunities.",
                opportunities.len()
            ));
        }
        insights.push(format!(
            "Analyzed {} total SKUs for patterns.",
            summaries.len()
        ));

        Ok(InsightsSummary {
            counts: InsightCounts {
                total_products: summaries.len(),
                high_risk: high_risk.len(),
                opportunities: opportunities.len(),
            },
            insights,
            high_risk_products: high_risk.into_iter().take(INSIGHT_LIST_LIMIT).collect(),
            opportunity_products: opportunities.into_iter().take(INSIGHT_LIST_LIMIT).collect(),
        })
    }
}

/// The pipeline itself: forecast, classify, price, compose. Pure in the
/// history it is given.
fn run_pipeline(name: &str, category: &str, history: &[DailyRecord], horizon: u32) -> AnalysisResult {
    let forecast = forecasting::forecast(history, horizon);

    let as_of = history.last().map(|r| r.date).unwrap_or_default();
    let risk = risk::classify(history, &forecast, as_of);
    let pricing = pricing::recommend(history, &forecast, &risk);
    let seasonality = seasonality::detect(history);
    let recommendation = recommendation::compose(&forecast, &risk, &pricing);

    let last7_start = history.len().saturating_sub(7);
    let current_sales = mean(
        &history[last7_start..]
            .iter()
            .map(|r| r.units_sold as f64)
            .collect::<Vec<_>>(),
    );

    AnalysisResult {
        product_name: name.to_string(),
        category: category.to_string(),
        metrics: MetricsSnapshot {
            current_price: history.last().map(|r| r.price).unwrap_or(0.0),
            current_inventory: history.last().map(|r| r.inventory_level).unwrap_or(0),
            current_sales: round1(current_sales),
            last_date: history.last().map(|r| r.date),
        },
        forecast,
        risk,
        pricing,
        seasonality,
        recommendation,
    }
}
