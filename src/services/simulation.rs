use futures::future::join_all;
use serde::{Deserialize, Serialize};
use strum::Display;
use tracing::{instrument, warn};

use crate::analytics::risk::RiskLevel;
use crate::analytics::simulator::{
    self, CompetitorScenario, InventoryScenario, MarketingScenario, PriceScenario,
    PromotionScenario,
};
use crate::analytics::{round1, round2};
use crate::config::AnalyticsConfig;
use crate::errors::ServiceError;

use super::analysis::AnalysisService;

/// Promotion boundary limits.
pub const MAX_DISCOUNT_PCT: f64 = 50.0;
pub const MAX_DURATION_DAYS: u32 = 30;

/// Days a catalog-wide projection is extrapolated over.
const GLOBAL_PROJECTION_DAYS: f64 = 30.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductScenario<T> {
    pub product_name: String,
    pub current_price: f64,
    #[serde(flatten)]
    pub projection: T,
}

/// Which products a catalog-wide scenario applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Segment {
    #[default]
    All,
    HighRisk,
    Opportunity,
}

/// Store-wide what-if request, one variant per supported scenario.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "scenario", rename_all = "snake_case")]
pub enum GlobalScenario {
    PriceChange { pct_change: f64 },
    Promotion { discount_pct: f64, duration_days: u32 },
    Marketing { ad_spend: f64, lift_pct: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum GlobalAction {
    Positive,
    Negative,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalSummary {
    pub total_revenue_change: f64,
    pub revenue_change_pct: f64,
    pub demand_change_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub net_profit_impact: Option<f64>,
    pub action: GlobalAction,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalScenarioOutcome {
    pub products_impacted: usize,
    pub summary: GlobalSummary,
}

/// What-if projections over the cached analysis baselines. Per-product
/// scenarios are pure once the baseline is in hand; the catalog-wide path
/// fans the same computation out over a segment sample and reduces with
/// order-independent sums.
#[derive(Clone)]
pub struct SimulationService {
    analysis: AnalysisService,
    analytics: AnalyticsConfig,
}

impl SimulationService {
    pub fn new(analysis: AnalysisService, analytics: AnalyticsConfig) -> Self {
        Self {
            analysis,
            analytics,
        }
    }

    #[instrument(skip(self))]
    pub async fn price_change(
        &self,
        product_name: &str,
        new_price: f64,
    ) -> Result<ProductScenario<PriceScenario>, ServiceError> {
        let analysis = self.analysis.analyze(product_name).await?;
        let baseline = analysis.baseline();
        let projection =
            simulator::simulate_price_impact(&baseline, new_price, self.analytics.price_elasticity);
        Ok(ProductScenario {
            product_name: analysis.product_name.clone(),
            current_price: baseline.current_price,
            projection,
        })
    }

    #[instrument(skip(self))]
    pub async fn promotion(
        &self,
        product_name: &str,
        discount_pct: f64,
        duration_days: u32,
    ) -> Result<ProductScenario<PromotionScenario>, ServiceError> {
        if !(0.0..=MAX_DISCOUNT_PCT).contains(&discount_pct) {
            return Err(ServiceError::InvalidInput(format!(
                "Discount must be between 0 and {MAX_DISCOUNT_PCT} percent, got {discount_pct}"
            )));
        }
        if !(1..=MAX_DURATION_DAYS).contains(&duration_days) {
            return Err(ServiceError::InvalidInput(format!(
                "Promotion duration must be between 1 and {MAX_DURATION_DAYS} days, got {duration_days}"
            )));
        }

        let analysis = self.analysis.analyze(product_name).await?;
        let baseline = analysis.baseline();
        let projection = simulator::simulate_promotion(
            &baseline,
            discount_pct,
            duration_days,
            self.analytics.promotion_lift_factor,
        );
        Ok(ProductScenario {
            product_name: analysis.product_name.clone(),
            current_price: baseline.current_price,
            projection,
        })
    }

    #[instrument(skip(self))]
    pub async fn inventory_change(
        &self,
        product_name: &str,
        new_stock_days: f64,
    ) -> Result<ProductScenario<InventoryScenario>, ServiceError> {
        let analysis = self.analysis.analyze(product_name).await?;
        let baseline = analysis.baseline();
        let projection = simulator::simulate_inventory_change(&baseline, new_stock_days);
        Ok(ProductScenario {
            product_name: analysis.product_name.clone(),
            current_price: baseline.current_price,
            projection,
        })
    }

    #[instrument(skip(self))]
    pub async fn competitor_move(
        &self,
        product_name: &str,
        competitor_price_drop_pct: f64,
    ) -> Result<ProductScenario<CompetitorScenario>, ServiceError> {
        let analysis = self.analysis.analyze(product_name).await?;
        let baseline = analysis.baseline();
        let projection = simulator::simulate_competitor_move(
            &baseline,
            competitor_price_drop_pct,
            self.analytics.cross_elasticity,
        );
        Ok(ProductScenario {
            product_name: analysis.product_name.clone(),
            current_price: baseline.current_price,
            projection,
        })
    }

    #[instrument(skip(self))]
    pub async fn marketing_campaign(
        &self,
        product_name: &str,
        ad_spend: f64,
        expected_lift_pct: f64,
    ) -> Result<ProductScenario<MarketingScenario>, ServiceError> {
        let analysis = self.analysis.analyze(product_name).await?;
        let baseline = analysis.baseline();
        let projection =
            simulator::simulate_marketing_campaign(&baseline, ad_spend, expected_lift_pct);
        Ok(ProductScenario {
            product_name: analysis.product_name.clone(),
            current_price: baseline.current_price,
            projection,
        })
    }

    /// Apply a scenario across a segment of the catalog. Baselines are
    /// gathered concurrently; totals are plain sums so the reduction is
    /// order-independent. Marketing ad spend is a store-wide cost
    /// subtracted once, never split per product.
    #[instrument(skip(self))]
    pub async fn global_scenario(
        &self,
        scenario: GlobalScenario,
        segment: Segment,
    ) -> Result<GlobalScenarioOutcome, ServiceError> {
        if let GlobalScenario::Promotion {
            discount_pct,
            duration_days,
        } = &scenario
        {
            if !(0.0..=MAX_DISCOUNT_PCT).contains(discount_pct) {
                return Err(ServiceError::InvalidInput(format!(
                    "Discount must be between 0 and {MAX_DISCOUNT_PCT} percent, got {discount_pct}"
                )));
            }
            if !(1..=MAX_DURATION_DAYS).contains(duration_days) {
                return Err(ServiceError::InvalidInput(format!(
                    "Promotion duration must be between 1 and {MAX_DURATION_DAYS} days, got {duration_days}"
                )));
            }
        }

        let baselines = self.segment_baselines(segment).await?;
        let products_impacted = baselines.len();

        let mut total_rev_base = 0.0;
        let mut total_rev_delta = 0.0;
        let mut total_demand_base = 0.0;
        let mut total_demand_delta = 0.0;
        let mut marketing_daily_lift = 0.0;

        for baseline in &baselines {
            match &scenario {
                GlobalScenario::PriceChange { pct_change } => {
                    let new_price = baseline.current_price * (1.0 + pct_change / 100.0);
                    let result = simulator::simulate_price_impact(
                        baseline,
                        new_price,
                        self.analytics.price_elasticity,
                    );

                    let base_rev =
                        baseline.current_demand * baseline.current_price * GLOBAL_PROJECTION_DAYS;
                    let new_rev = result.new_demand as f64 * new_price * GLOBAL_PROJECTION_DAYS;
                    total_rev_base += base_rev;
                    total_rev_delta += new_rev - base_rev;

                    total_demand_base += baseline.current_demand * GLOBAL_PROJECTION_DAYS;
                    total_demand_delta += (result.new_demand as f64 - baseline.current_demand)
                        * GLOBAL_PROJECTION_DAYS;
                }
                GlobalScenario::Promotion {
                    discount_pct,
                    duration_days,
                } => {
                    let result = simulator::simulate_promotion(
                        baseline,
                        *discount_pct,
                        *duration_days,
                        self.analytics.promotion_lift_factor,
                    );
                    total_rev_delta += result.revenue_impact;
                    total_rev_base += baseline.current_demand
                        * baseline.current_price
                        * *duration_days as f64;

                    let base_demand = baseline.current_demand * *duration_days as f64;
                    total_demand_base += base_demand;
                    total_demand_delta += result.lift_pct / 100.0 * base_demand;
                }
                GlobalScenario::Marketing { lift_pct, .. } => {
                    // Spend is store-wide; projected with zero spend here
                    // and settled once below.
                    let result = simulator::simulate_marketing_campaign(baseline, 0.0, *lift_pct);
                    marketing_daily_lift += result.daily_revenue_increase;
                }
            }
        }

        let summary = match scenario {
            GlobalScenario::Marketing { ad_spend, lift_pct } => {
                let total_revenue_change = marketing_daily_lift * GLOBAL_PROJECTION_DAYS;
                let net_profit_impact = total_revenue_change - ad_spend;
                let spend_base = if ad_spend > 0.0 { ad_spend } else { 1.0 };
                GlobalSummary {
                    total_revenue_change: round2(total_revenue_change),
                    revenue_change_pct: round1(total_revenue_change / spend_base * 100.0),
                    demand_change_pct: lift_pct,
                    net_profit_impact: Some(round2(net_profit_impact)),
                    action: if net_profit_impact > 0.0 {
                        GlobalAction::Positive
                    } else {
                        GlobalAction::Negative
                    },
                }
            }
            _ => {
                let revenue_change_pct = if total_rev_base > 0.0 {
                    total_rev_delta / total_rev_base * 100.0
                } else {
                    0.0
                };
                let demand_change_pct = if total_demand_base > 0.0 {
                    total_demand_delta / total_demand_base * 100.0
                } else {
                    0.0
                };
                GlobalSummary {
                    total_revenue_change: round2(total_rev_delta),
                    revenue_change_pct: round1(revenue_change_pct),
                    demand_change_pct: round1(demand_change_pct),
                    net_profit_impact: None,
                    action: if total_rev_delta > 0.0 {
                        GlobalAction::Positive
                    } else {
                        GlobalAction::Negative
                    },
                }
            }
        };

        Ok(GlobalScenarioOutcome {
            products_impacted,
            summary,
        })
    }

    /// Baselines for every product in the segment, capped at the configured
    /// sample size. Products that fail to analyze are skipped.
    async fn segment_baselines(
        &self,
        segment: Segment,
    ) -> Result<Vec<crate::analytics::simulator::ScenarioBaseline>, ServiceError> {
        let names = self.analysis.product_names().await?;
        let analyses = join_all(names.iter().map(|name| self.analysis.analyze(name))).await;

        let baselines = names
            .iter()
            .zip(analyses)
            .filter_map(|(name, outcome)| match outcome {
                Ok(analysis) => {
                    let keep = match segment {
                        Segment::All => true,
                        Segment::HighRisk => analysis.risk.risk_level == RiskLevel::HighRisk,
                        Segment::Opportunity => {
                            analysis.risk.risk_level == RiskLevel::Opportunity
                        }
                    };
                    keep.then(|| analysis.baseline())
                }
                Err(err) => {
                    warn!(product = %name, error = %err, "skipping product in global scenario");
                    None
                }
            })
            .take(self.analytics.global_sample_limit)
            .collect();

        Ok(baselines)
    }
}
