use serde::{Deserialize, Serialize};
use strum::Display;

use super::pricing::PriceAction;
use super::{round1, round2};

/// Sentinel break-even horizon when a campaign never pays back.
pub const BREAK_EVEN_SENTINEL: f64 = 999.0;

/// Current (pre-change) metrics a what-if projection is measured against.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioBaseline {
    pub current_price: f64,
    /// Average daily demand over the last 7 days
    pub current_demand: f64,
    /// Mean of the projected daily demand over the forecast horizon
    pub forecast_demand: f64,
    pub current_stock_days: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum PromotionVerdict {
    Run,
    Modify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitorResponse {
    MatchPrice,
    Monitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CampaignVerdict {
    RunCampaign,
    ReduceCost,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceScenario {
    pub price_change_pct: f64,
    pub demand_change_pct: f64,
    pub new_demand: i64,
    pub forecast_new: i64,
    pub revenue_change_pct: f64,
    pub recommendation: PriceAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromotionScenario {
    pub discount_pct: f64,
    pub lift_pct: f64,
    pub predicted_daily_sales: i64,
    pub revenue_impact: f64,
    pub is_profitable: bool,
    pub recommendation: PromotionVerdict,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryScenario {
    pub stock_change_pct: f64,
    pub stockout_risk_reduction: f64,
    pub holding_cost_change: f64,
    pub lost_sales_risk_pct: f64,
    pub recommendation: PriceAction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitorScenario {
    pub competitor_drop_pct: f64,
    pub demand_impact_pct: f64,
    pub projected_demand: i64,
    pub revenue_impact_pct: f64,
    pub recommendation: CompetitorResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketingScenario {
    pub ad_spend: f64,
    pub lift_pct: f64,
    pub daily_revenue_increase: f64,
    pub break_even_days: f64,
    pub recommendation: CampaignVerdict,
}

/// Project a price change through a constant-elasticity demand response.
/// Revenue decides the verdict: any gain reads INCREASE (proceed), a loss
/// beyond 5% reads DECREASE (reject), anything between holds.
pub fn simulate_price_impact(
    baseline: &ScenarioBaseline,
    new_price: f64,
    elasticity: f64,
) -> PriceScenario {
    let price_change_pct = if baseline.current_price > 0.0 {
        (new_price - baseline.current_price) / baseline.current_price * 100.0
    } else {
        0.0
    };

    let demand_change_pct = -elasticity * price_change_pct;
    let new_demand = baseline.current_demand * (1.0 + demand_change_pct / 100.0);
    let forecast_new = baseline.forecast_demand * (1.0 + demand_change_pct / 100.0);

    let current_revenue = baseline.current_demand * baseline.current_price;
    let new_revenue = new_demand * new_price;
    let revenue_change_pct = if current_revenue > 0.0 {
        (new_revenue - current_revenue) / current_revenue * 100.0
    } else {
        0.0
    };

    let recommendation = if revenue_change_pct > 0.0 {
        PriceAction::Increase
    } else if revenue_change_pct < -5.0 {
        PriceAction::Decrease
    } else {
        PriceAction::Hold
    };

    PriceScenario {
        price_change_pct: round1(price_change_pct),
        demand_change_pct: round1(demand_change_pct),
        new_demand: new_demand.max(0.0) as i64,
        forecast_new: forecast_new.max(0.0) as i64,
        revenue_change_pct: round1(revenue_change_pct),
        recommendation,
    }
}

/// Project a time-boxed promotion. Each discount point lifts daily sales by
/// `lift_factor` points; revenue over the duration at the discounted price
/// is compared against the undiscounted baseline.
pub fn simulate_promotion(
    baseline: &ScenarioBaseline,
    discount_pct: f64,
    duration_days: u32,
    lift_factor: f64,
) -> PromotionScenario {
    let lift_pct = discount_pct * lift_factor;

    let predicted_daily_sales = baseline.current_demand * (1.0 + lift_pct / 100.0);
    let total_units = predicted_daily_sales * duration_days as f64;

    let discounted_price = baseline.current_price * (1.0 - discount_pct / 100.0);
    let total_revenue = total_units * discounted_price;

    let baseline_revenue =
        baseline.current_demand * duration_days as f64 * baseline.current_price;
    let revenue_change = total_revenue - baseline_revenue;

    PromotionScenario {
        discount_pct,
        lift_pct,
        predicted_daily_sales: predicted_daily_sales as i64,
        revenue_impact: round2(revenue_change),
        is_profitable: revenue_change > 0.0,
        recommendation: if revenue_change > 0.0 {
            PromotionVerdict::Run
        } else {
            PromotionVerdict::Modify
        },
    }
}

/// Project moving the stock level to `new_stock_days` of cover. Stockout
/// risk reduction applies only when increasing and diminishes past 40;
/// lost-sales risk activates only when dropping below a 7-day floor from
/// at or above it. A zero-day baseline is measured against one day so the
/// change stays finite.
pub fn simulate_inventory_change(
    baseline: &ScenarioBaseline,
    new_stock_days: f64,
) -> InventoryScenario {
    let current_days = baseline.current_stock_days;
    let denom = if current_days > 0.0 { current_days } else { 1.0 };
    let stock_change_pct = (new_stock_days - current_days) / denom * 100.0;

    let stockout_risk_reduction = if stock_change_pct > 0.0 {
        (stock_change_pct.abs() * 0.8).min(40.0)
    } else {
        0.0
    };

    let holding_cost_change =
        (new_stock_days - current_days) * baseline.current_demand * baseline.current_price * 0.001;

    let lost_sales_risk_pct = if new_stock_days < 7.0 && current_days >= 7.0 {
        (7.0 - new_stock_days) * 5.0
    } else {
        0.0
    };

    let recommendation = if stock_change_pct > 0.0 && stockout_risk_reduction > 20.0 {
        PriceAction::Increase
    } else if stock_change_pct < 0.0 && holding_cost_change > 10.0 {
        PriceAction::Decrease
    } else {
        PriceAction::Hold
    };

    InventoryScenario {
        stock_change_pct: round1(stock_change_pct),
        stockout_risk_reduction: round1(stockout_risk_reduction),
        holding_cost_change: round2(holding_cost_change),
        lost_sales_risk_pct: round1(lost_sales_risk_pct),
        recommendation,
    }
}

/// Project a competitor's price drop through cross-elasticity. Our price is
/// unchanged, so revenue moves linearly with the demand we lose.
pub fn simulate_competitor_move(
    baseline: &ScenarioBaseline,
    competitor_price_drop_pct: f64,
    cross_elasticity: f64,
) -> CompetitorScenario {
    let demand_drop_pct = competitor_price_drop_pct * cross_elasticity;
    let projected_demand = baseline.current_demand * (1.0 - demand_drop_pct / 100.0);

    CompetitorScenario {
        competitor_drop_pct: competitor_price_drop_pct,
        demand_impact_pct: -round1(demand_drop_pct),
        projected_demand: projected_demand.max(0.0) as i64,
        revenue_impact_pct: -round1(demand_drop_pct),
        recommendation: if demand_drop_pct > 10.0 {
            CompetitorResponse::MatchPrice
        } else {
            CompetitorResponse::Monitor
        },
    }
}

/// Project a marketing campaign's payback. Break-even is the ad spend
/// divided by the daily revenue lift, with a sentinel when the lift is
/// non-positive.
pub fn simulate_marketing_campaign(
    baseline: &ScenarioBaseline,
    ad_spend: f64,
    expected_lift_pct: f64,
) -> MarketingScenario {
    let new_daily_sales = baseline.current_demand * (1.0 + expected_lift_pct / 100.0);
    let daily_revenue_lift = (new_daily_sales - baseline.current_demand) * baseline.current_price;

    let break_even_days = if daily_revenue_lift > 0.0 {
        round1(ad_spend / daily_revenue_lift)
    } else {
        BREAK_EVEN_SENTINEL
    };

    MarketingScenario {
        ad_spend,
        lift_pct: expected_lift_pct,
        daily_revenue_increase: round2(daily_revenue_lift),
        break_even_days,
        recommendation: if break_even_days < 7.0 {
            CampaignVerdict::RunCampaign
        } else {
            CampaignVerdict::ReduceCost
        },
    }
}
