use serde::{Deserialize, Serialize};
use strum::Display;

use super::forecasting::ForecastResult;
use super::risk::{RiskLevel, RiskResult};
use super::{mean, round2, round3, stdev, DailyRecord};

/// Prices considered for the volatility check.
const PRICE_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum PriceAction {
    Increase,
    Decrease,
    Hold,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingResult {
    pub action: PriceAction,
    pub suggested_change_pct: f64,
    pub current_price: f64,
    pub suggested_price: f64,
    pub reason: String,
    pub price_volatility: f64,
}

/// Rule-based pricing action. The table is evaluated top-down; the first
/// matching rule wins.
pub fn recommend(
    history: &[DailyRecord],
    forecast: &ForecastResult,
    risk: &RiskResult,
) -> PricingResult {
    let prices: Vec<f64> = history.iter().map(|r| r.price).collect();
    let current_price = prices.last().copied().unwrap_or(0.0);

    let start = prices.len().saturating_sub(PRICE_WINDOW);
    let recent_prices = &prices[start..];
    let price_volatility = if recent_prices.len() > 1 {
        let m = mean(recent_prices);
        if m > 0.0 {
            stdev(recent_prices) / m
        } else {
            0.0
        }
    } else {
        0.0
    };

    let trend = forecast.trend_pct;
    let days_of_stock = risk.days_of_stock;

    let (action, change_pct, reason) = if risk.risk_level == RiskLevel::HighRisk
        && days_of_stock > 21.0
    {
        (
            PriceAction::Decrease,
            -10.0,
            "High overstock risk - consider promotional pricing to clear inventory",
        )
    } else if risk.risk_level == RiskLevel::Opportunity && trend > 15.0 {
        (
            PriceAction::Increase,
            5.0,
            "Strong demand with low inventory - opportunity for margin improvement",
        )
    } else if trend > 10.0 && days_of_stock < 10.0 {
        (
            PriceAction::Increase,
            3.0,
            "Growing demand with limited stock - small price increase recommended",
        )
    } else if trend < -10.0 && days_of_stock > 14.0 {
        (
            PriceAction::Decrease,
            -7.0,
            "Falling demand with excess stock - consider price reduction",
        )
    } else if trend.abs() < 5.0 && days_of_stock > 7.0 && days_of_stock < 14.0 {
        (
            PriceAction::Hold,
            0.0,
            "Stable market conditions - maintain current pricing",
        )
    } else if price_volatility > 0.15 {
        (
            PriceAction::Hold,
            0.0,
            "Recent price volatility - maintain stability before changing",
        )
    } else {
        (
            PriceAction::Hold,
            0.0,
            "Market conditions are balanced - no price change needed",
        )
    };

    PricingResult {
        action,
        suggested_change_pct: change_pct,
        current_price,
        suggested_price: round2(current_price * (1.0 + change_pct / 100.0)),
        reason: reason.to_string(),
        price_volatility: round3(price_volatility),
    }
}
