use serde::{Deserialize, Serialize};

use super::forecasting::{ConfidenceTier, ForecastResult};
use super::pricing::{PriceAction, PricingResult};
use super::risk::{ExpiryRisk, RiskLevel, RiskResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub inventory_action: String,
    pub pricing_guidance: String,
    pub summary: String,
    pub action_reason: String,
    pub confidence: ConfidenceTier,
    pub confidence_text: String,
}

fn confidence_text(tier: ConfidenceTier) -> &'static str {
    match tier {
        ConfidenceTier::High => "Strong confidence: data looks very stable.",
        ConfidenceTier::Medium => "Medium confidence: some ups and downs.",
        ConfidenceTier::Low => "Low confidence: sales are jumping around a lot.",
    }
}

/// Merge the forecast, risk, and pricing outputs into a plain-language
/// recommendation. Pure string templating; identical inputs always produce
/// identical text.
pub fn compose(
    forecast: &ForecastResult,
    risk: &RiskResult,
    pricing: &PricingResult,
) -> Recommendation {
    let days = risk.days_of_stock;

    let (inventory_action, action_reason) = match (risk.expiry_risk, risk.risk_level) {
        (ExpiryRisk::Critical, _) => ("Emergency Sale Required".to_string(), risk.reason.clone()),
        (ExpiryRisk::High, _) => ("Clearance Sale".to_string(), risk.reason.clone()),
        (_, RiskLevel::HighRisk) => (
            "Reduce Stock".to_string(),
            format!("Too much stock ({days} days) and fewer people are buying."),
        ),
        (_, RiskLevel::Opportunity) => (
            "Buy More Stock".to_string(),
            format!("Selling fast! Low stock ({days} days) and demand is going up."),
        ),
        _ => (
            "Keep as is".to_string(),
            format!("Stock levels are good ({days} days) and sales are steady."),
        ),
    };

    let pricing_guidance = match pricing.action {
        PriceAction::Increase => format!(
            "Try increasing price by {:.0}% to {:.2}",
            pricing.suggested_change_pct.abs(),
            pricing.suggested_price
        ),
        PriceAction::Decrease => format!(
            "Try reducing price by {:.0}% to {:.2}",
            pricing.suggested_change_pct.abs(),
            pricing.suggested_price
        ),
        PriceAction::Hold => format!("Keep price at {:.2}", pricing.current_price),
    };

    let trend_desc = if forecast.trend_pct > 0.0 {
        "rising"
    } else {
        "falling"
    };
    let summary = format!(
        "{inventory_action}. {pricing_guidance}. Customer interest is {trend_desc} by {:.1}%.",
        forecast.trend_pct.abs()
    );

    Recommendation {
        inventory_action,
        pricing_guidance,
        summary,
        action_reason,
        confidence: forecast.confidence_tier,
        confidence_text: confidence_text(forecast.confidence_tier).to_string(),
    }
}
