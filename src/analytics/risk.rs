use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;

use super::forecasting::ForecastResult;
use super::{mean, round1, stdev, DailyRecord, DAYS_OF_STOCK_SENTINEL};

/// Width of the trailing window the metrics block is computed over.
const METRICS_WINDOW: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum RiskLevel {
    #[serde(rename = "HIGH_RISK")]
    #[strum(serialize = "HIGH_RISK")]
    HighRisk,
    #[serde(rename = "OPPORTUNITY")]
    #[strum(serialize = "OPPORTUNITY")]
    Opportunity,
    #[serde(rename = "MEDIUM_RISK")]
    #[strum(serialize = "MEDIUM_RISK")]
    MediumRisk,
    #[serde(rename = "STABLE")]
    #[strum(serialize = "STABLE")]
    Stable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ExpiryRisk {
    None,
    Medium,
    High,
    Critical,
}

/// Trailing-window metrics feeding the classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// Mean daily sales over the trailing window
    pub window_avg_sales: f64,
    /// Percent change of the last 7 days against the preceding 7
    pub trend_7d: f64,
    /// Percent change of the last 30 days against the preceding 30
    pub trend_30d: f64,
    /// Coefficient of variation of sales over the window
    pub volatility: f64,
    /// Time-to-stockout estimate from the 7-day average
    pub days_of_stock: f64,
    /// Coarse stockout probability proxy in [0, 1]
    pub stockout_risk: f64,
    /// 1 minus the price coefficient of variation
    pub price_stability: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    pub risk_level: RiskLevel,
    pub risk_score: u32,
    pub opportunity_score: u32,
    pub days_of_stock: f64,
    pub expiry_risk: ExpiryRisk,
    pub reason: String,
    pub recommended_action: String,
    pub avg_daily_sales: f64,
    pub current_inventory: i32,
}

/// Compute the trailing metrics block. `last_7d_avg` comes from the
/// forecast so days-of-stock agrees with the projection baseline.
pub fn compute_metrics(history: &[DailyRecord], last_7d_avg: f64) -> RiskMetrics {
    let start = history.len().saturating_sub(METRICS_WINDOW);
    let window = &history[start..];

    let sales: Vec<f64> = window.iter().map(|r| r.units_sold as f64).collect();
    let prices: Vec<f64> = window.iter().map(|r| r.price).collect();
    let inventories: Vec<f64> = window.iter().map(|r| r.inventory_level as f64).collect();

    let current_inventory = history.last().map(|r| r.inventory_level).unwrap_or(0);

    let sales_mean = mean(&sales);
    let price_mean = mean(&prices);

    let days_of_stock = if last_7d_avg > 0.0 {
        current_inventory as f64 / last_7d_avg
    } else {
        DAYS_OF_STOCK_SENTINEL
    };

    RiskMetrics {
        window_avg_sales: sales_mean,
        trend_7d: trend_over(&sales, 7),
        trend_30d: trend_over(&sales, 30),
        volatility: if sales_mean > 0.0 {
            stdev(&sales) / sales_mean
        } else {
            0.0
        },
        days_of_stock,
        stockout_risk: stockout_risk(&sales, &inventories),
        price_stability: if price_mean > 0.0 {
            1.0 - stdev(&prices) / price_mean
        } else {
            1.0
        },
    }
}

/// Percent change of the trailing `days` mean against the mean of the
/// equal-length preceding window. Zero when history is insufficient or the
/// preceding window's mean is zero.
fn trend_over(sales: &[f64], days: usize) -> f64 {
    if sales.len() < days {
        return 0.0;
    }
    let recent = &sales[sales.len() - days..];
    let older = if sales.len() >= days * 2 {
        &sales[sales.len() - days * 2..sales.len() - days]
    } else {
        &sales[..days]
    };
    let older_mean = mean(older);
    if older.is_empty() || older_mean == 0.0 {
        return 0.0;
    }
    (mean(recent) - older_mean) / older_mean * 100.0
}

/// Stockout probability proxy: a z-score-like comparison of mean inventory
/// against mean sales, mapped through a normal-approximation curve and
/// clamped to [0, 1]. Zero when there are no sales at all.
fn stockout_risk(sales: &[f64], inventories: &[f64]) -> f64 {
    let sales_mean = mean(sales);
    if sales_mean == 0.0 {
        return 0.0;
    }
    let z = (mean(inventories) - sales_mean) / (stdev(sales) + 1e-6);
    (0.5 - 0.2 * z).clamp(0.0, 1.0)
}

fn recommended_action(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::HighRisk => "Discount by 15-20% to clear excess stock",
        RiskLevel::Opportunity => "Increase inventory to meet demand",
        RiskLevel::MediumRisk => "Monitor closely for 7 days",
        RiskLevel::Stable => "Maintain current levels",
    }
}

/// Classify a product's inventory/expiry posture from its history and
/// forecast. `as_of` anchors the expiry countdown; callers pass the last
/// recorded date so the result is a pure function of its inputs.
pub fn classify(history: &[DailyRecord], forecast: &ForecastResult, as_of: NaiveDate) -> RiskResult {
    let metrics = compute_metrics(history, forecast.last_7d_avg);

    let mut risk_score: u32 = 0;
    let mut opportunity_score: u32 = 0;

    let mut expiry_risk = ExpiryRisk::None;
    let mut expiry_message = String::new();

    if let Some(expiry) = history.last().and_then(|r| r.expiry_date) {
        let days_to_expiry = (expiry - as_of).num_days();
        if days_to_expiry <= 1 {
            expiry_risk = ExpiryRisk::Critical;
            risk_score += 100;
            expiry_message = format!(
                "CRITICAL: Product expires in {days_to_expiry} days! Clearance required."
            );
        } else if days_to_expiry <= 3 {
            expiry_risk = ExpiryRisk::High;
            risk_score += 50;
            expiry_message =
                format!("WARNING: Product expires in {days_to_expiry} days. Promotion required.");
        } else if days_to_expiry <= 7 {
            expiry_risk = ExpiryRisk::Medium;
            risk_score += 20;
            expiry_message = format!("NOTICE: Product expiring soon ({days_to_expiry} days).");
        }
    }

    if metrics.trend_7d < -10.0 {
        risk_score += 30;
    }
    if metrics.days_of_stock > 25.0 {
        risk_score += 25;
    }
    if metrics.stockout_risk > 0.3 {
        risk_score += 20;
    }
    if metrics.volatility > 0.4 {
        risk_score += 15;
    }

    if metrics.trend_7d > 15.0 {
        opportunity_score += 30;
    }
    if metrics.days_of_stock < 7.0 {
        opportunity_score += 25;
    }
    if forecast.trend_pct > 10.0 {
        opportunity_score += 20;
    }
    if metrics.volatility < 0.2 && metrics.trend_7d > 5.0 {
        opportunity_score += 15;
    }

    let risk_level = if risk_score >= 60 && opportunity_score < 30 {
        RiskLevel::HighRisk
    } else if opportunity_score >= 60 && risk_score < 30 {
        RiskLevel::Opportunity
    } else if risk_score > opportunity_score {
        RiskLevel::MediumRisk
    } else {
        // Both the favorable (opportunity > risk) and neutral (tie)
        // outcomes present as STABLE.
        RiskLevel::Stable
    };

    let action = recommended_action(risk_level).to_string();
    let reason = if expiry_message.is_empty() {
        action.clone()
    } else {
        format!("{expiry_message} {action}")
    };

    RiskResult {
        risk_level,
        risk_score,
        opportunity_score,
        days_of_stock: round1(metrics.days_of_stock),
        expiry_risk,
        reason,
        recommended_action: action,
        avg_daily_sales: round1(metrics.window_avg_sales),
        current_inventory: history.last().map(|r| r.inventory_level).unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::forecasting::forecast;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).unwrap()
    }

    fn record(day: u32, sold: i32, inventory: i32) -> DailyRecord {
        DailyRecord {
            date: date(day),
            units_sold: sold,
            inventory_level: inventory,
            price: 20.0,
            expiry_date: None,
            category: "Grocery".into(),
        }
    }

    #[test]
    fn zero_sales_yield_sentinel_days_of_stock() {
        let history: Vec<_> = (1..=10).map(|d| record(d, 0, 50)).collect();
        let metrics = compute_metrics(&history, 0.0);
        assert_eq!(metrics.days_of_stock, DAYS_OF_STOCK_SENTINEL);
        assert_eq!(metrics.stockout_risk, 0.0);
    }

    #[test]
    fn days_of_stock_is_inventory_over_average() {
        let history: Vec<_> = (1..=10).map(|d| record(d, 10, 30)).collect();
        let metrics = compute_metrics(&history, 10.0);
        assert!((metrics.days_of_stock - 3.0).abs() < 1e-9);
    }

    #[test]
    fn trend_compares_against_preceding_window() {
        // 7 days at 10 followed by 7 days at 20: +100% weekly trend.
        let mut sales = vec![10.0; 7];
        sales.extend(vec![20.0; 7]);
        assert!((trend_over(&sales, 7) - 100.0).abs() < 1e-9);
    }

    #[test]
    fn trend_with_insufficient_history_is_zero() {
        assert_eq!(trend_over(&[5.0, 6.0, 7.0], 7), 0.0);
    }

    #[test]
    fn strong_demand_and_low_stock_classify_as_opportunity() {
        // Steady ramp: trend_7d well above 15, forecast growth above 10,
        // and under 2 days of stock left.
        let history: Vec<_> = (1..=14).map(|d| record(d, d as i32 * 2, 30)).collect();
        let fc = forecast(&history, 7);
        assert!(fc.trend_pct > 10.0);
        let result = classify(&history, &fc, date(14));
        assert_eq!(result.risk_level, RiskLevel::Opportunity);
        assert!(result.opportunity_score >= 60);
        assert!(result.risk_score < 30);
    }

    #[test]
    fn imminent_expiry_forces_high_risk() {
        let mut history: Vec<_> = (1..=14).map(|d| record(d, 10, 30)).collect();
        for r in &mut history {
            r.expiry_date = Some(date(15));
        }
        let fc = forecast(&history, 7);
        let result = classify(&history, &fc, date(14));
        assert_eq!(result.expiry_risk, ExpiryRisk::Critical);
        assert_eq!(result.risk_level, RiskLevel::HighRisk);
        assert!(result.risk_score >= 100);
        assert!(result.reason.starts_with("CRITICAL"));
    }

    #[test]
    fn classification_is_deterministic() {
        let history: Vec<_> = (1..=20).map(|d| record(d, 5, 200)).collect();
        let fc = forecast(&history, 7);
        let a = classify(&history, &fc, date(20));
        let b = classify(&history, &fc, date(20));
        assert_eq!(a, b);
    }

    #[test]
    fn empty_history_classifies_without_panicking() {
        let fc = forecast(&[], 7);
        let result = classify(&[], &fc, date(1));
        assert_eq!(result.days_of_stock, DAYS_OF_STOCK_SENTINEL);
        assert_eq!(result.current_inventory, 0);
    }
}
