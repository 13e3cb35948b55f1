use serde::{Deserialize, Serialize};
use strum::Display;

use super::{least_squares_slope, mean, round1, round2, sales_series, stdev, DailyRecord};

/// Observations used by the trend fit.
const TREND_WINDOW: usize = 14;
/// Minimum observations before a trend is reported.
const TREND_MIN_POINTS: usize = 7;
/// Width of the trailing moving average.
const MOVING_AVG_WINDOW: usize = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum ConfidenceTier {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    /// Weekly demand trend as a percentage of the recent mean
    pub trend_pct: f64,
    pub confidence_score: f64,
    pub confidence_tier: ConfidenceTier,
    /// Projected unit sales for the next `horizon` days
    pub next_days: Vec<i64>,
    /// Most recent value of the 7-point trailing moving average
    pub last_7d_avg: f64,
}

/// Forecast demand from a chronologically ordered daily history.
///
/// A 7-point trailing moving average smooths the series; the trend is a
/// least-squares slope over the last 14 observations normalized by the
/// window mean. Volatility (coefficient of variation over the full history)
/// drives the confidence score. Empty history degrades to zeros.
pub fn forecast(history: &[DailyRecord], horizon: u32) -> ForecastResult {
    let sales = sales_series(history);

    let last_avg = last_moving_average(&sales);
    let trend_pct = trend_percentage(&sales);
    let volatility = coefficient_of_variation(&sales);

    let confidence = (1.0 - volatility.min(0.5)).max(0.1);
    let confidence_tier = if confidence > 0.7 {
        ConfidenceTier::High
    } else if confidence > 0.4 {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    };

    let next_days = (1..=horizon as i64)
        .map(|day| {
            let projected = last_avg * (1.0 + (trend_pct / 100.0) * day as f64 / 7.0);
            (projected.trunc() as i64).max(1)
        })
        .collect();

    ForecastResult {
        trend_pct: round1(trend_pct),
        confidence_score: round2(confidence),
        confidence_tier,
        next_days,
        last_7d_avg: round1(last_avg),
    }
}

/// Last value of the trailing moving average, with a minimum period of one
/// observation. Falls back to the raw mean when the series is shorter than
/// the window, and to zero when it is empty.
fn last_moving_average(sales: &[f64]) -> f64 {
    if sales.is_empty() {
        return 0.0;
    }
    let start = sales.len().saturating_sub(MOVING_AVG_WINDOW);
    mean(&sales[start..])
}

fn trend_percentage(sales: &[f64]) -> f64 {
    let start = sales.len().saturating_sub(TREND_WINDOW);
    let window = &sales[start..];
    if window.len() < TREND_MIN_POINTS {
        return 0.0;
    }
    let avg = mean(window);
    if avg <= 0.0 {
        return 0.0;
    }
    least_squares_slope(window) / avg.max(1.0) * 100.0
}

fn coefficient_of_variation(sales: &[f64]) -> f64 {
    let m = mean(sales);
    let sd = stdev(sales);
    if sd > 0.0 && m > 0.0 {
        sd / m
    } else {
        0.0
    }
}
