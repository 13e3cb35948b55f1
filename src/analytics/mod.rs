//! Pure, side-effect-free computation over a product's daily history.
//!
//! Every function in this module is deterministic in its inputs and safe to
//! run in parallel across products. Degenerate inputs (empty history, zero
//! means) never panic; they fall back to documented sentinels.

pub mod forecasting;
pub mod pricing;
pub mod recommendation;
pub mod risk;
pub mod seasonality;
pub mod simulator;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Sentinel days-of-stock when average daily sales are zero.
pub const DAYS_OF_STOCK_SENTINEL: f64 = 999.0;

/// One day of a product's history, as read from the time-series store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    pub units_sold: i32,
    pub inventory_level: i32,
    pub price: f64,
    pub expiry_date: Option<NaiveDate>,
    pub category: String,
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation; 0 for fewer than two observations.
pub(crate) fn stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

/// Slope of the degree-1 least-squares fit of `values` against 0..n.
pub(crate) fn least_squares_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);
    let mut num = 0.0;
    let mut den = 0.0;
    for (i, y) in values.iter().enumerate() {
        let dx = i as f64 - x_mean;
        num += dx * (y - y_mean);
        den += dx * dx;
    }
    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

pub(crate) fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn round3(v: f64) -> f64 {
    (v * 1000.0).round() / 1000.0
}

pub(crate) fn sales_series(history: &[DailyRecord]) -> Vec<f64> {
    history.iter().map(|r| r.units_sold as f64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_empty_is_zero() {
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn stdev_needs_two_points() {
        assert_eq!(stdev(&[5.0]), 0.0);
        assert!(stdev(&[1.0, 3.0]) > 0.0);
    }

    #[test]
    fn slope_of_linear_series_is_exact() {
        let values = [2.0, 4.0, 6.0, 8.0];
        assert!((least_squares_slope(&values) - 2.0).abs() < 1e-9);
    }

    #[test]
    fn slope_of_constant_series_is_zero() {
        let values = [5.0, 5.0, 5.0, 5.0];
        assert_eq!(least_squares_slope(&values), 0.0);
    }
}
