//! Property-based tests for the analytics core. These verify the invariants
//! the pipeline promises for arbitrary inputs: no panics, documented
//! sentinels instead of divisions by zero, and deterministic outputs.

use chrono::NaiveDate;
use proptest::prelude::*;

use shelfsense_api::analytics::forecasting::forecast;
use shelfsense_api::analytics::risk::{classify, compute_metrics};
use shelfsense_api::analytics::simulator::{
    simulate_inventory_change, simulate_marketing_campaign, simulate_price_impact,
    simulate_promotion, ScenarioBaseline,
};
use shelfsense_api::analytics::DailyRecord;

fn history_strategy() -> impl Strategy<Value = Vec<DailyRecord>> {
    prop::collection::vec((0i32..500, 0i32..10_000, 1u32..10_000), 0..60).prop_map(|rows| {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        rows.into_iter()
            .enumerate()
            .map(|(offset, (sold, inventory, price_cents))| DailyRecord {
                date: start + chrono::Duration::days(offset as i64),
                units_sold: sold,
                inventory_level: inventory,
                price: price_cents as f64 / 100.0,
                expiry_date: None,
                category: "Grocery".to_string(),
            })
            .collect()
    })
}

fn baseline_strategy() -> impl Strategy<Value = ScenarioBaseline> {
    (1u32..100_000, 0u32..10_000, 0u32..10_000, 0u32..2_000).prop_map(
        |(price_cents, demand, forecast_demand, stock_days_tenths)| ScenarioBaseline {
            current_price: price_cents as f64 / 100.0,
            current_demand: demand as f64,
            forecast_demand: forecast_demand as f64,
            current_stock_days: stock_days_tenths as f64 / 10.0,
        },
    )
}

proptest! {
    #[test]
    fn forecast_never_panics_and_projections_are_floored(history in history_strategy()) {
        let result = forecast(&history, 7);
        prop_assert_eq!(result.next_days.len(), 7);
        prop_assert!(result.next_days.iter().all(|&d| d >= 1));
        prop_assert!(result.confidence_score >= 0.1);
        prop_assert!(result.confidence_score <= 1.0);
        prop_assert!(result.trend_pct.is_finite());
    }

    #[test]
    fn days_of_stock_identity_holds(history in history_strategy(), avg_tenths in 0u32..1_000) {
        let avg = avg_tenths as f64 / 10.0;
        let metrics = compute_metrics(&history, avg);
        let inventory = history.last().map(|r| r.inventory_level).unwrap_or(0) as f64;
        if avg > 0.0 {
            prop_assert!((metrics.days_of_stock - inventory / avg).abs() < 1e-9);
        } else {
            prop_assert_eq!(metrics.days_of_stock, 999.0);
        }
    }

    #[test]
    fn stockout_proxy_stays_in_unit_range(history in history_strategy()) {
        let metrics = compute_metrics(&history, 1.0);
        prop_assert!((0.0..=1.0).contains(&metrics.stockout_risk));
    }

    #[test]
    fn classification_is_a_pure_function(history in history_strategy()) {
        let fc = forecast(&history, 7);
        let as_of = history.last().map(|r| r.date)
            .unwrap_or_else(|| NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let first = classify(&history, &fc, as_of);
        let second = classify(&history, &fc, as_of);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn unit_elasticity_negates_price_change(baseline in baseline_strategy(), new_price_cents in 1u32..100_000) {
        let new_price = new_price_cents as f64 / 100.0;
        let result = simulate_price_impact(&baseline, new_price, 1.0);
        prop_assert!((result.demand_change_pct + result.price_change_pct).abs() < 1e-6);
    }

    #[test]
    fn zero_discount_promotions_never_move_revenue(baseline in baseline_strategy(), duration in 1u32..30) {
        let result = simulate_promotion(&baseline, 0.0, duration, 2.0);
        prop_assert_eq!(result.lift_pct, 0.0);
        prop_assert_eq!(result.revenue_impact, 0.0);
    }

    #[test]
    fn inventory_projection_is_always_finite(baseline in baseline_strategy(), new_days_tenths in 0i32..5_000) {
        let result = simulate_inventory_change(&baseline, new_days_tenths as f64 / 10.0);
        prop_assert!(result.stock_change_pct.is_finite());
        prop_assert!(result.holding_cost_change.is_finite());
        prop_assert!((0.0..=40.0).contains(&result.stockout_risk_reduction));
    }

    #[test]
    fn campaign_breakeven_is_positive_or_sentinel(baseline in baseline_strategy(), spend in 0u32..100_000, lift in -100i32..500) {
        let result = simulate_marketing_campaign(&baseline, spend as f64, lift as f64);
        prop_assert!(result.break_even_days >= 0.0);
        if result.daily_revenue_increase <= 0.0 {
            prop_assert_eq!(result.break_even_days, 999.0);
        }
    }
}
