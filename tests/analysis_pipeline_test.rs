//! End-to-end pipeline tests: history in, forecast/risk/pricing/
//! recommendation out, with cache invalidation on ledger writes.

mod common;

use common::TestApp;
use shelfsense_api::analytics::risk::RiskLevel;
use shelfsense_api::entities::ledger_entry::TransactionType;
use shelfsense_api::errors::ServiceError;

/// 7 slow days followed by a rising week averaging 10/day. With 30 units on
/// hand this sits at exactly 3 days of stock with strong weekly growth.
const RISING_WEEK: [i32; 14] = [4, 4, 4, 4, 4, 4, 4, 7, 8, 9, 10, 11, 12, 13];

#[tokio::test]
async fn rising_demand_with_low_stock_is_an_opportunity() {
    let app = TestApp::new().await;
    let seeded = app.seed_product("Cold Brew", "Beverages", 6.0, 30).await;
    app.seed_history(seeded.id, &RISING_WEEK, 30, 6.0).await;

    let analysis = app
        .state
        .services
        .analysis
        .analyze("Cold Brew")
        .await
        .expect("analysis succeeds");

    assert_eq!(analysis.metrics.current_sales, 10.0);
    assert_eq!(analysis.risk.days_of_stock, 3.0);
    assert!(analysis.forecast.trend_pct > 10.0);
    assert_eq!(analysis.risk.risk_level, RiskLevel::Opportunity);
    assert!(analysis.risk.opportunity_score >= 60);
    assert!(analysis.risk.risk_score < 30);
    assert_eq!(analysis.recommendation.inventory_action, "Buy More Stock");
}

#[tokio::test]
async fn overstocked_falling_demand_is_flagged_as_risk() {
    let app = TestApp::new().await;
    // Choppy demand collapsing from ~18/day to 7/day with 400 units on
    // hand: weekly decline, heavy overstock, and high volatility.
    let sales = [25, 10, 25, 10, 25, 10, 25, 10, 3, 10, 3, 10, 3, 10];
    let seeded = app.seed_product("Fruit Cake", "Bakery", 12.0, 400).await;
    app.seed_history(seeded.id, &sales, 400, 12.0).await;

    let analysis = app
        .state
        .services
        .analysis
        .analyze("Fruit Cake")
        .await
        .expect("analysis succeeds");

    assert!(analysis.forecast.trend_pct < 0.0);
    assert!(analysis.risk.days_of_stock > 25.0);
    assert!(analysis.risk.risk_score >= 60);
    assert_eq!(analysis.risk.risk_level, RiskLevel::HighRisk);
    assert_eq!(
        analysis.pricing.suggested_change_pct, -10.0,
        "overstocked high risk should discount 10%"
    );
}

#[tokio::test]
async fn identical_histories_give_identical_results() {
    let app = TestApp::new().await;
    let a = app.seed_product("Twin A", "Grocery", 5.0, 30).await;
    let b = app.seed_product("Twin B", "Grocery", 5.0, 30).await;
    app.seed_history(a.id, &RISING_WEEK, 30, 5.0).await;
    app.seed_history(b.id, &RISING_WEEK, 30, 5.0).await;

    let ra = app.state.services.analysis.analyze("Twin A").await.unwrap();
    let rb = app.state.services.analysis.analyze("Twin B").await.unwrap();

    assert_eq!(ra.forecast, rb.forecast);
    assert_eq!(ra.risk.risk_level, rb.risk.risk_level);
    assert_eq!(ra.risk.risk_score, rb.risk.risk_score);
    assert_eq!(ra.risk.reason, rb.risk.reason);
    assert_eq!(ra.pricing, rb.pricing);
}

#[tokio::test]
async fn ledger_writes_invalidate_the_cached_analysis() {
    let app = TestApp::new().await;
    let seeded = app.seed_product("Granola", "Grocery", 7.0, 30).await;
    app.seed_history(seeded.id, &RISING_WEEK, 30, 7.0).await;

    let before = app
        .state
        .services
        .analysis
        .analyze("Granola")
        .await
        .unwrap();
    assert_eq!(before.metrics.current_inventory, 30);

    app.state
        .services
        .ledger
        .record_transaction("Granola", 100, TransactionType::Restock)
        .await
        .unwrap();

    let after = app
        .state
        .services
        .analysis
        .analyze("Granola")
        .await
        .unwrap();
    assert_eq!(after.metrics.current_inventory, 130);
    assert!(after.risk.days_of_stock > before.risk.days_of_stock);
}

#[tokio::test]
async fn cached_analysis_is_reused_between_reads() {
    let app = TestApp::new().await;
    let seeded = app.seed_product("Granola", "Grocery", 7.0, 30).await;
    app.seed_history(seeded.id, &RISING_WEEK, 30, 7.0).await;

    let first = app
        .state
        .services
        .analysis
        .analyze("Granola")
        .await
        .unwrap();
    let second = app
        .state
        .services
        .analysis
        .analyze("Granola")
        .await
        .unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
}

#[tokio::test]
async fn forecast_horizon_is_bounded() {
    let app = TestApp::new().await;
    let seeded = app.seed_product("Granola", "Grocery", 7.0, 30).await;
    app.seed_history(seeded.id, &RISING_WEEK, 30, 7.0).await;

    for days in [0, 31] {
        let err = app
            .state
            .services
            .analysis
            .forecast("Granola", days)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidInput(_)));
    }

    let ok = app
        .state
        .services
        .analysis
        .forecast("Granola", 30)
        .await
        .unwrap();
    assert_eq!(ok.next_days.len(), 30);
}

#[tokio::test]
async fn missing_product_analysis_is_not_found() {
    let app = TestApp::new().await;
    let err = app
        .state
        .services
        .analysis
        .analyze("Ghost")
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(_)));
}

#[tokio::test]
async fn listing_covers_every_product_and_survives_empty_histories() {
    let app = TestApp::new().await;
    let a = app.seed_product("Apples", "Produce", 1.0, 100).await;
    app.seed_history(a.id, &RISING_WEEK, 100, 1.0).await;
    // No history at all for this one; it must still list.
    app.seed_product("Brand New", "Produce", 2.0, 10).await;

    let listing = app.state.services.analysis.list_products().await.unwrap();
    assert_eq!(listing.len(), 2);

    let summary = app
        .state
        .services
        .analysis
        .insights_summary()
        .await
        .unwrap();
    assert_eq!(summary.counts.total_products, 2);
}

#[tokio::test]
async fn expiring_stock_forces_high_risk_and_emergency_action() {
    let app = TestApp::new().await;
    let seeded = app.seed_product("Salmon", "Seafood", 15.0, 40).await;
    app.seed_history(seeded.id, &[5; 14], 40, 15.0).await;
    // History ends yesterday; expiry lands the same day.
    let last_date = chrono::Utc::now().date_naive() - chrono::Duration::days(1);
    app.seed_batch(seeded.id, 40, Some(last_date)).await;

    let analysis = app.state.services.analysis.analyze("Salmon").await.unwrap();
    assert_eq!(analysis.risk.risk_level, RiskLevel::HighRisk);
    assert!(analysis.risk.risk_score >= 100);
    assert_eq!(
        analysis.recommendation.inventory_action,
        "Emergency Sale Required"
    );
    assert!(analysis.risk.reason.starts_with("CRITICAL"));
}
