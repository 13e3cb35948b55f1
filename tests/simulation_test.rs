//! Scenario simulation against live analysis baselines, including the
//! catalog-wide aggregation paths.

mod common;

use common::TestApp;
use shelfsense_api::analytics::pricing::PriceAction;
use shelfsense_api::config::AnalyticsConfig;
use shelfsense_api::errors::ServiceError;
use shelfsense_api::services::simulation::{GlobalAction, GlobalScenario, Segment};

/// Steady 10/day with a flat tail; a boring, stable product.
const STEADY: [i32; 14] = [10; 14];

async fn seed_steady(app: &TestApp, name: &str, price: f64, inventory: i32) {
    let seeded = app.seed_product(name, "Grocery", price, inventory).await;
    app.seed_history(seeded.id, &STEADY, inventory, price).await;
}

#[tokio::test]
async fn unit_elasticity_mirrors_price_change_exactly() {
    let analytics = AnalyticsConfig {
        price_elasticity: 1.0,
        ..AnalyticsConfig::default()
    };
    let app = TestApp::with_analytics(analytics).await;
    seed_steady(&app, "Rice", 10.0, 100).await;

    let result = app
        .state
        .services
        .simulation
        .price_change("Rice", 11.0)
        .await
        .expect("simulation succeeds");
    assert_eq!(result.projection.price_change_pct, 10.0);
    assert_eq!(result.projection.demand_change_pct, -10.0);
}

#[tokio::test]
async fn zero_discount_promotion_changes_nothing() {
    let app = TestApp::new().await;
    seed_steady(&app, "Rice", 10.0, 100).await;

    let result = app
        .state
        .services
        .simulation
        .promotion("Rice", 0.0, 7)
        .await
        .expect("simulation succeeds");
    assert_eq!(result.projection.lift_pct, 0.0);
    assert_eq!(result.projection.revenue_impact, 0.0);
}

#[tokio::test]
async fn promotion_bounds_are_enforced() {
    let app = TestApp::new().await;
    seed_steady(&app, "Rice", 10.0, 100).await;

    let sim = &app.state.services.simulation;
    assert!(matches!(
        sim.promotion("Rice", 60.0, 7).await.unwrap_err(),
        ServiceError::InvalidInput(_)
    ));
    assert!(matches!(
        sim.promotion("Rice", 10.0, 0).await.unwrap_err(),
        ServiceError::InvalidInput(_)
    ));
    assert!(matches!(
        sim.promotion("Rice", 10.0, 31).await.unwrap_err(),
        ServiceError::InvalidInput(_)
    ));
}

#[tokio::test]
async fn inventory_scenario_tracks_days_of_cover() {
    let app = TestApp::new().await;
    // 100 units at 10/day: 10 days of cover.
    seed_steady(&app, "Rice", 10.0, 100).await;

    let result = app
        .state
        .services
        .simulation
        .inventory_change("Rice", 20.0)
        .await
        .expect("simulation succeeds");
    assert_eq!(result.projection.stock_change_pct, 100.0);
    assert_eq!(result.projection.stockout_risk_reduction, 40.0);
    assert_eq!(result.projection.recommendation, PriceAction::Increase);
}

#[tokio::test]
async fn competitor_drop_uses_the_configured_cross_elasticity() {
    let app = TestApp::new().await;
    seed_steady(&app, "Rice", 10.0, 100).await;

    let result = app
        .state
        .services
        .simulation
        .competitor_move("Rice", 20.0)
        .await
        .expect("simulation succeeds");
    // Default cross-elasticity 0.7: a 20% drop costs 14% of demand.
    assert_eq!(result.projection.demand_impact_pct, -14.0);
    assert_eq!(
        result.projection.recommendation,
        shelfsense_api::analytics::simulator::CompetitorResponse::MatchPrice
    );
}

#[tokio::test]
async fn marketing_breakeven_uses_the_baseline_revenue() {
    let app = TestApp::new().await;
    seed_steady(&app, "Rice", 10.0, 100).await;

    let result = app
        .state
        .services
        .simulation
        .marketing_campaign("Rice", 100.0, 10.0)
        .await
        .expect("simulation succeeds");
    // 10% lift on 10 units at price 10 earns 10/day; 100 pays back in 10.
    assert_eq!(result.projection.daily_revenue_increase, 10.0);
    assert_eq!(result.projection.break_even_days, 10.0);
}

#[tokio::test]
async fn global_promotion_equals_the_sum_of_individual_impacts() {
    let app = TestApp::new().await;
    seed_steady(&app, "Rice", 10.0, 100).await;
    seed_steady(&app, "Beans", 4.0, 80).await;

    let sim = &app.state.services.simulation;
    let rice = sim.promotion("Rice", 10.0, 7).await.unwrap();
    let beans = sim.promotion("Beans", 10.0, 7).await.unwrap();
    let expected = rice.projection.revenue_impact + beans.projection.revenue_impact;

    let outcome = sim
        .global_scenario(
            GlobalScenario::Promotion {
                discount_pct: 10.0,
                duration_days: 7,
            },
            Segment::All,
        )
        .await
        .expect("global scenario succeeds");

    assert_eq!(outcome.products_impacted, 2);
    assert!((outcome.summary.total_revenue_change - expected).abs() < 1e-6);
    assert_eq!(outcome.summary.action, GlobalAction::Positive);
}

#[tokio::test]
async fn global_marketing_subtracts_the_spend_once() {
    let app = TestApp::new().await;
    seed_steady(&app, "Rice", 10.0, 100).await;
    seed_steady(&app, "Beans", 4.0, 80).await;

    let outcome = app
        .state
        .services
        .simulation
        .global_scenario(
            GlobalScenario::Marketing {
                ad_spend: 500.0,
                lift_pct: 10.0,
            },
            Segment::All,
        )
        .await
        .expect("global scenario succeeds");

    // Daily lift: Rice 10 units * 10% * 10.0 = 10, Beans 10 * 10% * 4.0 = 4.
    // Projected monthly: 14 * 30 = 420; net = 420 - 500.
    let summary = outcome.summary;
    assert!((summary.total_revenue_change - 420.0).abs() < 1e-6);
    assert_eq!(summary.net_profit_impact, Some(-80.0));
    assert_eq!(summary.action, GlobalAction::Negative);
}

#[tokio::test]
async fn global_price_change_reports_demand_and_revenue_shifts() {
    let app = TestApp::new().await;
    seed_steady(&app, "Rice", 10.0, 100).await;

    let outcome = app
        .state
        .services
        .simulation
        .global_scenario(GlobalScenario::PriceChange { pct_change: 10.0 }, Segment::All)
        .await
        .expect("global scenario succeeds");

    assert_eq!(outcome.products_impacted, 1);
    // Elasticity 1.2: +10% price, -12% demand; revenue falls.
    assert!(outcome.summary.demand_change_pct < 0.0);
    assert_eq!(outcome.summary.action, GlobalAction::Negative);
}

#[tokio::test]
async fn segments_select_by_risk_classification() {
    let app = TestApp::new().await;
    // Stable product.
    seed_steady(&app, "Rice", 10.0, 100).await;
    // High-risk product: choppy collapsing demand, heavy overstock.
    let risky = app.seed_product("Fruit Cake", "Bakery", 12.0, 400).await;
    let sales = [25, 10, 25, 10, 25, 10, 25, 10, 3, 10, 3, 10, 3, 10];
    app.seed_history(risky.id, &sales, 400, 12.0).await;

    let outcome = app
        .state
        .services
        .simulation
        .global_scenario(
            GlobalScenario::Promotion {
                discount_pct: 10.0,
                duration_days: 7,
            },
            Segment::HighRisk,
        )
        .await
        .expect("global scenario succeeds");
    assert_eq!(outcome.products_impacted, 1);

    let all = app
        .state
        .services
        .simulation
        .global_scenario(
            GlobalScenario::Promotion {
                discount_pct: 10.0,
                duration_days: 7,
            },
            Segment::All,
        )
        .await
        .unwrap();
    assert_eq!(all.products_impacted, 2);
}

#[tokio::test]
async fn extreme_inputs_degrade_without_panicking() {
    let app = TestApp::new().await;
    seed_steady(&app, "Rice", 10.0, 100).await;

    let sim = &app.state.services.simulation;

    let huge_price = sim.price_change("Rice", 10_000.0).await.unwrap();
    assert_eq!(huge_price.projection.new_demand, 0);

    let negative_days = sim.inventory_change("Rice", -5.0).await.unwrap();
    assert!(negative_days.projection.stock_change_pct.is_finite());

    let absurd_lift = sim.marketing_campaign("Rice", 0.0, -50.0).await.unwrap();
    assert_eq!(absurd_lift.projection.break_even_days, 999.0);
}
