pub mod inventory;
pub mod products;
pub mod simulations;

use axum::routing::{get, post};
use axum::Router;

use crate::AppState;

/// All `/api/v1` routes.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/products", get(products::list_products))
        .route("/products/:name/analysis", get(products::analyze_product))
        .route("/products/:name/forecast", get(products::get_forecast))
        .route("/products/:name/risk", get(products::get_risk))
        .route("/products/:name/pricing", get(products::get_pricing))
        .route("/insights/summary", get(products::insights_summary))
        .route(
            "/inventory/transactions",
            post(inventory::record_transaction),
        )
        .route("/inventory/import", post(inventory::bulk_import))
        .route("/simulations/price", post(simulations::price_change))
        .route("/simulations/promotion", post(simulations::promotion))
        .route("/simulations/inventory", post(simulations::inventory_change))
        .route("/simulations/competitor", post(simulations::competitor_move))
        .route("/simulations/marketing", post(simulations::marketing_campaign))
        .route("/simulations/global", post(simulations::global_scenario))
}
