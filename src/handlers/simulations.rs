use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::analytics::simulator::{
    CompetitorScenario, InventoryScenario, MarketingScenario, PriceScenario, PromotionScenario,
};
use crate::errors::ServiceError;
use crate::services::simulation::{
    GlobalScenario, GlobalScenarioOutcome, ProductScenario, Segment,
};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct PriceChangeRequest {
    #[validate(length(min = 1))]
    pub product_name: String,
    #[validate(range(min = 0.01, message = "new_price must be positive"))]
    pub new_price: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PromotionRequest {
    #[validate(length(min = 1))]
    pub product_name: String,
    #[validate(range(min = 0.0, max = 50.0))]
    pub discount_pct: f64,
    #[validate(range(min = 1, max = 30))]
    pub duration_days: u32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct InventoryChangeRequest {
    #[validate(length(min = 1))]
    pub product_name: String,
    pub new_stock_days: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CompetitorMoveRequest {
    #[validate(length(min = 1))]
    pub product_name: String,
    pub competitor_price_drop_pct: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct MarketingRequest {
    #[validate(length(min = 1))]
    pub product_name: String,
    pub ad_spend: f64,
    pub expected_lift_pct: f64,
}

#[derive(Debug, Deserialize)]
pub struct GlobalScenarioRequest {
    #[serde(flatten)]
    pub scenario: GlobalScenario,
    #[serde(default)]
    pub segment: Segment,
}

pub async fn price_change(
    State(state): State<AppState>,
    Json(payload): Json<PriceChangeRequest>,
) -> Result<Json<ProductScenario<PriceScenario>>, ServiceError> {
    payload.validate()?;
    let result = state
        .services
        .simulation
        .price_change(&payload.product_name, payload.new_price)
        .await?;
    Ok(Json(result))
}

pub async fn promotion(
    State(state): State<AppState>,
    Json(payload): Json<PromotionRequest>,
) -> Result<Json<ProductScenario<PromotionScenario>>, ServiceError> {
    payload.validate()?;
    let result = state
        .services
        .simulation
        .promotion(
            &payload.product_name,
            payload.discount_pct,
            payload.duration_days,
        )
        .await?;
    Ok(Json(result))
}

pub async fn inventory_change(
    State(state): State<AppState>,
    Json(payload): Json<InventoryChangeRequest>,
) -> Result<Json<ProductScenario<InventoryScenario>>, ServiceError> {
    payload.validate()?;
    let result = state
        .services
        .simulation
        .inventory_change(&payload.product_name, payload.new_stock_days)
        .await?;
    Ok(Json(result))
}

pub async fn competitor_move(
    State(state): State<AppState>,
    Json(payload): Json<CompetitorMoveRequest>,
) -> Result<Json<ProductScenario<CompetitorScenario>>, ServiceError> {
    payload.validate()?;
    let result = state
        .services
        .simulation
        .competitor_move(&payload.product_name, payload.competitor_price_drop_pct)
        .await?;
    Ok(Json(result))
}

pub async fn marketing_campaign(
    State(state): State<AppState>,
    Json(payload): Json<MarketingRequest>,
) -> Result<Json<ProductScenario<MarketingScenario>>, ServiceError> {
    payload.validate()?;
    let result = state
        .services
        .simulation
        .marketing_campaign(
            &payload.product_name,
            payload.ad_spend,
            payload.expected_lift_pct,
        )
        .await?;
    Ok(Json(result))
}

pub async fn global_scenario(
    State(state): State<AppState>,
    Json(payload): Json<GlobalScenarioRequest>,
) -> Result<Json<GlobalScenarioOutcome>, ServiceError> {
    let outcome = state
        .services
        .simulation
        .global_scenario(payload.scenario, payload.segment)
        .await?;
    Ok(Json(outcome))
}
