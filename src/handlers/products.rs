use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::analytics::forecasting::ForecastResult;
use crate::analytics::pricing::PricingResult;
use crate::analytics::risk::RiskResult;
use crate::errors::ServiceError;
use crate::services::analysis::{AnalysisResult, InsightsSummary, ProductSummary};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ForecastQuery {
    pub days: Option<u32>,
}

pub async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductSummary>>, ServiceError> {
    let summaries = state.services.analysis.list_products().await?;
    Ok(Json(summaries))
}

pub async fn analyze_product(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<AnalysisResult>, ServiceError> {
    let analysis = state.services.analysis.analyze(&name).await?;
    Ok(Json(analysis.as_ref().clone()))
}

pub async fn get_forecast(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<ForecastQuery>,
) -> Result<Json<ForecastResult>, ServiceError> {
    let days = query
        .days
        .unwrap_or(state.config.analytics.forecast_horizon_days);
    let forecast = state.services.analysis.forecast(&name, days).await?;
    Ok(Json(forecast))
}

pub async fn get_risk(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RiskResult>, ServiceError> {
    let risk = state.services.analysis.risk(&name).await?;
    Ok(Json(risk))
}

pub async fn get_pricing(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<PricingResult>, ServiceError> {
    let pricing = state.services.analysis.pricing(&name).await?;
    Ok(Json(pricing))
}

pub async fn insights_summary(
    State(state): State<AppState>,
) -> Result<Json<InsightsSummary>, ServiceError> {
    let summary = state.services.analysis.insights_summary().await?;
    Ok(Json(summary))
}
