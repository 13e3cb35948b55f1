use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use validator::Validate;

use crate::entities::ledger_entry::TransactionType;
use crate::errors::ServiceError;
use crate::ingest::RawRow;
use crate::services::ledger::{BulkImportSummary, TransactionOutcome};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct TransactionRequest {
    #[validate(length(min = 1, message = "product_name must not be empty"))]
    pub product_name: String,
    #[validate(range(min = 1, message = "quantity must be positive"))]
    pub quantity: i32,
    pub transaction_type: TransactionType,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkImportRequest {
    #[validate(length(min = 1, message = "import must contain at least one row"))]
    pub rows: Vec<RawRow>,
}

pub async fn record_transaction(
    State(state): State<AppState>,
    Json(payload): Json<TransactionRequest>,
) -> Result<Json<TransactionOutcome>, ServiceError> {
    payload.validate()?;
    let outcome = state
        .services
        .ledger
        .record_transaction(
            &payload.product_name,
            payload.quantity,
            payload.transaction_type,
        )
        .await?;
    Ok(Json(outcome))
}

pub async fn bulk_import(
    State(state): State<AppState>,
    Json(payload): Json<BulkImportRequest>,
) -> Result<Json<BulkImportSummary>, ServiceError> {
    payload.validate()?;
    let summary = state.services.ledger.merge_bulk_import(payload.rows).await?;
    Ok(Json(summary))
}
