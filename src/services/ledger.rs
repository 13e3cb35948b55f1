use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{info, instrument};

use crate::entities::ledger_entry::TransactionType;
use crate::entities::{daily_stat, inventory_batch, ledger_entry, product};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::ingest::{self, IngestRecord, RawRow};

use super::analysis::AnalysisCache;

/// Result of a successful ledger write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionOutcome {
    pub product_id: i64,
    pub product_name: String,
    pub new_inventory: i32,
}

/// Result of a bulk import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkImportSummary {
    pub products_updated: usize,
    pub history_rows: usize,
}

/// The only mutating path into the time series. Each call runs as a single
/// database transaction; concurrent writers against the same product are
/// serialized through a per-product mutex so the cached inventory and FIFO
/// batch deduction cannot race.
#[derive(Clone)]
pub struct InventoryLedger {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
    cache: AnalysisCache,
    product_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl InventoryLedger {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender, cache: AnalysisCache) -> Self {
        Self {
            db,
            event_sender,
            cache,
            product_locks: Arc::new(DashMap::new()),
        }
    }

    fn lock_for(&self, product_name: &str) -> Arc<Mutex<()>> {
        self.product_locks
            .entry(product_name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Record a sale, restock, or manual adjustment. All writes (cached
    /// inventory, ledger entry, daily snapshot, FIFO batch deduction)
    /// commit or roll back together.
    ///
    /// A sale larger than the remaining inventory clamps the cached level
    /// at zero while the ledger entry keeps the full requested delta; batch
    /// deduction stops once every batch is empty.
    #[instrument(skip(self))]
    pub async fn record_transaction(
        &self,
        product_name: &str,
        quantity: i32,
        transaction_type: TransactionType,
    ) -> Result<TransactionOutcome, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::InvalidInput(format!(
                "Transaction quantity must be positive, got {quantity}"
            )));
        }
        if transaction_type == TransactionType::CsvAdjustment {
            return Err(ServiceError::InvalidInput(
                "CSV_ADJUSTMENT entries are reserved for bulk imports".to_string(),
            ));
        }

        let lock = self.lock_for(product_name);
        let _guard = lock.lock().await;

        let name = product_name.to_string();
        let tx_type = transaction_type.clone();
        let outcome = self
            .db
            .transaction::<_, TransactionOutcome, ServiceError>(move |txn| {
                Box::pin(async move { apply_transaction(txn, &name, quantity, tx_type).await })
            })
            .await
            .map_err(ServiceError::from)?;

        self.cache.invalidate(product_name);
        self.event_sender
            .send(Event::TransactionRecorded {
                product_id: outcome.product_id,
                transaction_type: transaction_type.as_str().to_string(),
                quantity,
                new_inventory: outcome.new_inventory,
            })
            .await
            .map_err(ServiceError::EventError)?;

        Ok(outcome)
    }

    /// Merge a normalized bulk upload: upsert product masters, reset each
    /// product's batch set to a single new batch, record inventory drift as
    /// CSV_ADJUSTMENT entries, and replace daily history rows when the
    /// upload carries date/sales columns. One transaction for the whole
    /// batch.
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    pub async fn merge_bulk_import(
        &self,
        rows: Vec<RawRow>,
    ) -> Result<BulkImportSummary, ServiceError> {
        let records = ingest::normalize_rows(&rows)?;
        let with_history = ingest::has_history_columns(&rows);

        let affected: Vec<String> = records.iter().map(|r| r.product.clone()).collect();

        let (summary, created) = self
            .db
            .transaction::<_, (BulkImportSummary, Vec<(i64, String)>), ServiceError>(move |txn| {
                Box::pin(async move { apply_bulk_import(txn, records, with_history).await })
            })
            .await
            .map_err(ServiceError::from)?;

        for name in &affected {
            self.cache.invalidate(name);
        }
        for (product_id, name) in created {
            self.event_sender
                .send(Event::ProductCreated { product_id, name })
                .await
                .map_err(ServiceError::EventError)?;
        }
        self.event_sender
            .send(Event::BulkImportCompleted {
                products_updated: summary.products_updated,
                history_rows: summary.history_rows,
            })
            .await
            .map_err(ServiceError::EventError)?;

        info!(
            products = summary.products_updated,
            history_rows = summary.history_rows,
            "bulk import merged"
        );
        Ok(summary)
    }
}

async fn apply_transaction(
    txn: &DatabaseTransaction,
    product_name: &str,
    quantity: i32,
    transaction_type: TransactionType,
) -> Result<TransactionOutcome, ServiceError> {
    let now = Utc::now();
    let today = now.date_naive();

    let product = product::Entity::find()
        .filter(product::Column::Name.eq(product_name))
        .one(txn)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("Product '{product_name}' not found")))?;

    let delta = match transaction_type {
        TransactionType::Sale => -quantity,
        _ => quantity,
    };
    let new_inventory = (product.current_inventory + delta).max(0);

    let product_id = product.id;
    let price = product.price;

    let mut active: product::ActiveModel = product.clone().into();
    active.current_inventory = Set(new_inventory);
    active.last_updated = Set(now);
    active.update(txn).await?;

    ledger_entry::ActiveModel {
        product_id: Set(product_id),
        transaction_type: Set(transaction_type.clone()),
        quantity: Set(delta),
        transaction_date: Set(now),
        notes: Set(Some(format!("Manual {}", transaction_type.as_str()))),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    let sold_today = if transaction_type == TransactionType::Sale {
        quantity
    } else {
        0
    };
    upsert_daily_stat(txn, product_id, today, sold_today, new_inventory, price, false).await?;

    if transaction_type == TransactionType::Sale {
        consume_batches_fifo(txn, product_id, quantity).await?;
    }

    Ok(TransactionOutcome {
        product_id,
        product_name: product.name,
        new_inventory,
    })
}

/// Upsert the `(product, date)` snapshot. `replace` overwrites the sales
/// figure (bulk history loads); otherwise sales accumulate across the day's
/// transactions and the inventory snapshot is overwritten.
async fn upsert_daily_stat(
    txn: &DatabaseTransaction,
    product_id: i64,
    date: chrono::NaiveDate,
    sales: i32,
    inventory_snapshot: i32,
    price_snapshot: Decimal,
    replace: bool,
) -> Result<(), ServiceError> {
    let existing = daily_stat::Entity::find()
        .filter(daily_stat::Column::ProductId.eq(product_id))
        .filter(daily_stat::Column::Date.eq(date))
        .one(txn)
        .await?;

    match existing {
        Some(row) => {
            let accumulated = if replace { sales } else { row.sales + sales };
            let mut active: daily_stat::ActiveModel = row.into();
            active.sales = Set(accumulated);
            active.inventory_snapshot = Set(inventory_snapshot);
            active.price_snapshot = Set(price_snapshot);
            active.update(txn).await?;
        }
        None => {
            daily_stat::ActiveModel {
                product_id: Set(product_id),
                date: Set(date),
                sales: Set(sales),
                inventory_snapshot: Set(inventory_snapshot),
                price_snapshot: Set(price_snapshot),
                ..Default::default()
            }
            .insert(txn)
            .await?;
        }
    }
    Ok(())
}

/// Deduct a sale from batches in first-expiring-first-out order. Batches
/// without an expiry date are consumed last. Stops when the requested
/// quantity is satisfied or every batch is empty; no batch goes below zero.
async fn consume_batches_fifo(
    txn: &DatabaseTransaction,
    product_id: i64,
    quantity: i32,
) -> Result<(), ServiceError> {
    let mut batches = inventory_batch::Entity::find()
        .filter(inventory_batch::Column::ProductId.eq(product_id))
        .filter(inventory_batch::Column::Quantity.gt(0))
        .all(txn)
        .await?;
    batches.sort_by_key(|b| (b.expiry_date.is_none(), b.expiry_date, b.id));

    let mut remaining = quantity;
    for batch in batches {
        if remaining <= 0 {
            break;
        }
        let deduct = batch.quantity.min(remaining);
        remaining -= deduct;

        let new_quantity = batch.quantity - deduct;
        let mut active: inventory_batch::ActiveModel = batch.into();
        active.quantity = Set(new_quantity);
        active.update(txn).await?;
    }
    Ok(())
}

async fn apply_bulk_import(
    txn: &DatabaseTransaction,
    records: Vec<IngestRecord>,
    with_history: bool,
) -> Result<(BulkImportSummary, Vec<(i64, String)>), ServiceError> {
    let now = Utc::now();
    let today = now.date_naive();

    // Last row wins when a product appears more than once.
    let mut masters: Vec<&IngestRecord> = Vec::new();
    for record in &records {
        if let Some(slot) = masters.iter_mut().find(|m| m.product == record.product) {
            *slot = record;
        } else {
            masters.push(record);
        }
    }

    let mut created = Vec::new();

    for record in &masters {
        let price = Decimal::from_f64_retain(record.price).unwrap_or_default();

        let existing = product::Entity::find()
            .filter(product::Column::Name.eq(record.product.as_str()))
            .one(txn)
            .await?;

        let product_id = match existing {
            Some(found) => {
                let diff = record.inventory - found.current_inventory;
                if diff != 0 {
                    ledger_entry::ActiveModel {
                        product_id: Set(found.id),
                        transaction_type: Set(TransactionType::CsvAdjustment),
                        quantity: Set(diff),
                        transaction_date: Set(now),
                        notes: Set(Some("Bulk upload adjustment".to_string())),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;
                }

                let id = found.id;
                let mut active: product::ActiveModel = found.into();
                active.price = Set(price);
                active.category = Set(record.category.clone());
                active.current_inventory = Set(record.inventory);
                active.last_updated = Set(now);
                active.update(txn).await?;
                id
            }
            None => {
                let inserted = product::ActiveModel {
                    name: Set(record.product.clone()),
                    category: Set(record.category.clone()),
                    price: Set(price),
                    current_inventory: Set(record.inventory),
                    last_updated: Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
                created.push((inserted.id, inserted.name.clone()));
                inserted.id
            }
        };

        // The upload states the whole stock position, so the batch set is
        // replaced with a single fresh batch.
        inventory_batch::Entity::delete_many()
            .filter(inventory_batch::Column::ProductId.eq(product_id))
            .exec(txn)
            .await?;
        inventory_batch::ActiveModel {
            product_id: Set(product_id),
            quantity: Set(record.inventory),
            expiry_date: Set(record.expiry_date),
            entry_date: Set(today),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    let mut history_rows = 0usize;
    if with_history {
        for record in &records {
            let Some(date) = record.date else { continue };
            let product = product::Entity::find()
                .filter(product::Column::Name.eq(record.product.as_str()))
                .one(txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::InternalError(format!(
                        "Product '{}' missing after master upsert",
                        record.product
                    ))
                })?;

            upsert_daily_stat(
                txn,
                product.id,
                date,
                record.units_sold,
                record.inventory,
                Decimal::from_f64_retain(record.price).unwrap_or_default(),
                true,
            )
            .await?;
            history_rows += 1;
        }
    }

    Ok((
        BulkImportSummary {
            products_updated: masters.len(),
            history_rows,
        },
        created,
    ))
}
