use std::sync::Arc;

use rust_decimal::prelude::ToPrimitive;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use crate::analytics::DailyRecord;
use crate::entities::{daily_stat, inventory_batch, product};
use crate::errors::ServiceError;

/// Read-side access to the per-product daily history. The single source of
/// truth for all analytics; only the ledger writes to it.
#[derive(Clone)]
pub struct TimeSeriesStore {
    db: Arc<DatabaseConnection>,
}

impl TimeSeriesStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Look up a product by its natural key.
    #[instrument(skip(self))]
    pub async fn find_product(&self, name: &str) -> Result<product::Model, ServiceError> {
        product::Entity::find()
            .filter(product::Column::Name.eq(name))
            .one(self.db.as_ref())
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product '{name}' not found")))
    }

    /// A product's chronologically ordered history, annotated with the
    /// earliest batch expiry so the risk classifier sees the most urgent
    /// lot.
    #[instrument(skip(self))]
    pub async fn product_history(
        &self,
        name: &str,
    ) -> Result<(product::Model, Vec<DailyRecord>), ServiceError> {
        let product = self.find_product(name).await?;

        let stats = daily_stat::Entity::find()
            .filter(daily_stat::Column::ProductId.eq(product.id))
            .order_by_asc(daily_stat::Column::Date)
            .all(self.db.as_ref())
            .await?;

        let earliest_expiry = inventory_batch::Entity::find()
            .filter(inventory_batch::Column::ProductId.eq(product.id))
            .all(self.db.as_ref())
            .await?
            .into_iter()
            .filter_map(|b| b.expiry_date)
            .min();

        let history = stats
            .into_iter()
            .map(|row| DailyRecord {
                date: row.date,
                units_sold: row.sales,
                inventory_level: row.inventory_snapshot,
                price: row.price_snapshot.to_f64().unwrap_or(0.0),
                expiry_date: earliest_expiry,
                category: product.category.clone(),
            })
            .collect();

        Ok((product, history))
    }

    /// All product names, sorted for stable pagination-free listings.
    #[instrument(skip(self))]
    pub async fn list_product_names(&self) -> Result<Vec<String>, ServiceError> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::Name)
            .all(self.db.as_ref())
            .await?;
        Ok(products.into_iter().map(|p| p.name).collect())
    }
}
