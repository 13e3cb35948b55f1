use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product master row. `current_inventory` is a denormalized cache of the
/// latest daily snapshot and is only written by the ledger.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    /// Natural unique key used by all lookups.
    #[sea_orm(unique)]
    pub name: String,

    pub category: String,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price: Decimal,

    pub current_inventory: i32,

    pub last_updated: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::inventory_batch::Entity")]
    InventoryBatches,
    #[sea_orm(has_many = "super::ledger_entry::Entity")]
    LedgerEntries,
    #[sea_orm(has_many = "super::daily_stat::Entity")]
    DailyStats,
}

impl Related<super::inventory_batch::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryBatches.def()
    }
}

impl Related<super::ledger_entry::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LedgerEntries.def()
    }
}

impl Related<super::daily_stat::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DailyStats.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
