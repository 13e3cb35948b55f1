use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction types recorded in the inventory ledger.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum TransactionType {
    #[sea_orm(string_value = "SALE")]
    Sale,
    #[sea_orm(string_value = "RESTOCK")]
    Restock,
    #[sea_orm(string_value = "ADJUSTMENT")]
    Adjustment,
    #[sea_orm(string_value = "CSV_ADJUSTMENT")]
    CsvAdjustment,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Sale => "SALE",
            TransactionType::Restock => "RESTOCK",
            TransactionType::Adjustment => "ADJUSTMENT",
            TransactionType::CsvAdjustment => "CSV_ADJUSTMENT",
        }
    }
}

/// Immutable audit trail of inventory movements. `quantity` is a signed
/// delta: negative for sales, positive for restocks and adjustments. The
/// ledger is append-only; current state lives on the product row.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub product_id: i64,

    pub transaction_type: TransactionType,

    pub quantity: i32,

    pub transaction_date: DateTime<Utc>,

    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
