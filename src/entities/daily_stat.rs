use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// End-of-day snapshot per product. Unique on `(product_id, date)`; writes
/// to "today" are upserts that add to sales and overwrite the inventory
/// snapshot. Rows are never deleted.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "daily_stats")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,

    pub product_id: i64,

    pub date: NaiveDate,

    pub sales: i32,

    pub inventory_snapshot: i32,

    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub price_snapshot: Decimal,
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
