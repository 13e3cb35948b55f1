pub mod daily_stat;
pub mod inventory_batch;
pub mod ledger_entry;
pub mod product;
