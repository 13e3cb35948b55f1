//! Shared harness for integration tests: application state backed by a
//! single-connection in-memory SQLite database with migrations applied.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};

use shelfsense_api::config::{AnalyticsConfig, AppConfig};
use shelfsense_api::db::run_migrations;
use shelfsense_api::entities::{daily_stat, inventory_batch, product};
use shelfsense_api::events;
use shelfsense_api::AppState;

pub struct TestApp {
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_analytics(AnalyticsConfig::default()).await
    }

    /// Build the app with custom analytics tunables (e.g. a different
    /// elasticity).
    pub async fn with_analytics(analytics: AnalyticsConfig) -> Self {
        let mut opts = ConnectOptions::new("sqlite::memory:".to_string());
        // A single long-lived connection keeps the in-memory database
        // alive for the whole test.
        opts.max_connections(1)
            .min_connections(1)
            .idle_timeout(Duration::from_secs(3600))
            .sqlx_logging(false);
        let db = Database::connect(opts).await.expect("connect sqlite");
        run_migrations(&db).await.expect("migrate");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            0,
            "test".to_string(),
        );
        cfg.analytics = analytics;

        let (event_sender, event_rx) = events::channel(64);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(db), cfg, event_sender);
        Self {
            state,
            _event_task: event_task,
        }
    }

    pub async fn seed_product(
        &self,
        name: &str,
        category: &str,
        price: f64,
        inventory: i32,
    ) -> product::Model {
        product::ActiveModel {
            name: Set(name.to_string()),
            category: Set(category.to_string()),
            price: Set(Decimal::from_f64_retain(price).unwrap()),
            current_inventory: Set(inventory),
            last_updated: Set(Utc::now()),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed product")
    }

    pub async fn seed_batch(
        &self,
        product_id: i64,
        quantity: i32,
        expiry_date: Option<NaiveDate>,
    ) -> inventory_batch::Model {
        inventory_batch::ActiveModel {
            product_id: Set(product_id),
            quantity: Set(quantity),
            expiry_date: Set(expiry_date),
            entry_date: Set(Utc::now().date_naive()),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed batch")
    }

    pub async fn seed_daily(
        &self,
        product_id: i64,
        date: NaiveDate,
        sales: i32,
        inventory: i32,
        price: f64,
    ) {
        daily_stat::ActiveModel {
            product_id: Set(product_id),
            date: Set(date),
            sales: Set(sales),
            inventory_snapshot: Set(inventory),
            price_snapshot: Set(Decimal::from_f64_retain(price).unwrap()),
            ..Default::default()
        }
        .insert(self.state.db.as_ref())
        .await
        .expect("seed daily stat");
    }

    /// Seed a run of consecutive days ending just before today, one daily
    /// row per sales figure, all at the same inventory snapshot and price.
    pub async fn seed_history(
        &self,
        product_id: i64,
        sales: &[i32],
        inventory: i32,
        price: f64,
    ) {
        let start = Utc::now().date_naive() - chrono::Duration::days(sales.len() as i64);
        for (offset, &sold) in sales.iter().enumerate() {
            let date = start + chrono::Duration::days(offset as i64);
            self.seed_daily(product_id, date, sold, inventory, price).await;
        }
    }
}
