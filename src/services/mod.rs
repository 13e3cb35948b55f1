pub mod analysis;
pub mod ledger;
pub mod simulation;
pub mod timeseries;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::config::AnalyticsConfig;
use crate::events::EventSender;

/// All services, constructed once at startup and passed by reference.
#[derive(Clone)]
pub struct AppServices {
    pub store: timeseries::TimeSeriesStore,
    pub analysis: analysis::AnalysisService,
    pub ledger: ledger::InventoryLedger,
    pub simulation: simulation::SimulationService,
}

impl AppServices {
    pub fn new(
        db: Arc<DatabaseConnection>,
        event_sender: EventSender,
        analytics: AnalyticsConfig,
    ) -> Self {
        let store = timeseries::TimeSeriesStore::new(db.clone());
        let cache = analysis::AnalysisCache::default();
        let analysis = analysis::AnalysisService::new(store.clone(), cache.clone(), &analytics);
        let ledger = ledger::InventoryLedger::new(db, event_sender, cache);
        let simulation = simulation::SimulationService::new(analysis.clone(), analytics);
        Self {
            store,
            analysis,
            ledger,
            simulation,
        }
    }
}
