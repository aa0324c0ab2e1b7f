pub mod dashboard;
pub mod meters;
pub mod power_values;

use crate::db::DbPool;
use crate::events::EventSender;
use crate::inference::AnomalyClassifier;
use crate::services::{
    dashboard::DashboardService, ingestion::IngestionService, meters::MeterService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub ingestion: Arc<IngestionService>,
    pub meters: Arc<MeterService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        classifier: Arc<dyn AnomalyClassifier>,
    ) -> Self {
        Self {
            ingestion: Arc::new(IngestionService::new(
                db_pool.clone(),
                event_sender.clone(),
                classifier,
            )),
            meters: Arc::new(MeterService::new(db_pool.clone(), event_sender)),
            dashboard: Arc::new(DashboardService::new(db_pool)),
        }
    }
}
