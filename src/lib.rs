pub mod algorithms;
pub mod config;
pub mod error;
pub mod features;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::EngineError;
pub use models::*;

use services::interaction::InteractionLedger;
use services::recommendation::{InMemoryStore, RecommendationService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub ledger: Arc<InteractionLedger>,
    pub store: Arc<InMemoryStore>,
    pub recommendation_service: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let config = Arc::new(config);

        let ledger = Arc::new(InteractionLedger::new(&config.interaction));

        let store = Arc::new(InMemoryStore::new(ledger.clone()));

        let recommendation_service = Arc::new(RecommendationService::new(
            store.clone(),
            config.clone(),
        ));

        Self {
            config,
            ledger,
            store,
            recommendation_service,
        }
    }
}

pub async fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
