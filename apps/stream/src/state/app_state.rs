use sea_orm::DatabaseConnection;

use crate::config::app::StreamConfig;
use crate::streams::SubscriptionRegistry;

/// Everything the process shares: configuration, the database pool, and
/// the registry every reader hangs off.
#[derive(Clone)]
pub struct AppState {
    pub config: StreamConfig,
    pub db: DatabaseConnection,
    pub registry: SubscriptionRegistry,
}

impl AppState {
    pub fn new(config: StreamConfig, db: DatabaseConnection, registry: SubscriptionRegistry) -> Self {
        Self {
            config,
            db,
            registry,
        }
    }
}
