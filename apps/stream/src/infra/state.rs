use std::sync::Arc;

use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::app::StreamConfig;
use crate::config::db::DbProfile;
use crate::error::AppError;
use crate::infra::db::bootstrap_db;
use crate::lichess::LichessClient;
use crate::notify::TelegramDispatcher;
use crate::repos::{AccountStore, SeaStore};
use crate::state::app_state::AppState;
use crate::streams::{StreamDeps, SubscriptionRegistry};

/// Builder for `AppState` (used in both tests and main).
pub struct StateBuilder {
    config: StreamConfig,
    db_profile: DbProfile,
    connection: Option<DatabaseConnection>,
}

impl StateBuilder {
    pub fn new(config: StreamConfig) -> Self {
        Self {
            config,
            db_profile: DbProfile::Prod,
            connection: None,
        }
    }

    pub fn with_db(mut self, profile: DbProfile) -> Self {
        self.db_profile = profile;
        self
    }

    /// Use an already migrated connection instead of connecting.
    pub fn with_connection(mut self, conn: DatabaseConnection) -> Self {
        self.connection = Some(conn);
        self
    }

    pub async fn build(self) -> Result<AppState, AppError> {
        let db = match self.connection {
            Some(conn) => conn,
            // single entrypoint: build + migrate
            None => bootstrap_db(self.db_profile).await?,
        };

        let store = Arc::new(SeaStore::new(db.clone()));
        let deps = StreamDeps {
            games: store.clone(),
            accounts: store,
            events: Arc::new(LichessClient::new(self.config.lichess_url.clone())?),
            notifier: Arc::new(TelegramDispatcher::new(
                &self.config.telegram_api_url,
                &self.config.bot_token,
            )?),
        };

        Ok(AppState::new(self.config, db, SubscriptionRegistry::new(deps)))
    }
}

pub fn build_state(config: StreamConfig) -> StateBuilder {
    StateBuilder::new(config)
}

/// Start a main stream for every account that has a stored token.
/// Returns how many were started.
pub async fn resubscribe_all(
    accounts: &dyn AccountStore,
    registry: &SubscriptionRegistry,
) -> Result<usize, AppError> {
    let ids = accounts.subscribed_accounts().await?;
    for &account_id in &ids {
        registry.start(account_id);
    }
    info!(accounts = ids.len(), "startup resubscription done");
    Ok(ids.len())
}
