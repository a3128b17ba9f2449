#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod entities;
pub mod error;
pub mod errors;
pub mod infra;
pub mod lichess;
pub mod notify;
pub mod queue;
pub mod repos;
pub mod state;
pub mod streams;
pub mod telemetry;


// Re-exports for public API
pub use config::app::StreamConfig;
pub use config::db::{db_url, DbProfile};
pub use error::AppError;
pub use infra::db::{bootstrap_db, connect_db, connect_in_memory};
pub use infra::state::{build_state, resubscribe_all};
pub use queue::{QueueCommand, QueueConsumer};
pub use state::app_state::AppState;
pub use streams::{StreamDeps, SubscriptionRegistry};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
