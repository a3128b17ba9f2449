//! Long-lived lichess streams: one task per watched account and one per
//! active game, tracked by the subscription registry.

pub mod account;
pub mod game;
pub mod handle;
pub mod registry;

use std::sync::Arc;

use crate::lichess::EventSource;
use crate::notify::NotificationDispatcher;
use crate::repos::{AccountStore, GameStore};

pub use account::AccountStreamReader;
pub use game::GameStreamReader;
pub use handle::{StreamHandle, StreamKind};
pub use registry::SubscriptionRegistry;

/// Collaborators shared by every reader.
#[derive(Clone)]
pub struct StreamDeps {
    pub games: Arc<dyn GameStore>,
    pub accounts: Arc<dyn AccountStore>,
    pub events: Arc<dyn EventSource>,
    pub notifier: Arc<dyn NotificationDispatcher>,
}
