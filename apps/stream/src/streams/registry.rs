//! Account → live stream handles.
//!
//! All mutations go through one mutex and never hold it across an await.
//! Reader tasks are spawned while the lock is held so a concurrent `stop`
//! can never miss a handle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::account::AccountStreamReader;
use super::game::GameStreamReader;
use super::handle::{StreamHandle, StreamKind};
use super::StreamDeps;
use crate::repos::{Account, Game};

struct SubscriptionEntry {
    /// Parent of every token in this entry.
    root: CancellationToken,
    main: StreamHandle,
    /// Keyed by lichess game id.
    games: HashMap<String, StreamHandle>,
}

impl SubscriptionEntry {
    fn cancel(&self) {
        self.root.cancel();
        for handle in std::iter::once(&self.main).chain(self.games.values()) {
            handle.cancel();
            debug!(
                account_id = handle.owner_account_id(),
                kind = ?handle.kind(),
                "stream cancelled"
            );
        }
    }

    fn prune_finished_games(&mut self) {
        self.games.retain(|_, handle| !handle.is_finished());
    }
}

struct RegistryInner {
    deps: StreamDeps,
    entries: Mutex<HashMap<i64, SubscriptionEntry>>,
}

#[derive(Clone)]
pub struct SubscriptionRegistry {
    inner: Arc<RegistryInner>,
}

impl SubscriptionRegistry {
    pub fn new(deps: StreamDeps) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                deps,
                entries: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Begin watching `account_id`. No-op while its main stream is alive;
    /// a finished main stream is replaced.
    pub fn start(&self, account_id: i64) {
        let mut entries = self.inner.entries.lock();
        match entries.get_mut(&account_id) {
            Some(entry) if !entry.main.is_finished() => {
                debug!(account_id, "start ignored: already subscribed");
            }
            Some(entry) => {
                entry.main = self.spawn_main(account_id, &entry.root);
                info!(account_id, "account stream restarted");
            }
            None => {
                let root = CancellationToken::new();
                let main = self.spawn_main(account_id, &root);
                entries.insert(
                    account_id,
                    SubscriptionEntry {
                        root,
                        main,
                        games: HashMap::new(),
                    },
                );
                info!(account_id, "account subscribed");
            }
        }
    }

    /// Cancel every stream of `account_id` and forget it. No-op when unknown.
    pub fn stop(&self, account_id: i64) {
        let mut entries = self.inner.entries.lock();
        match entries.remove(&account_id) {
            Some(entry) => {
                entry.cancel();
                info!(account_id, games = entry.games.len(), "account unsubscribed");
            }
            None => debug!(account_id, "stop ignored: not subscribed"),
        }
    }

    /// Cancel everything; used on shutdown.
    pub fn stop_all(&self) {
        let mut entries = self.inner.entries.lock();
        let count = entries.len();
        for (_, entry) in entries.drain() {
            entry.cancel();
        }
        info!(accounts = count, "all streams cancelled");
    }

    /// Whether the account's main stream is registered and still running.
    pub fn is_active(&self, account_id: i64) -> bool {
        self.inner
            .entries
            .lock()
            .get(&account_id)
            .is_some_and(|entry| !entry.main.is_finished())
    }

    pub fn is_subscribed(&self, account_id: i64) -> bool {
        self.inner.entries.lock().contains_key(&account_id)
    }

    /// Live game streams of the account.
    pub fn game_count(&self, account_id: i64) -> usize {
        let mut entries = self.inner.entries.lock();
        match entries.get_mut(&account_id) {
            Some(entry) => {
                entry.prune_finished_games();
                entry.games.len()
            }
            None => 0,
        }
    }

    /// Spawn a game reader unless one is already live for this game.
    ///
    /// `main_token` is the caller's token: a main reader that was stopped
    /// (or replaced) must not attach games to a newer entry.
    pub(crate) fn open_game(
        &self,
        main_token: &CancellationToken,
        account: &Account,
        game: Game,
    ) -> bool {
        let mut entries = self.inner.entries.lock();
        if main_token.is_cancelled() {
            return false;
        }
        let Some(entry) = entries.get_mut(&account.id) else {
            return false;
        };

        entry.prune_finished_games();
        if entry.games.contains_key(&game.external_game_id) {
            return false;
        }

        let external_game_id = game.external_game_id.clone();
        let token = entry.root.child_token();
        let reader =
            GameStreamReader::new(self.inner.deps.clone(), account.clone(), game, token.clone());
        let task = tokio::spawn(reader.run());
        entry.games.insert(
            external_game_id,
            StreamHandle::new(account.id, StreamKind::Game, token, task),
        );
        true
    }

    fn spawn_main(&self, account_id: i64, root: &CancellationToken) -> StreamHandle {
        let token = root.child_token();
        let reader = AccountStreamReader::new(
            account_id,
            self.inner.deps.clone(),
            self.clone(),
            token.clone(),
        );
        let task = tokio::spawn(reader.run());
        StreamHandle::new(account_id, StreamKind::Main, token, task)
    }
}
