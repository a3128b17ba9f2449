//! In-memory stand-ins for the store, the lichess feeds, and Telegram.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use async_trait::async_trait;
use futures::StreamExt;
use lichess_tg_stream::error::AppError;
use lichess_tg_stream::errors::domain::{ConflictKind, DomainError, InfraErrorKind};
use lichess_tg_stream::lichess::{AccountEvent, EventSource, EventStream, GameEvent};
use lichess_tg_stream::notify::{BoardUpdate, NotificationDispatcher};
use lichess_tg_stream::repos::{Account, AccountStore, Game, GameStore};
use parking_lot::Mutex;
use tokio::sync::mpsc::{unbounded_channel, UnboundedSender};
use tokio_stream::wrappers::UnboundedReceiverStream;

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Write {
    pub game_id: i64,
    pub moves: String,
    pub is_white: Option<bool>,
}

#[derive(Default)]
struct StoreState {
    accounts: HashMap<i64, Account>,
    games: Vec<Game>,
    next_game_id: i64,
    writes: Vec<Write>,
    create_calls: usize,
    failing_updates: usize,
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<StoreState>,
}

impl MemoryStore {
    pub fn add_account(&self, account: Account) {
        self.state.lock().accounts.insert(account.id, account);
    }

    pub fn insert_game(
        &self,
        account_id: i64,
        external_game_id: &str,
        moves: Option<&str>,
        is_white: Option<bool>,
    ) -> Game {
        let mut state = self.state.lock();
        state.next_game_id += 1;
        let game = Game {
            id: state.next_game_id,
            account_id,
            external_game_id: external_game_id.to_string(),
            moves: moves.map(str::to_string),
            is_white,
            notification_ref: 1000 + state.next_game_id,
            created_at: time::OffsetDateTime::now_utc(),
        };
        state.games.push(game.clone());
        game
    }

    pub fn games(&self) -> Vec<Game> {
        self.state.lock().games.clone()
    }

    pub fn game(&self, account_id: i64, external_game_id: &str) -> Option<Game> {
        self.state
            .lock()
            .games
            .iter()
            .find(|g| g.account_id == account_id && g.external_game_id == external_game_id)
            .cloned()
    }

    pub fn writes(&self) -> Vec<Write> {
        self.state.lock().writes.clone()
    }

    pub fn create_calls(&self) -> usize {
        self.state.lock().create_calls
    }

    /// The next `n` calls to `update_game` fail.
    pub fn fail_updates(&self, n: usize) {
        self.state.lock().failing_updates = n;
    }
}

#[async_trait]
impl GameStore for MemoryStore {
    async fn find_game(
        &self,
        account_id: i64,
        external_game_id: &str,
    ) -> Result<Option<Game>, DomainError> {
        Ok(self.game(account_id, external_game_id))
    }

    async fn create_game(
        &self,
        external_game_id: &str,
        account_id: i64,
        notification_ref: i64,
    ) -> Result<Game, DomainError> {
        let mut state = self.state.lock();
        state.create_calls += 1;
        if state
            .games
            .iter()
            .any(|g| g.account_id == account_id && g.external_game_id == external_game_id)
        {
            return Err(DomainError::conflict(
                ConflictKind::UniqueGame,
                "game already exists",
            ));
        }
        state.next_game_id += 1;
        let game = Game {
            id: state.next_game_id,
            account_id,
            external_game_id: external_game_id.to_string(),
            moves: None,
            is_white: None,
            notification_ref,
            created_at: time::OffsetDateTime::now_utc(),
        };
        state.games.push(game.clone());
        Ok(game)
    }

    async fn update_game(
        &self,
        game_id: i64,
        moves: &str,
        is_white: Option<bool>,
    ) -> Result<(), DomainError> {
        let mut state = self.state.lock();
        if state.failing_updates > 0 {
            state.failing_updates -= 1;
            return Err(DomainError::infra(
                InfraErrorKind::DbUnavailable,
                "Database unavailable",
            ));
        }
        let Some(game) = state.games.iter_mut().find(|g| g.id == game_id) else {
            return Err(DomainError::infra(
                InfraErrorKind::Other("missing".into()),
                "game not found",
            ));
        };
        game.moves = Some(moves.to_string());
        if is_white.is_some() {
            game.is_white = is_white;
        }
        state.writes.push(Write {
            game_id,
            moves: moves.to_string(),
            is_white,
        });
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn find_account(&self, account_id: i64) -> Result<Option<Account>, DomainError> {
        Ok(self.state.lock().accounts.get(&account_id).cloned())
    }

    async fn subscribed_accounts(&self) -> Result<Vec<i64>, DomainError> {
        let mut ids: Vec<i64> = self
            .state
            .lock()
            .accounts
            .values()
            .filter(|a| !a.token.is_empty())
            .map(|a| a.id)
            .collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Lichess feeds
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FeedState {
    account_feeds: HashMap<String, UnboundedSender<Result<AccountEvent, AppError>>>,
    game_feeds: HashMap<String, UnboundedSender<Result<GameEvent, AppError>>>,
    account_opens: HashMap<String, usize>,
    game_opens: HashMap<String, usize>,
}

/// Each opened feed is a channel; tests push events into it and can tell
/// whether the reader dropped its end.
#[derive(Default)]
pub struct FakeEvents {
    state: Mutex<FeedState>,
    reject_opens: AtomicBool,
}

impl FakeEvents {
    pub fn reject_opens(&self, reject: bool) {
        self.reject_opens.store(reject, Ordering::SeqCst);
    }

    pub fn account_opens(&self, token: &str) -> usize {
        self.state.lock().account_opens.get(token).copied().unwrap_or(0)
    }

    pub fn game_opens(&self, game_id: &str) -> usize {
        self.state.lock().game_opens.get(game_id).copied().unwrap_or(0)
    }

    /// Push a decoded account event; false when no reader holds the feed.
    pub fn push_account(&self, token: &str, json: &str) -> bool {
        let event: AccountEvent = serde_json::from_str(json).expect("account event json");
        match self.state.lock().account_feeds.get(token) {
            Some(tx) => tx.send(Ok(event)).is_ok(),
            None => false,
        }
    }

    pub fn push_game(&self, game_id: &str, json: &str) -> bool {
        let event: GameEvent = serde_json::from_str(json).expect("game event json");
        match self.state.lock().game_feeds.get(game_id) {
            Some(tx) => tx.send(Ok(event)).is_ok(),
            None => false,
        }
    }

    /// Break the game feed with a transport error.
    pub fn break_game(&self, game_id: &str) {
        if let Some(tx) = self.state.lock().game_feeds.get(game_id) {
            let _ = tx.send(Err(AppError::upstream(
                "event stream read failed",
                std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset"),
            )));
        }
    }

    /// Close the account feed the way a server hang-up would.
    pub fn close_account(&self, token: &str) {
        self.state.lock().account_feeds.remove(token);
    }

    pub fn account_feed_open(&self, token: &str) -> bool {
        self.state
            .lock()
            .account_feeds
            .get(token)
            .is_some_and(|tx| !tx.is_closed())
    }

    pub fn game_feed_open(&self, game_id: &str) -> bool {
        self.state
            .lock()
            .game_feeds
            .get(game_id)
            .is_some_and(|tx| !tx.is_closed())
    }
}

#[async_trait]
impl EventSource for FakeEvents {
    async fn account_events(&self, token: &str) -> Result<EventStream<AccountEvent>, AppError> {
        if self.reject_opens.load(Ordering::SeqCst) {
            return Err(AppError::upstream_rejected("/api/stream/event answered 401"));
        }
        let (tx, rx) = unbounded_channel();
        let mut state = self.state.lock();
        state.account_feeds.insert(token.to_string(), tx);
        *state.account_opens.entry(token.to_string()).or_default() += 1;
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }

    async fn game_events(
        &self,
        _token: &str,
        game_id: &str,
    ) -> Result<EventStream<GameEvent>, AppError> {
        if self.reject_opens.load(Ordering::SeqCst) {
            return Err(AppError::upstream_rejected("game stream answered 401"));
        }
        let (tx, rx) = unbounded_channel();
        let mut state = self.state.lock();
        state.game_feeds.insert(game_id.to_string(), tx);
        *state.game_opens.entry(game_id.to_string()).or_default() += 1;
        Ok(UnboundedReceiverStream::new(rx).boxed())
    }
}

// ---------------------------------------------------------------------------
// Notifications
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Sent {
    Initial {
        chat_id: i64,
        game_id: String,
    },
    EditFull {
        message_ref: i64,
        header: String,
        rotate: bool,
        movable: usize,
    },
    EditBoard {
        message_ref: i64,
        rotate: bool,
        movable: usize,
    },
    TurnAlert {
        chat_id: i64,
        message_ref: i64,
    },
}

pub struct RecordingNotifier {
    sent: Mutex<Vec<Sent>>,
    next_ref: AtomicI64,
    fail_edits: AtomicBool,
}

impl Default for RecordingNotifier {
    fn default() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            next_ref: AtomicI64::new(500),
            fail_edits: AtomicBool::new(false),
        }
    }
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    pub fn fail_edits(&self, fail: bool) {
        self.fail_edits.store(fail, Ordering::SeqCst);
    }

    pub fn count(&self, pred: impl Fn(&Sent) -> bool) -> usize {
        self.sent.lock().iter().filter(|s| pred(s)).count()
    }

    pub fn turn_alerts(&self) -> usize {
        self.count(|s| matches!(s, Sent::TurnAlert { .. }))
    }

    pub fn renders(&self) -> usize {
        self.count(|s| matches!(s, Sent::EditFull { .. } | Sent::EditBoard { .. }))
    }

    pub fn initials(&self) -> usize {
        self.count(|s| matches!(s, Sent::Initial { .. }))
    }
}

#[async_trait]
impl NotificationDispatcher for RecordingNotifier {
    async fn send_initial(&self, chat_id: i64, game_id: &str) -> Result<i64, AppError> {
        self.sent.lock().push(Sent::Initial {
            chat_id,
            game_id: game_id.to_string(),
        });
        Ok(self.next_ref.fetch_add(1, Ordering::SeqCst))
    }

    async fn edit_full(&self, update: &BoardUpdate, header: &str) -> Result<(), AppError> {
        self.sent.lock().push(Sent::EditFull {
            message_ref: update.message_ref,
            header: header.to_string(),
            rotate: update.rotate,
            movable: update.snapshot.movable_from.len(),
        });
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(AppError::notification("editMessageText rejected"));
        }
        Ok(())
    }

    async fn edit_board_only(&self, update: &BoardUpdate) -> Result<(), AppError> {
        self.sent.lock().push(Sent::EditBoard {
            message_ref: update.message_ref,
            rotate: update.rotate,
            movable: update.snapshot.movable_from.len(),
        });
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(AppError::notification("editMessageReplyMarkup rejected"));
        }
        Ok(())
    }

    async fn send_turn_alert(&self, chat_id: i64, message_ref: i64) -> Result<(), AppError> {
        self.sent.lock().push(Sent::TurnAlert {
            chat_id,
            message_ref,
        });
        Ok(())
    }
}
