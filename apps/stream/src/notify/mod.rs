//! Outbound notifications: the dispatcher seam and its Telegram implementation.

pub mod markup;
pub mod telegram;

use async_trait::async_trait;

use crate::domain::BoardSnapshot;
use crate::error::AppError;

pub use telegram::TelegramDispatcher;

/// Everything needed to redraw the board message of one game.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardUpdate {
    pub chat_id: i64,
    pub message_ref: i64,
    pub snapshot: BoardSnapshot,
    /// Draw from black's side.
    pub rotate: bool,
}

/// Sends and edits the messages a game is mirrored into.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Post the placeholder for a new game; returns its message reference.
    async fn send_initial(&self, chat_id: i64, game_id: &str) -> Result<i64, AppError>;

    /// Replace text and board.
    async fn edit_full(&self, update: &BoardUpdate, header: &str) -> Result<(), AppError>;

    /// Replace the board only; the text stays.
    async fn edit_board_only(&self, update: &BoardUpdate) -> Result<(), AppError>;

    /// Short reply to the board message telling the player to move.
    async fn send_turn_alert(&self, chat_id: i64, message_ref: i64) -> Result<(), AppError>;
}
