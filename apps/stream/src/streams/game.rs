//! Per-game reader: reconciles each feed event with the stored row and
//! emits only the side effects new information warrants.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::StreamDeps;
use crate::domain::{is_your_turn, replay};
use crate::error::AppError;
use crate::lichess::{GameEvent, GameFull};
use crate::notify::BoardUpdate;
use crate::repos::{Account, Game};

pub struct GameStreamReader {
    deps: StreamDeps,
    account: Account,
    game: Game,
    cancel: CancellationToken,
    /// Last persisted history; only advanced after a successful write.
    moves: String,
    is_white: Option<bool>,
}

impl GameStreamReader {
    pub fn new(deps: StreamDeps, account: Account, game: Game, cancel: CancellationToken) -> Self {
        let moves = game.moves.clone().unwrap_or_default();
        let is_white = game.is_white;
        Self {
            deps,
            account,
            game,
            cancel,
            moves,
            is_white,
        }
    }

    pub async fn run(mut self) {
        let cancel = self.cancel.clone();
        let account_id = self.account.id;
        let game_id = self.game.external_game_id.clone();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(account_id, game_id = %game_id, "game stream cancelled");
                return;
            }
            outcome = self.read() => outcome,
        };

        match outcome {
            Ok(()) => info!(account_id, game_id = %game_id, "game stream closed"),
            Err(err) => warn!(
                account_id,
                game_id = %game_id,
                code = %err.code(),
                error = %err,
                "game stream failed"
            ),
        }
    }

    async fn read(&mut self) -> Result<(), AppError> {
        let mut events = self
            .deps
            .events
            .game_events(&self.account.token, &self.game.external_game_id)
            .await?;

        while let Some(event) = events.next().await {
            let handled = match event? {
                GameEvent::GameFull(full) => self.on_game_full(full).await,
                GameEvent::GameState(state) => self.on_game_state(state.moves).await,
                GameEvent::Other => Ok(()),
            };
            // A failed write skips this event's render; the stream goes on.
            if let Err(err) = handled {
                warn!(
                    account_id = self.account.id,
                    game_id = %self.game.external_game_id,
                    code = %err.code(),
                    error = %err,
                    "game event not applied"
                );
            }
        }
        Ok(())
    }

    async fn on_game_full(&mut self, full: GameFull) -> Result<(), AppError> {
        let header = full.header();
        let is_white = full.white.id.as_deref() == Some(self.account.lichess_id.as_str());
        let moves = match full.state {
            Some(state) => state.moves,
            None => self.moves.clone(),
        };

        if moves == self.moves && self.is_white == Some(is_white) {
            return Ok(());
        }

        self.deps
            .games
            .update_game(self.game.id, &moves, Some(is_white))
            .await?;
        self.moves = moves;
        self.is_white = Some(is_white);

        if let Some(update) = self.board_update() {
            if let Err(err) = self.deps.notifier.edit_full(&update, &header).await {
                self.log_dispatch_failure("edit_full", &err);
            }
        }
        self.alert_if_your_turn().await;
        Ok(())
    }

    async fn on_game_state(&mut self, moves: String) -> Result<(), AppError> {
        if moves == self.moves {
            return Ok(());
        }

        self.deps
            .games
            .update_game(self.game.id, &moves, None)
            .await?;
        self.moves = moves;

        if let Some(update) = self.board_update() {
            if let Err(err) = self.deps.notifier.edit_board_only(&update).await {
                self.log_dispatch_failure("edit_board_only", &err);
            }
        }
        self.alert_if_your_turn().await;
        Ok(())
    }

    fn your_turn(&self) -> bool {
        self.is_white
            .is_some_and(|is_white| is_your_turn(is_white, &self.moves))
    }

    async fn alert_if_your_turn(&self) {
        if !self.your_turn() {
            return;
        }
        if let Err(err) = self
            .deps
            .notifier
            .send_turn_alert(self.account.chat_id, self.game.notification_ref)
            .await
        {
            self.log_dispatch_failure("send_turn_alert", &err);
        }
    }

    /// `None` when the history cannot be replayed; the row is still saved.
    fn board_update(&self) -> Option<BoardUpdate> {
        let position = match replay(&self.moves) {
            Ok(position) => position,
            Err(err) => {
                warn!(
                    game_id = %self.game.external_game_id,
                    error = %err,
                    "move history not replayable; board not rendered"
                );
                return None;
            }
        };
        Some(BoardUpdate {
            chat_id: self.account.chat_id,
            message_ref: self.game.notification_ref,
            snapshot: position.snapshot(self.your_turn()),
            rotate: self.is_white == Some(false),
        })
    }

    fn log_dispatch_failure(&self, action: &str, err: &AppError) {
        warn!(
            account_id = self.account.id,
            game_id = %self.game.external_game_id,
            action,
            error = %err,
            "notification dispatch failed"
        );
    }
}
