//! Main feed reader: turns `gameStart` events into game rows and game streams.

use futures::StreamExt;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::registry::SubscriptionRegistry;
use super::StreamDeps;
use crate::error::AppError;
use crate::lichess::AccountEvent;
use crate::repos::{Account, Game};

pub struct AccountStreamReader {
    account_id: i64,
    deps: StreamDeps,
    registry: SubscriptionRegistry,
    cancel: CancellationToken,
}

impl AccountStreamReader {
    pub fn new(
        account_id: i64,
        deps: StreamDeps,
        registry: SubscriptionRegistry,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            account_id,
            deps,
            registry,
            cancel,
        }
    }

    /// Read until the feed ends, fails, or the token is cancelled.
    pub async fn run(self) {
        let account_id = self.account_id;
        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                debug!(account_id, "account stream cancelled");
                return;
            }
            outcome = self.read() => outcome,
        };

        match outcome {
            Ok(()) => info!(account_id, "account stream closed"),
            Err(err) => warn!(
                account_id,
                code = %err.code(),
                error = %err,
                "account stream failed"
            ),
        }
    }

    async fn read(&self) -> Result<(), AppError> {
        let Some(account) = self.deps.accounts.find_account(self.account_id).await? else {
            warn!(account_id = self.account_id, "account not found; nothing to watch");
            return Ok(());
        };

        let mut events = self.deps.events.account_events(&account.token).await?;
        info!(account_id = account.id, "account stream opened");

        while let Some(event) = events.next().await {
            match event? {
                AccountEvent::GameStart { game } => {
                    if let Err(err) = self.on_game_start(&account, &game.id).await {
                        warn!(
                            account_id = account.id,
                            game_id = %game.id,
                            code = %err.code(),
                            error = %err,
                            "gameStart not handled"
                        );
                    }
                }
                AccountEvent::Other => {}
            }
        }
        Ok(())
    }

    async fn on_game_start(&self, account: &Account, external_game_id: &str) -> Result<(), AppError> {
        let game = match self
            .deps
            .games
            .find_game(account.id, external_game_id)
            .await?
        {
            Some(game) => game,
            None => self.create_game(account, external_game_id).await?,
        };

        if self.registry.open_game(&self.cancel, account, game) {
            info!(account_id = account.id, game_id = external_game_id, "game stream opened");
        } else {
            debug!(account_id = account.id, game_id = external_game_id, "game stream already live");
        }
        Ok(())
    }

    /// Post the placeholder message, then insert the row pointing at it.
    async fn create_game(&self, account: &Account, external_game_id: &str) -> Result<Game, AppError> {
        let message_ref = self
            .deps
            .notifier
            .send_initial(account.chat_id, external_game_id)
            .await?;

        match self
            .deps
            .games
            .create_game(external_game_id, account.id, message_ref)
            .await
        {
            Ok(game) => {
                info!(account_id = account.id, game_id = external_game_id, "game created");
                Ok(game)
            }
            // Another reader won the insert; use its row.
            Err(err) if err.is_unique_game_conflict() => self
                .deps
                .games
                .find_game(account.id, external_game_id)
                .await?
                .ok_or_else(|| AppError::internal("game row missing after unique conflict")),
            Err(err) => Err(err.into()),
        }
    }
}
