//! Store seams used by the stream readers.
//!
//! `SeaStore` is the database-backed implementation; tests substitute
//! in-memory fakes.

use async_trait::async_trait;
use sea_orm::DatabaseConnection;

use super::{accounts, games, Account, Game};
use crate::errors::domain::DomainError;

/// Persistence of `Game` rows. Performs no deduplication: `update_game`
/// always writes.
#[async_trait]
pub trait GameStore: Send + Sync {
    async fn find_game(
        &self,
        account_id: i64,
        external_game_id: &str,
    ) -> Result<Option<Game>, DomainError>;

    async fn create_game(
        &self,
        external_game_id: &str,
        account_id: i64,
        notification_ref: i64,
    ) -> Result<Game, DomainError>;

    async fn update_game(
        &self,
        game_id: i64,
        moves: &str,
        is_white: Option<bool>,
    ) -> Result<(), DomainError>;
}

/// Read access to linked accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_account(&self, account_id: i64) -> Result<Option<Account>, DomainError>;

    /// Accounts with a stored token; resubscribed on startup.
    async fn subscribed_accounts(&self) -> Result<Vec<i64>, DomainError>;
}

#[derive(Debug, Clone)]
pub struct SeaStore {
    db: DatabaseConnection,
}

impl SeaStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl GameStore for SeaStore {
    async fn find_game(
        &self,
        account_id: i64,
        external_game_id: &str,
    ) -> Result<Option<Game>, DomainError> {
        games::find_game(&self.db, account_id, external_game_id).await
    }

    async fn create_game(
        &self,
        external_game_id: &str,
        account_id: i64,
        notification_ref: i64,
    ) -> Result<Game, DomainError> {
        games::create_game(&self.db, external_game_id, account_id, notification_ref).await
    }

    async fn update_game(
        &self,
        game_id: i64,
        moves: &str,
        is_white: Option<bool>,
    ) -> Result<(), DomainError> {
        games::update_game(&self.db, game_id, moves, is_white).await
    }
}

#[async_trait]
impl AccountStore for SeaStore {
    async fn find_account(&self, account_id: i64) -> Result<Option<Account>, DomainError> {
        accounts::find_account(&self.db, account_id).await
    }

    async fn subscribed_accounts(&self) -> Result<Vec<i64>, DomainError> {
        accounts::subscribed_account_ids(&self.db).await
    }
}
