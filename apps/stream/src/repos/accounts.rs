//! Account repository functions (read-only).

use sea_orm::ConnectionTrait;

use crate::adapters::accounts_sea as accounts_adapter;
use crate::entities::accounts;
use crate::errors::domain::DomainError;

/// A linked lichess identity.
#[derive(Clone, PartialEq)]
pub struct Account {
    pub id: i64,
    /// Telegram chat that receives the notifications.
    pub chat_id: i64,
    pub lichess_id: String,
    pub token: String,
}

// Keep the token out of logs.
impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("chat_id", &self.chat_id)
            .field("lichess_id", &self.lichess_id)
            .field("token", &"<redacted>")
            .finish()
    }
}

pub async fn find_account<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    account_id: i64,
) -> Result<Option<Account>, DomainError> {
    let account = accounts_adapter::find_by_id(conn, account_id).await?;
    Ok(account.map(Account::from))
}

pub async fn subscribed_account_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
) -> Result<Vec<i64>, DomainError> {
    Ok(accounts_adapter::ids_with_token(conn).await?)
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: model.id,
            chat_id: model.user_id,
            lichess_id: model.lichess_id,
            token: model.token,
        }
    }
}
