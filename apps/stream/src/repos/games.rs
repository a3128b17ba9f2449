//! Game repository functions for the domain layer.

use sea_orm::ConnectionTrait;

use crate::adapters::games_sea as games_adapter;
use crate::entities::games;
use crate::errors::domain::DomainError;

/// A watched lichess game as the stream engine sees it.
#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    pub id: i64,
    pub account_id: i64,
    /// Lichess game id.
    pub external_game_id: String,
    /// Space separated UCI history; `None` until the first full-state event.
    pub moves: Option<String>,
    pub is_white: Option<bool>,
    /// Telegram message holding the board.
    pub notification_ref: i64,
    pub created_at: time::OffsetDateTime,
}

pub async fn find_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    account_id: i64,
    external_game_id: &str,
) -> Result<Option<Game>, DomainError> {
    let game =
        games_adapter::find_by_account_and_game(conn, account_id, external_game_id).await?;
    Ok(game.map(Game::from))
}

pub async fn create_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    external_game_id: &str,
    account_id: i64,
    notification_ref: i64,
) -> Result<Game, DomainError> {
    let dto = games_adapter::GameCreate::new(account_id, external_game_id, notification_ref);
    let game = games_adapter::create_game(conn, dto).await?;
    Ok(Game::from(game))
}

/// Overwrite the stored history; `is_white = None` keeps the stored colour.
pub async fn update_game<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    game_id: i64,
    moves: &str,
    is_white: Option<bool>,
) -> Result<(), DomainError> {
    let mut dto = games_adapter::GameUpdate::new(game_id, moves);
    if let Some(is_white) = is_white {
        dto = dto.with_is_white(is_white);
    }
    games_adapter::update_game(conn, dto).await?;
    Ok(())
}

impl From<games::Model> for Game {
    fn from(model: games::Model) -> Self {
        Self {
            id: model.id,
            account_id: model.account_id,
            external_game_id: model.game_id,
            moves: model.moves,
            is_white: model.is_white,
            notification_ref: model.message_id,
            created_at: model.created_at,
        }
    }
}
