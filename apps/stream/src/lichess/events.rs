//! Wire types for the account feed (`/api/stream/event`) and the per-game
//! board feed (`/api/board/game/stream/{id}`).
//!
//! Unknown `type` values decode to `Other` so new event kinds never break a
//! stream.

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum AccountEvent {
    GameStart { game: GameRef },
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    GameFull(GameFull),
    GameState(GameStateEvent),
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameFull {
    pub white: Player,
    pub black: Player,
    #[serde(default)]
    pub state: Option<GameStateEvent>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GameStateEvent {
    #[serde(default)]
    pub moves: String,
}

/// One side of a game. AI opponents have no id or name, only `aiLevel`.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub rating: Option<u32>,
    #[serde(default)]
    pub ai_level: Option<u8>,
}

impl Player {
    pub fn display_name(&self) -> String {
        match (&self.name, self.ai_level) {
            (Some(name), _) => name.clone(),
            (None, Some(level)) => format!("Stockfish level {level}"),
            (None, None) => "Anonymous".to_string(),
        }
    }

    /// "Name (1500)" or just "Name" when unrated.
    pub fn label(&self) -> String {
        match self.rating {
            Some(rating) => format!("{} ({rating})", self.display_name()),
            None => self.display_name(),
        }
    }
}

impl GameFull {
    /// Message header shown above the board.
    pub fn header(&self) -> String {
        format!(
            "White {}\n\nBlack {}",
            self.white.label(),
            self.black.label()
        )
    }
}
