//! DTOs for games_sea adapter.

/// DTO for creating a game row when a lichess game first starts.
#[derive(Debug, Clone)]
pub struct GameCreate {
    pub account_id: i64,
    pub game_id: String,
    pub message_id: i64,
}

impl GameCreate {
    pub fn new(account_id: i64, game_id: impl Into<String>, message_id: i64) -> Self {
        Self {
            account_id,
            game_id: game_id.into(),
            message_id,
        }
    }
}

/// DTO for overwriting the move history (and optionally the colour).
///
/// `is_white = None` leaves the stored colour untouched.
#[derive(Debug, Clone)]
pub struct GameUpdate {
    pub id: i64,
    pub moves: String,
    pub is_white: Option<bool>,
}

impl GameUpdate {
    pub fn new(id: i64, moves: impl Into<String>) -> Self {
        Self {
            id,
            moves: moves.into(),
            is_white: None,
        }
    }

    pub fn with_is_white(mut self, is_white: bool) -> Self {
        self.is_white = Some(is_white);
        self
    }
}
