//! Move replay on top of `shakmaty`.
//!
//! Lichess sends the whole history as UCI tokens. Promotions without a
//! piece suffix are resolved to a queen.

use shakmaty::uci::UciMove;
use shakmaty::{Board, Chess, Position, Rank, Role, Square};

use crate::errors::domain::DomainError;

/// Position reached after replaying a move list.
#[derive(Debug, Clone)]
pub struct Replay {
    position: Chess,
}

/// What a board render needs: piece placement plus the squares the viewer
/// may pick up (empty when it is not their turn).
#[derive(Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub board: Board,
    pub movable_from: Vec<Square>,
}

/// Replay `moves` from the standard starting position.
pub fn replay(moves: &str) -> Result<Replay, DomainError> {
    let mut position = Chess::default();

    for (ply, token) in moves.split(' ').filter(|t| !t.is_empty()).enumerate() {
        let uci = token
            .parse::<UciMove>()
            .map_err(|_| DomainError::validation(format!("ply {ply}: unreadable move '{token}'")))?;
        let uci = auto_queen(&position, uci);
        let chess_move = uci
            .to_move(&position)
            .map_err(|_| DomainError::validation(format!("ply {ply}: illegal move '{token}'")))?;
        position.play_unchecked(&chess_move);
    }

    Ok(Replay { position })
}

/// A pawn reaching the last rank without a promotion piece becomes a queen.
fn auto_queen(position: &Chess, uci: UciMove) -> UciMove {
    match uci {
        UciMove::Normal {
            from,
            to,
            promotion: None,
        } if position.board().role_at(from) == Some(Role::Pawn)
            && matches!(to.rank(), Rank::First | Rank::Eighth) =>
        {
            UciMove::Normal {
                from,
                to,
                promotion: Some(Role::Queen),
            }
        }
        other => other,
    }
}

impl Replay {
    pub fn board(&self) -> &Board {
        self.position.board()
    }

    /// Legal moves as (from, to) pairs.
    pub fn legal_moves(&self) -> Vec<(Square, Square)> {
        self.position
            .legal_moves()
            .iter()
            .filter_map(|m| m.from().map(|from| (from, m.to())))
            .collect()
    }

    /// Render input; legal moves are only exposed to the side to move.
    pub fn snapshot(&self, your_turn: bool) -> BoardSnapshot {
        let mut movable_from = Vec::new();
        if your_turn {
            for (from, _) in self.legal_moves() {
                if !movable_from.contains(&from) {
                    movable_from.push(from);
                }
            }
        }
        BoardSnapshot {
            board: self.board().clone(),
            movable_from,
        }
    }
}
