//! Helpers over lichess move strings: space separated UCI tokens holding the
//! full history to date.

/// Number of half-moves in `moves`, ignoring empty tokens.
pub fn ply_count(moves: &str) -> usize {
    moves.split(' ').filter(|token| !token.is_empty()).count()
}

/// Whether the side playing `is_white` is to move after `moves`.
///
/// White moves on even ply counts, starting with the empty history.
pub fn is_your_turn(is_white: bool, moves: &str) -> bool {
    (ply_count(moves) % 2 == 0) == is_white
}
