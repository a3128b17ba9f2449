//! Pure game logic: turn detection and move replay.

pub mod board;
pub mod moves;

pub use board::{replay, BoardSnapshot, Replay};
pub use moves::{is_your_turn, ply_count};
