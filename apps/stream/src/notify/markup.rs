//! Inline keyboard rendering of a board position.

use serde::Serialize;
use shakmaty::{Color, File, Piece, Rank, Role, Square};

use crate::domain::BoardSnapshot;

const EMPTY_SQUARE: &str = " ";
const NO_ACTION: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

/// 8x8 keyboard, rank 8 on top and the a-file on the left, turned around
/// when `rotate` is set.
pub fn board_keyboard(snapshot: &BoardSnapshot, rotate: bool) -> InlineKeyboardMarkup {
    let mut rows: Vec<Vec<InlineKeyboardButton>> = Rank::ALL
        .iter()
        .rev()
        .map(|&rank| {
            File::ALL
                .iter()
                .map(|&file| square_button(snapshot, Square::from_coords(file, rank)))
                .collect()
        })
        .collect();

    if rotate {
        rows.reverse();
        for row in &mut rows {
            row.reverse();
        }
    }

    InlineKeyboardMarkup {
        inline_keyboard: rows,
    }
}

fn square_button(snapshot: &BoardSnapshot, square: Square) -> InlineKeyboardButton {
    let text = match snapshot.board.piece_at(square) {
        Some(piece) => glyph(piece).to_string(),
        None => EMPTY_SQUARE.to_string(),
    };
    let callback_data = if snapshot.movable_from.contains(&square) {
        format!("select_{square}")
    } else {
        NO_ACTION.to_string()
    };
    InlineKeyboardButton {
        text,
        callback_data,
    }
}

fn glyph(piece: Piece) -> char {
    match (piece.color, piece.role) {
        (Color::White, Role::Rook) => '♜',
        (Color::White, Role::Knight) => '♞',
        (Color::White, Role::Bishop) => '♝',
        (Color::White, Role::Queen) => '♛',
        (Color::White, Role::King) => '♚',
        (Color::White, Role::Pawn) => '♙',
        (Color::Black, Role::Rook) => '♖',
        (Color::Black, Role::Knight) => '♘',
        (Color::Black, Role::Bishop) => '♗',
        (Color::Black, Role::Queen) => '♕',
        (Color::Black, Role::King) => '♔',
        (Color::Black, Role::Pawn) => '♟',
    }
}
