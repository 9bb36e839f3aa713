//! Game phase from remaining non-pawn material.

use cozy_chess::{Board, Color, Piece};

use crate::eval::material::{PIECE_VALUES, count};

/// Endgame begins once both sides' non-pawn material falls below this (centipawns).
///
/// 1300 is a rook and a queen's worth.
pub const ENDGAME_THRESHOLD: i32 = 1300;

/// Non-pawn, non-king material of `color` in centipawns.
pub fn non_pawn_material(board: &Board, color: Color) -> i32 {
    [Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .iter()
        .map(|&piece| PIECE_VALUES[piece as usize] * count(board, color, piece))
        .sum()
}

/// Whether both sides are below `threshold` in non-pawn material.
pub fn is_endgame(board: &Board, threshold: i32) -> bool {
    non_pawn_material(board, Color::White) < threshold
        && non_pawn_material(board, Color::Black) < threshold
}
