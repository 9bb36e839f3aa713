//! Material with a dynamic bishop value.
//!
//! A side that keeps both bishops values each above base; a side left with a
//! single bishop values it below base. A small "diversity" term rewards
//! keeping more pieces on the board.

use cozy_chess::{Board, Color, Piece};

use crate::eval::material::{PIECE_VALUES, count, material_balance};
use crate::eval::{Evaluator, relative_to_mover};

/// Added to each bishop of a side holding exactly two.
pub const PAIR_BONUS: i32 = 25;

/// Subtracted from a lone bishop.
pub const LONE_BISHOP_PENALTY: i32 = 50;

/// Per unit of difference in non-king piece count.
pub const DIVERSITY_WEIGHT: i32 = 5;

fn bishop_adjustment(bishops: i32) -> i32 {
    match bishops {
        0 => 0,
        1 => -LONE_BISHOP_PENALTY,
        2 => 2 * PAIR_BONUS,
        _ => 0,
    }
}

fn non_king_pieces(board: &Board, color: Color) -> i32 {
    (board.colors(color) & !board.pieces(Piece::King)).len() as i32
}

/// Bishop-pair aware material evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct BishopPairEval;

impl BishopPairEval {
    /// Score from White's perspective.
    pub fn white_score(board: &Board) -> i32 {
        let base = material_balance(board, &PIECE_VALUES);
        let bishops = bishop_adjustment(count(board, Color::White, Piece::Bishop))
            - bishop_adjustment(count(board, Color::Black, Piece::Bishop));
        let diversity = DIVERSITY_WEIGHT
            * (non_king_pieces(board, Color::White) - non_king_pieces(board, Color::Black));
        base + bishops + diversity
    }
}

impl Evaluator for BishopPairEval {
    fn name(&self) -> &'static str {
        "bishop-pair"
    }

    fn evaluate(&self, board: &Board) -> i32 {
        relative_to_mover(board, Self::white_score(board))
    }
}
