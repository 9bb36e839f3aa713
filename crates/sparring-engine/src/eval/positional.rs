//! Material plus piece-square tables.

use cozy_chess::{Board, Color, Piece};

use crate::eval::material::{PIECE_VALUES, material_balance};
use crate::eval::phase::{ENDGAME_THRESHOLD, is_endgame};
use crate::eval::pst::pst_value;
use crate::eval::{Evaluator, relative_to_mover};

/// Piece-square evaluation with a phase-dependent king table.
#[derive(Debug, Clone, Copy)]
pub struct PositionalEval {
    endgame_threshold: i32,
}

impl PositionalEval {
    /// Evaluator declaring the endgame below `endgame_threshold` centipawns of
    /// non-pawn material per side.
    pub fn new(endgame_threshold: i32) -> Self {
        Self { endgame_threshold }
    }

    /// Sum of table bonuses from White's perspective.
    fn placement(board: &Board, endgame: bool) -> i32 {
        let mut score = 0;
        for color in [Color::White, Color::Black] {
            let sign = if color == Color::White { 1 } else { -1 };
            for piece in Piece::ALL {
                for sq in board.colored_pieces(color, piece) {
                    score += sign * pst_value(piece, color, sq, endgame);
                }
            }
        }
        score
    }

    /// Score from White's perspective.
    pub fn white_score(&self, board: &Board) -> i32 {
        let endgame = is_endgame(board, self.endgame_threshold);
        material_balance(board, &PIECE_VALUES) + Self::placement(board, endgame)
    }
}

impl Default for PositionalEval {
    fn default() -> Self {
        Self::new(ENDGAME_THRESHOLD)
    }
}

impl Evaluator for PositionalEval {
    fn name(&self) -> &'static str {
        "positional"
    }

    fn evaluate(&self, board: &Board) -> i32 {
        relative_to_mover(board, self.white_score(board))
    }
}
