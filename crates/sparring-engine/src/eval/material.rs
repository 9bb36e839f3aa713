//! Material balance evaluation.
//!
//! Counts weighted piece material for each side. Also supplies the centipawn
//! table the search uses for MVV-LVA ordering and delta pruning.

use cozy_chess::{Board, Color, Piece};

use crate::eval::{Evaluator, relative_to_mover};

/// Centipawn values indexed by `Piece as usize`.
///
/// | Piece  | cp  |
/// |--------|-----|
/// | Pawn   | 100 |
/// | Knight | 320 |
/// | Bishop | 330 |
/// | Rook   | 500 |
/// | Queen  | 900 |
/// | King   |   0 |
pub const PIECE_VALUES: [i32; Piece::NUM] = [100, 320, 330, 500, 900, 0];

/// Number of `piece`s of `color` on the board.
#[inline]
pub fn count(board: &Board, color: Color, piece: Piece) -> i32 {
    board.colored_pieces(color, piece).len() as i32
}

/// Material balance under `values`, from White's perspective.
pub fn material_balance(board: &Board, values: &[i32; Piece::NUM]) -> i32 {
    Piece::ALL
        .iter()
        .map(|&piece| {
            let diff = count(board, Color::White, piece) - count(board, Color::Black, piece);
            values[piece as usize] * diff
        })
        .sum()
}

/// Fixed piece values summed over the board.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialEval;

impl Evaluator for MaterialEval {
    fn name(&self) -> &'static str {
        "material"
    }

    fn evaluate(&self, board: &Board) -> i32 {
        relative_to_mover(board, material_balance(board, &PIECE_VALUES))
    }
}
