//! Square-coverage evaluation.
//!
//! Every piece earns a point per square it attacks and one more when that
//! square holds a piece of either colour. Material is ignored.

use cozy_chess::{
    BitBoard, Board, Color, Piece, Square, get_bishop_moves, get_king_moves, get_knight_moves,
    get_pawn_attacks, get_rook_moves,
};

use crate::eval::{Evaluator, relative_to_mover};

/// Squares attacked by `piece` of `color` standing on `sq`.
pub fn attacks(piece: Piece, color: Color, sq: Square, occupied: BitBoard) -> BitBoard {
    match piece {
        Piece::Pawn => get_pawn_attacks(sq, color),
        Piece::Knight => get_knight_moves(sq),
        Piece::Bishop => get_bishop_moves(sq, occupied),
        Piece::Rook => get_rook_moves(sq, occupied),
        Piece::Queen => get_bishop_moves(sq, occupied) | get_rook_moves(sq, occupied),
        Piece::King => get_king_moves(sq),
    }
}

/// Coverage points earned by all pieces of `color`.
pub fn coverage(board: &Board, color: Color) -> i32 {
    let occupied = board.occupied();
    let mut total = 0;
    for piece in Piece::ALL {
        for sq in board.colored_pieces(color, piece) {
            let attacked = attacks(piece, color, sq, occupied);
            total += attacked.len() + (attacked & occupied).len();
        }
    }
    total as i32
}

/// Attack-coverage evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoverageEval;

impl Evaluator for CoverageEval {
    fn name(&self) -> &'static str {
        "coverage"
    }

    fn evaluate(&self, board: &Board) -> i32 {
        relative_to_mover(board, coverage(board, Color::White) - coverage(board, Color::Black))
    }

    fn delta_margin(&self) -> Option<i32> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(fen: &str) -> Board {
        Board::from_fen(fen, false).unwrap()
    }

    #[test]
    fn starting_position_is_balanced() {
        let b = Board::default();
        assert_eq!(coverage(&b, Color::White), coverage(&b, Color::Black));
        assert_eq!(CoverageEval.evaluate(&b), 0);
    }

    #[test]
    fn lone_knight_in_corner() {
        // Na1 covers b3 and c2; Ke1 covers d1 d2 e2 f2 f1.
        let b = board("7k/8/8/8/8/8/8/N3K3 w - - 0 1");
        assert_eq!(coverage(&b, Color::White), 2 + 5);
    }

    #[test]
    fn occupied_targets_count_double() {
        // Ra1 sees a2 and e1 (both occupied) plus b1 c1 d1.
        let b = board("7k/8/8/8/8/8/P7/R3K3 w - - 0 1");
        let rook = 2 * 2 + 3;
        let king = 5;
        let pawn = 1;
        assert_eq!(coverage(&b, Color::White), rook + king + pawn);
    }

    #[test]
    fn more_active_side_is_ahead() {
        let b = board("7k/8/8/8/3Q4/8/8/4K3 b - - 0 1");
        assert!(CoverageEval.evaluate(&b) < 0);
    }
}
