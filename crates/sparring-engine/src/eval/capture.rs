//! Trade-hungry evaluation.
//!
//! Scores positions by how much material has already left the board, plus a
//! bonus for every capture on offer that does not lose too much in the
//! exchange. The aim is to simplify toward a drawn, bare board.

use cozy_chess::{Board, Color, Piece};

use crate::eval::material::count;
use crate::eval::{Evaluator, ExchangePolicy};
use crate::rules;
use crate::search::see::{ValueTable, see};

/// Point scale: P=1, N=3, B=3, R=5, Q=9. The king is priced out of any trade.
pub const CAPTURE_SCALE: ValueTable = [1, 3, 3, 5, 9, 100];

/// Non-king points on the board at the start of a game.
pub const STARTING_POINTS: i32 = 78;

/// Score per point of material removed from the board.
pub const REDUCTION_WEIGHT: i32 = 100;

/// Bonus per acceptable capture available to the side to move.
pub const CAPTURE_BONUS: i32 = 25;

/// Score of being checkmated.
pub const CHECKMATED: i32 = -20_000;

/// Default acceptable SEE loss, in points.
pub const DEFAULT_MAX_LOSS: i32 = 1;

/// Non-king points of both sides together.
pub fn total_points(board: &Board) -> i32 {
    [Piece::Pawn, Piece::Knight, Piece::Bishop, Piece::Rook, Piece::Queen]
        .iter()
        .map(|&piece| {
            CAPTURE_SCALE[piece as usize]
                * (count(board, Color::White, piece) + count(board, Color::Black, piece))
        })
        .sum()
}

/// Capture-maximising evaluator.
#[derive(Debug, Clone, Copy)]
pub struct CaptureEval {
    policy: ExchangePolicy,
}

impl CaptureEval {
    /// Evaluator accepting exchanges that lose at most `max_loss` points.
    pub fn new(max_loss: i32) -> Self {
        Self {
            policy: ExchangePolicy {
                values: CAPTURE_SCALE,
                max_loss,
            },
        }
    }

    /// Captures available to the side to move that pass the exchange test.
    pub fn acceptable_captures(&self, board: &Board, moves: &[cozy_chess::Move]) -> usize {
        moves
            .iter()
            .filter(|&&mv| rules::is_capture(board, mv))
            .filter(|&&mv| self.policy.accepts(see(board, mv, &self.policy.values)))
            .count()
    }
}

impl Default for CaptureEval {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LOSS)
    }
}

impl Evaluator for CaptureEval {
    fn name(&self) -> &'static str {
        "capture"
    }

    /// Already relative to the side to move: both terms reward whoever is on move.
    fn evaluate(&self, board: &Board) -> i32 {
        let moves = rules::legal_moves(board);
        if moves.is_empty() && rules::in_check(board) {
            return CHECKMATED;
        }

        let reduction = (STARTING_POINTS - total_points(board)) * REDUCTION_WEIGHT;
        reduction + CAPTURE_BONUS * self.acceptable_captures(board, &moves) as i32
    }

    fn delta_margin(&self) -> Option<i32> {
        None
    }

    fn exchange_policy(&self) -> Option<ExchangePolicy> {
        Some(self.policy)
    }
}
