//! Uniform random mover.
//!
//! The baseline every real strategy should beat. No search, no evaluation:
//! one legal move picked uniformly, wrapped in a one-ply [`SearchResult`].

use cozy_chess::Board;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::rules;
use crate::search::{SearchResult, Termination};
use crate::search::negamax::{DRAW_SCORE, mated_in};

/// Plays a uniformly random legal move.
#[derive(Debug, Clone)]
pub struct RandomMover {
    rng: StdRng,
}

impl RandomMover {
    /// Seeded for reproducible games, or from entropy when `seed` is `None`.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng }
    }

    /// Pick a move for `board`.
    pub fn choose(&mut self, board: &Board) -> SearchResult {
        let moves = rules::legal_moves(board);
        let Some(&mv) = moves.choose(&mut self.rng) else {
            let score = if rules::in_check(board) {
                mated_in(0)
            } else {
                DRAW_SCORE
            };
            return SearchResult {
                best_move: None,
                pv: Vec::new(),
                score,
                nodes: 1,
                depth: 0,
                termination: Termination::NoLegalMoves,
            };
        };

        SearchResult {
            best_move: Some(mv),
            pv: vec![mv],
            score: DRAW_SCORE,
            nodes: 1,
            depth: 1,
            termination: Termination::DepthReached,
        }
    }
}
