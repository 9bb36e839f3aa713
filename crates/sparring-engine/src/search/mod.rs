//! Search algorithms and move ordering.

pub mod control;
pub mod heuristics;
pub mod negamax;
pub mod ordering;
pub mod params;
pub mod see;
pub mod tt;

use std::time::Duration;

use cozy_chess::{Board, Move};
use tracing::debug;

use crate::eval::Evaluator;
use crate::rules;
use control::SearchControl;
use heuristics::{HistoryTable, KillerTable};
use negamax::{DRAW_SCORE, INF, MATE_SCORE, MATE_THRESHOLD, MAX_PLY, PvTable, SearchContext};
use params::SearchParams;
use tt::TranspositionTable;

/// Why a search call returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// Every requested depth completed.
    DepthReached,
    /// The clock ran out.
    TimeExpired,
    /// The external stop flag was raised.
    Stopped,
    /// The node limit was reached.
    NodeLimit,
    /// The root position is checkmate or stalemate.
    NoLegalMoves,
}

/// Progress report emitted after every completed depth.
#[derive(Debug, Clone)]
pub struct SearchInfo {
    /// Depth just completed.
    pub depth: u8,
    /// Score in centipawns for the side to move.
    pub score: i32,
    /// Nodes visited so far in this search.
    pub nodes: u64,
    /// Time since the search started.
    pub elapsed: Duration,
    /// Principal variation of the completed depth.
    pub pv: Vec<Move>,
}

/// Result of a search call.
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Move to play, or `None` when the root has no legal move.
    pub best_move: Option<Move>,
    /// Principal variation; starts with `best_move` when there is one.
    pub pv: Vec<Move>,
    /// Score in centipawns from the side to move's perspective.
    pub score: i32,
    /// Total nodes visited.
    pub nodes: u64,
    /// Deepest fully completed iteration.
    pub depth: u8,
    /// Why the search ended.
    pub termination: Termination,
}

/// Signed number of moves until mate, if `score` is a mate score.
///
/// Positive when the side to move mates, negative when it gets mated.
pub fn mate_in_moves(score: i32) -> Option<i32> {
    if score > MATE_THRESHOLD {
        Some((MATE_SCORE - score + 1) / 2)
    } else if score < -MATE_THRESHOLD {
        Some(-(MATE_SCORE + score) / 2)
    } else {
        None
    }
}

/// Outcome of one completed depth.
struct Iteration {
    depth: u8,
    score: i32,
    best_move: Move,
    pv: Vec<Move>,
}

/// Iterative-deepening searcher.
///
/// Owns the transposition table, which survives across search calls, and the
/// evaluation strategy. Killer and history tables are rebuilt on every call.
pub struct Searcher {
    tt: TranspositionTable,
    evaluator: Box<dyn Evaluator>,
    params: SearchParams,
}

impl Searcher {
    /// Create a searcher with a `hash_mb` megabyte transposition table.
    pub fn new(evaluator: Box<dyn Evaluator>, params: SearchParams, hash_mb: usize) -> Self {
        Self {
            tt: TranspositionTable::new(hash_mb),
            evaluator,
            params,
        }
    }

    /// The active evaluation strategy.
    pub fn evaluator(&self) -> &dyn Evaluator {
        self.evaluator.as_ref()
    }

    /// Current pruning and ordering parameters.
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Swap in a reconfigured evaluator and the parameters derived from it.
    pub fn reconfigure(&mut self, evaluator: Box<dyn Evaluator>, params: SearchParams) {
        self.evaluator = evaluator;
        self.params = params;
    }

    /// Replace the parameters, keeping the evaluator.
    pub fn set_params(&mut self, params: SearchParams) {
        self.params = params;
    }

    /// Clear the transposition table (preserving the allocation).
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Reallocate the transposition table at `mb` megabytes.
    pub fn resize_tt(&mut self, mb: usize) {
        self.tt = TranspositionTable::new(mb);
    }

    /// Run iterative deepening from depth 1 up to `max_depth`.
    ///
    /// `history` holds the hashes of the game positions before `board`, oldest
    /// first, for repetition detection. `on_info` is called after every
    /// completed depth.
    pub fn search<F>(
        &mut self,
        board: &Board,
        history: &[u64],
        max_depth: u8,
        control: &SearchControl,
        mut on_info: F,
    ) -> SearchResult
    where
        F: FnMut(&SearchInfo),
    {
        let legal = rules::legal_moves(board);
        if legal.is_empty() {
            let score = if rules::in_check(board) {
                -MATE_SCORE
            } else {
                DRAW_SCORE
            };
            debug!(score, "no legal moves at the root");
            return SearchResult {
                best_move: None,
                pv: Vec::new(),
                score,
                nodes: 0,
                depth: 0,
                termination: Termination::NoLegalMoves,
            };
        }

        self.tt.new_generation();
        let max_depth = max_depth.clamp(1, (MAX_PLY - 1) as u8);

        let mut ctx = SearchContext {
            nodes: 0,
            tt: &mut self.tt,
            evaluator: self.evaluator.as_ref(),
            params: &self.params,
            control,
            pv: PvTable::new(),
            killers: KillerTable::new(),
            history: HistoryTable::new(),
            positions: history.to_vec(),
            root_best: None,
            root_first: None,
        };

        let mut completed: Option<Iteration> = None;
        let mut termination = Termination::DepthReached;

        for depth in 1..=max_depth {
            if control.should_stop_iterating() {
                termination = control.reason().unwrap_or(Termination::Stopped);
                break;
            }

            ctx.root_best = None;
            ctx.root_first = None;
            let score = negamax::negamax(board, depth, 0, -INF, INF, true, &mut ctx);

            if control.aborted() {
                termination = control.reason().unwrap_or(Termination::Stopped);
                debug!(depth, nodes = ctx.nodes, ?termination, "iteration aborted");
                break;
            }

            let pv = ctx.pv.root_pv();
            let Some(best_move) = pv.first().copied().or(ctx.root_best) else {
                break;
            };
            let pv = if pv.is_empty() { vec![best_move] } else { pv };

            debug!(depth, score, nodes = ctx.nodes, %best_move, "iteration complete");
            on_info(&SearchInfo {
                depth,
                score,
                nodes: ctx.nodes,
                elapsed: control.elapsed(),
                pv: pv.clone(),
            });

            completed = Some(Iteration {
                depth,
                score,
                best_move,
                pv,
            });
        }

        match completed {
            Some(it) => SearchResult {
                best_move: Some(it.best_move),
                pv: it.pv,
                score: it.score,
                nodes: ctx.nodes,
                depth: it.depth,
                termination,
            },
            None => {
                // Nothing finished: fall back to whatever the interrupted
                // iteration had, or to any legal move at all.
                let fallback = ctx.root_best.or(ctx.root_first).or(legal.first().copied());
                SearchResult {
                    best_move: fallback,
                    pv: fallback.into_iter().collect(),
                    score: 0,
                    nodes: ctx.nodes,
                    depth: 0,
                    termination,
                }
            }
        }
    }
}

impl std::fmt::Debug for Searcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Searcher")
            .field("tt", &self.tt)
            .field("evaluator", &self.evaluator.name())
            .field("params", &self.params)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::eval::material::MaterialEval;

    fn searcher() -> Searcher {
        Searcher::new(Box::new(MaterialEval), SearchParams::default(), 1)
    }

    fn board(fen: &str) -> Board {
        Board::from_fen(fen, false).unwrap()
    }

    fn unlimited() -> SearchControl {
        SearchControl::new_infinite(Arc::new(AtomicBool::new(false)))
    }

    fn search_depth(searcher: &mut Searcher, board: &Board, depth: u8) -> SearchResult {
        searcher.search(board, &[], depth, &unlimited(), |_| {})
    }

    const SCHOLARS_MATE: &str = "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4";

    #[test]
    fn depth_1_returns_legal_move() {
        let b = Board::default();
        let result = search_depth(&mut searcher(), &b, 1);
        let mv = result.best_move.expect("startpos has moves");
        assert!(b.is_legal(mv));
        assert_eq!(result.depth, 1);
        assert_eq!(result.termination, Termination::DepthReached);
    }

    #[test]
    fn finds_mate_in_one() {
        let b = board(SCHOLARS_MATE);
        let result = search_depth(&mut searcher(), &b, 2);
        assert_eq!(result.best_move.map(|m| m.to_string()).as_deref(), Some("h5f7"));
        assert_eq!(result.score, MATE_SCORE - 1);
        assert_eq!(mate_in_moves(result.score), Some(1));
    }

    #[test]
    fn null_move_does_not_hide_mate_in_one() {
        let b = board(SCHOLARS_MATE);
        let result = search_depth(&mut searcher(), &b, 5);
        assert_eq!(result.best_move.map(|m| m.to_string()).as_deref(), Some("h5f7"));
        assert!(result.score > MATE_THRESHOLD);
    }

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";

    fn nodes_with(params: SearchParams, fen: &str, depth: u8) -> u64 {
        let mut s = Searcher::new(Box::new(MaterialEval), params, 1);
        search_depth(&mut s, &board(fen), depth).nodes
    }

    #[test]
    fn null_move_reduces_nodes_in_a_middlegame() {
        let off = SearchParams {
            null_move_min_depth: u8::MAX,
            ..SearchParams::default()
        };
        let with = nodes_with(SearchParams::default(), KIWIPETE, 5);
        let without = nodes_with(off, KIWIPETE, 5);
        assert!(with < without, "null move {with} nodes, plain {without} nodes");
    }

    #[test]
    fn null_move_reduction_is_configurable() {
        let shallow = SearchParams {
            null_move_reduction: 1,
            ..SearchParams::default()
        };
        let deep = SearchParams {
            null_move_reduction: 4,
            ..SearchParams::default()
        };
        assert_ne!(nodes_with(shallow, KIWIPETE, 5), nodes_with(deep, KIWIPETE, 5));

        let options = crate::options::EngineOptions::default().with_null_move_reduction(2);
        assert_eq!(SearchParams::new(&options, &MaterialEval).null_move_reduction, 2);
    }

    #[test]
    fn pawn_endgame_gives_the_same_answer_without_null_move() {
        // Mutual zugzwang: whoever moves must give ground.
        let fen = "8/8/4k3/4p3/4P3/4K3/8/8 w - - 0 1";
        let off = SearchParams {
            null_move_min_depth: u8::MAX,
            ..SearchParams::default()
        };
        let mut with = Searcher::new(Box::new(MaterialEval), SearchParams::default(), 1);
        let mut without = Searcher::new(Box::new(MaterialEval), off, 1);
        let a = search_depth(&mut with, &board(fen), 5);
        let b = search_depth(&mut without, &board(fen), 5);
        assert_eq!(a.best_move, b.best_move);
        assert_eq!(a.score, b.score);
        assert_eq!(a.nodes, b.nodes);
    }

    #[test]
    fn delta_pruning_still_takes_a_hanging_queen() {
        let params = SearchParams {
            delta_margin: Some(200),
            ..SearchParams::default()
        };
        let mut s = Searcher::new(Box::new(MaterialEval), params, 1);
        let result = search_depth(&mut s, &board("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1"), 2);
        assert_eq!(result.best_move.map(|m| m.to_string()).as_deref(), Some("e4d5"));
    }

    #[test]
    fn stalemate_has_no_move_and_scores_zero() {
        let b = board("k7/2K5/1Q6/8/8/8/8/8 b - - 0 1");
        let result = search_depth(&mut searcher(), &b, 4);
        assert_eq!(result.score, 0);
        assert!(result.best_move.is_none());
        assert_eq!(result.termination, Termination::NoLegalMoves);
    }

    #[test]
    fn checkmated_root_has_no_move_and_scores_mated() {
        let b = board("7k/6Q1/5K2/8/8/8/8/8 b - - 0 1");
        let result = search_depth(&mut searcher(), &b, 1);
        assert!(result.best_move.is_none());
        assert!(result.score < -MATE_THRESHOLD);
        assert_eq!(result.termination, Termination::NoLegalMoves);
    }

    #[test]
    fn info_is_reported_for_every_depth() {
        let b = Board::default();
        let mut depths = Vec::new();
        let mut last_nodes = 0;
        searcher().search(&b, &[], 3, &unlimited(), |info| {
            assert!(!info.pv.is_empty());
            assert!(info.nodes >= last_nodes);
            last_nodes = info.nodes;
            depths.push(info.depth);
        });
        assert_eq!(depths, vec![1, 2, 3]);
    }

    #[test]
    fn pv_starts_with_best_move() {
        let b = Board::default();
        let result = search_depth(&mut searcher(), &b, 4);
        assert!(result.pv.len() >= 2, "pv {:?}", result.pv);
        assert_eq!(Some(result.pv[0]), result.best_move);
    }

    #[test]
    fn warm_table_still_yields_a_pv() {
        let b = Board::default();
        let mut s = searcher();
        search_depth(&mut s, &b, 3);
        s.search(&b, &[], 3, &unlimited(), |info| {
            assert!(!info.pv.is_empty(), "warm TT lost the root PV at depth {}", info.depth);
        });
    }

    #[test]
    fn stop_after_first_depth_keeps_that_result() {
        let b = Board::default();
        let stopped = Arc::new(AtomicBool::new(false));
        let control = SearchControl::new_infinite(Arc::clone(&stopped));
        let result = searcher().search(&b, &[], 20, &control, |_| {
            stopped.store(true, Ordering::Relaxed);
        });
        assert_eq!(result.depth, 1);
        assert_eq!(result.termination, Termination::Stopped);
        assert!(result.best_move.is_some());
    }

    #[test]
    fn stop_before_any_depth_still_returns_legal_move() {
        let b = Board::default();
        let stopped = Arc::new(AtomicBool::new(true));
        let control = SearchControl::new_infinite(stopped);
        let result = searcher().search(&b, &[], 20, &control, |_| {});
        assert_eq!(result.depth, 0);
        assert_eq!(result.termination, Termination::Stopped);
        assert!(b.is_legal(result.best_move.expect("fallback move")));
    }

    #[test]
    fn node_limit_interrupts_with_a_legal_move() {
        let b = Board::default();
        let control = unlimited().with_node_limit(Some(500));
        let result = searcher().search(&b, &[], 20, &control, |_| {});
        assert_eq!(result.termination, Termination::NodeLimit);
        assert!(b.is_legal(result.best_move.expect("fallback move")));
        assert!(result.nodes <= 500);
    }

    #[test]
    fn repetition_scores_as_draw() {
        // 1.Nf3 Nf6 2.Ng1 Ng8 returns to the start; black's king is bare
        // enough that white would otherwise be far ahead.
        let start = board("4k3/8/8/8/8/8/8/4K1NQ w - - 0 1");
        let mut history = vec![start.hash()];
        let mut b = start.clone();
        for uci in ["g1f3", "e8d8", "f3g1"] {
            let mv: Move = uci.parse().unwrap();
            b.play(mv);
            history.push(b.hash());
        }
        history.pop();
        // Black to move; ...Kd8-e8 repeats the start position.
        let mut s = searcher();
        let result = s.search(&b, &history, 1, &unlimited(), |_| {});
        assert_eq!(result.best_move.map(|m| m.to_string()).as_deref(), Some("d8e8"));
        assert_eq!(result.score, 0);
    }

    #[test]
    fn mate_in_moves_signs() {
        assert_eq!(mate_in_moves(MATE_SCORE - 1), Some(1));
        assert_eq!(mate_in_moves(MATE_SCORE - 3), Some(2));
        assert_eq!(mate_in_moves(-(MATE_SCORE - 2)), Some(-1));
        assert_eq!(mate_in_moves(-(MATE_SCORE - 4)), Some(-2));
        assert_eq!(mate_in_moves(35), None);
    }
}
