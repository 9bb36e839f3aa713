//! Negamax alpha-beta search with PVS, null-move pruning and quiescence.

use cozy_chess::{Board, Move};

use crate::eval::Evaluator;
use crate::eval::material::PIECE_VALUES;
use crate::rules;
use crate::search::control::SearchControl;
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::ordering::{MovePicker, OrderingContext};
use crate::search::params::SearchParams;
use crate::search::tt::{Bound, TranspositionTable};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 30_000;

/// Base score for checkmate (adjusted by ply for mate distance).
pub const MATE_SCORE: i32 = 29_000;

/// Scores above this threshold indicate a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Score of a drawn position.
pub const DRAW_SCORE: i32 = 0;

/// Maximum search depth (in plies) for array sizing and recursion limits.
pub const MAX_PLY: usize = 128;

/// Score for the side to move when it has been checkmated at `ply`.
#[inline]
pub fn mated_in(ply: usize) -> i32 {
    -(MATE_SCORE - ply as i32)
}

/// Negamax alpha-beta search.
///
/// Returns the score for the side to move. The principal variation is
/// collected into `ctx.pv`. When the control aborts, the returned value is
/// meaningless and nothing is written to the transposition table.
pub(super) fn negamax(
    board: &Board,
    depth: u8,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    allow_null: bool,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.pv.clear_ply(ply);
    ctx.nodes += 1;

    if ctx.control.should_stop(ctx.nodes) {
        return 0;
    }

    let is_root = ply == 0;
    let hash = board.hash();

    if !is_root {
        if board.halfmove_clock() >= 100
            || rules::is_insufficient_material(board)
            || ctx.is_repetition(board)
        {
            return DRAW_SCORE;
        }
        if ply >= MAX_PLY - 1 {
            return ctx.evaluator.evaluate(board);
        }
    }

    let mut tt_move = None;
    if let Some(entry) = ctx.tt.probe(hash, ply) {
        tt_move = entry.best_move;
        if !is_root && entry.cuts_off(depth, alpha, beta) {
            return entry.score;
        }
    }

    if depth == 0 {
        return quiescence(board, ply, alpha, beta, ctx);
    }

    let moves = rules::legal_moves(board);
    let in_check = rules::in_check(board);
    if moves.is_empty() {
        return if in_check { mated_in(ply) } else { DRAW_SCORE };
    }

    // Null move: hand the opponent a free tempo; if we still beat beta the
    // node is almost certainly a cut node.
    if allow_null
        && !is_root
        && !in_check
        && depth >= ctx.params.null_move_min_depth
        && beta.abs() < MATE_THRESHOLD
        && rules::has_non_pawn_material(board, board.side_to_move())
        && ctx.evaluator.evaluate(board) >= beta
        && let Some(passed) = board.null_move()
    {
        let reduced = depth.saturating_sub(1 + ctx.params.null_move_reduction);
        ctx.positions.push(hash);
        let score = -negamax(&passed, reduced, ply + 1, -beta, -beta + 1, false, ctx);
        ctx.positions.pop();

        if ctx.control.aborted() {
            return 0;
        }
        if score >= beta {
            return beta;
        }
    }

    let original_alpha = alpha;
    let mut best_score = -INF;
    let mut best_move = None;
    let mut picker = {
        let ordering = OrderingContext {
            killers: &ctx.killers,
            history: &ctx.history,
            exchange: ctx.params.exchange.as_ref(),
        };
        MovePicker::new(board, moves, tt_move, ply, &ordering)
    };

    ctx.positions.push(hash);
    let mut searched = 0usize;
    while let Some(mv) = picker.pick_next() {
        if is_root && ctx.root_first.is_none() {
            ctx.root_first = Some(mv);
        }

        let child = rules::play(board, mv);
        let score = if searched == 0 {
            -negamax(&child, depth - 1, ply + 1, -beta, -alpha, true, ctx)
        } else {
            let probe = -negamax(&child, depth - 1, ply + 1, -alpha - 1, -alpha, true, ctx);
            if probe > alpha && probe < beta && !ctx.control.aborted() {
                -negamax(&child, depth - 1, ply + 1, -beta, -alpha, true, ctx)
            } else {
                probe
            }
        };
        searched += 1;

        if ctx.control.aborted() {
            ctx.positions.pop();
            return 0;
        }

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
            if is_root {
                ctx.root_best = Some(mv);
            }
            if score > alpha {
                alpha = score;
                ctx.pv.update(ply, mv);
            }
        }

        if alpha >= beta {
            if rules::is_quiet(board, mv) {
                ctx.killers.store(ply, mv);
                if let Some(piece) = board.piece_on(mv.from) {
                    ctx.history.reward(piece, mv.to, depth);
                }
            }
            break;
        }
    }
    ctx.positions.pop();

    let bound = if best_score <= original_alpha {
        Bound::UpperBound
    } else if best_score >= beta {
        Bound::LowerBound
    } else {
        Bound::Exact
    };

    // A fail-low node has no trustworthy best move; keep the old hint.
    let store_move = if bound == Bound::UpperBound {
        tt_move
    } else {
        best_move
    };
    ctx.tt.store(hash, depth, best_score, store_move, bound, ply);

    best_score
}

/// Quiescence search: resolve captures before trusting the static evaluation.
///
/// Fail-hard: a stand-pat at or above `beta` returns `beta` at once.
pub(super) fn quiescence(
    board: &Board,
    ply: usize,
    mut alpha: i32,
    beta: i32,
    ctx: &mut SearchContext<'_>,
) -> i32 {
    ctx.nodes += 1;

    if ctx.control.should_stop(ctx.nodes) {
        return 0;
    }

    if rules::is_insufficient_material(board) {
        return DRAW_SCORE;
    }

    let moves = rules::legal_moves(board);
    if moves.is_empty() {
        return if rules::in_check(board) {
            mated_in(ply)
        } else {
            DRAW_SCORE
        };
    }

    let stand_pat = ctx.evaluator.evaluate(board);
    if ply >= MAX_PLY - 1 {
        return stand_pat;
    }
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let mut picker = MovePicker::new_qsearch(board, moves, ctx.params.exchange.as_ref());

    while let Some(mv) = picker.pick_next() {
        if let Some(margin) = ctx.params.delta_margin {
            let victim = rules::captured_piece(board, mv).map_or(0, |p| PIECE_VALUES[p as usize]);
            let promotion = mv
                .promotion
                .map_or(0, |p| PIECE_VALUES[p as usize] - PIECE_VALUES[0]);
            if stand_pat + victim + promotion + margin <= alpha {
                continue;
            }
        }

        let child = rules::play(board, mv);
        let score = -quiescence(&child, ply + 1, -beta, -alpha, ctx);

        if ctx.control.aborted() {
            return 0;
        }
        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

/// Triangular PV table for collecting principal variation lines.
pub struct PvTable {
    moves: [[Option<Move>; MAX_PLY]; MAX_PLY],
    len: [usize; MAX_PLY],
}

impl PvTable {
    /// Create an empty PV table.
    pub fn new() -> Self {
        Self {
            moves: [[None; MAX_PLY]; MAX_PLY],
            len: [0; MAX_PLY],
        }
    }

    /// Clear the PV line at `ply` (called at the top of each node).
    pub fn clear_ply(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.len[ply] = 0;
        }
    }

    /// Make `mv` followed by the line at `ply + 1` the line at `ply`.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }

        self.moves[ply][0] = Some(mv);

        let child_ply = ply + 1;
        if child_ply < MAX_PLY {
            let copy_len = self.len[child_ply].min(MAX_PLY - 1);
            let (top, bottom) = self.moves.split_at_mut(child_ply);
            top[ply][1..1 + copy_len].copy_from_slice(&bottom[0][..copy_len]);
            self.len[ply] = 1 + copy_len;
        } else {
            self.len[ply] = 1;
        }
    }

    /// The principal variation from the root.
    pub fn root_pv(&self) -> Vec<Move> {
        self.moves[0][..self.len[0]].iter().flatten().copied().collect()
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Search state threaded through negamax calls.
pub(super) struct SearchContext<'a> {
    /// Total nodes visited.
    pub nodes: u64,
    /// Transposition table, owned by the searcher.
    pub tt: &'a mut TranspositionTable,
    /// Active evaluation strategy.
    pub evaluator: &'a dyn Evaluator,
    /// Pruning and ordering parameters.
    pub params: &'a SearchParams,
    /// Search control (stop flag, time and node limits).
    pub control: &'a SearchControl,
    /// Principal variation table.
    pub pv: PvTable,
    /// Killer moves for this search.
    pub killers: KillerTable,
    /// History scores for this search.
    pub history: HistoryTable,
    /// Hashes of every earlier position: game history, then the current path.
    pub positions: Vec<u64>,
    /// Best root move so far in the current iteration.
    pub root_best: Option<Move>,
    /// First root move the current iteration started searching.
    pub root_first: Option<Move>,
}

impl SearchContext<'_> {
    /// Whether `board` repeats a position reachable without an irreversible move.
    pub fn is_repetition(&self, board: &Board) -> bool {
        let hash = board.hash();
        self.positions
            .iter()
            .rev()
            .take(usize::from(board.halfmove_clock()))
            .any(|&h| h == hash)
    }
}
