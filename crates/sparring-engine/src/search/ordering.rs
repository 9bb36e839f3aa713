//! Move ordering: TT move, mates, checks, MVV-LVA captures, promotions,
//! killers and history.
//!
//! Every move gets a score in a fixed band; [`MovePicker`] then yields them by
//! selection sort. Equal scores come out in generator order.

use cozy_chess::{Board, Move, Piece};

use crate::eval::ExchangePolicy;
use crate::eval::material::PIECE_VALUES;
use crate::rules;
use crate::search::heuristics::{HistoryTable, KillerTable};
use crate::search::see::see;

const TT_MOVE_SCORE: i32 = 90_000_000;
const MATE_SCORE: i32 = 80_000_000;
const CHECK_SCORE: i32 = 70_000_000;
const CAPTURE_BASE: i32 = 60_000_000;
const PROMOTION_BASE: i32 = 50_000_000;
const KILLER_BASE: i32 = 40_000_000;
const LOSING_CAPTURE_BASE: i32 = -10_000_000;

/// Spacing between MVV-LVA steps, leaving room for an SEE tiebreak below it.
const MVV_LVA_STEP: i32 = 4096;
const SEE_TIEBREAK_MAX: i32 = MVV_LVA_STEP / 2 - 1;

/// What a move does to the opponent's king.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CheckKind {
    None,
    Check,
    Mate,
}

fn check_kind(board: &Board, mv: Move) -> CheckKind {
    let child = rules::play(board, mv);
    if !rules::in_check(&child) {
        CheckKind::None
    } else if rules::has_legal_move(&child) {
        CheckKind::Check
    } else {
        CheckKind::Mate
    }
}

/// Score a capture by victim minus attacker.
///
/// The king counts as a zero-value attacker, so king captures rank by victim alone.
///
/// With an exchange policy the SEE result breaks ties, and captures losing
/// more than the policy allows drop below every quiet move.
fn capture_score(board: &Board, mv: Move, victim: Piece, exchange: Option<&ExchangePolicy>) -> i32 {
    let attacker = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
    let mvv_lva = (PIECE_VALUES[victim as usize] - PIECE_VALUES[attacker as usize]) * MVV_LVA_STEP;

    let Some(policy) = exchange else {
        return CAPTURE_BASE + mvv_lva;
    };

    let exchange = see(board, mv, &policy.values);
    let tiebreak = exchange.clamp(-SEE_TIEBREAK_MAX, SEE_TIEBREAK_MAX);
    if policy.accepts(exchange) {
        CAPTURE_BASE + mvv_lva + tiebreak
    } else {
        LOSING_CAPTURE_BASE + tiebreak
    }
}

/// Heuristic state consulted when ordering a main-search node.
pub struct OrderingContext<'a> {
    /// Killer moves recorded so far in this search.
    pub killers: &'a KillerTable,
    /// History scores recorded so far in this search.
    pub history: &'a HistoryTable,
    /// Exchange policy of the active evaluator, if it wants SEE-aware ordering.
    pub exchange: Option<&'a ExchangePolicy>,
}

/// Score one move for the main search.
fn score_move(
    board: &Board,
    mv: Move,
    tt_move: Option<Move>,
    ply: usize,
    ctx: &OrderingContext<'_>,
) -> i32 {
    if tt_move == Some(mv) {
        return TT_MOVE_SCORE;
    }

    match check_kind(board, mv) {
        CheckKind::Mate => return MATE_SCORE,
        CheckKind::Check => return CHECK_SCORE,
        CheckKind::None => {}
    }

    if let Some(victim) = rules::captured_piece(board, mv) {
        return capture_score(board, mv, victim, ctx.exchange);
    }

    if let Some(promotion) = mv.promotion {
        return PROMOTION_BASE + PIECE_VALUES[promotion as usize];
    }

    match ctx.killers.slot_of(ply, mv) {
        Some(0) => KILLER_BASE + 1,
        Some(_) => KILLER_BASE,
        None => {
            let piece = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
            ctx.history.score(piece, mv.to)
        }
    }
}

/// Incremental move picker using selection sort.
pub struct MovePicker {
    moves: Vec<Move>,
    scores: Vec<i32>,
    cursor: usize,
}

impl MovePicker {
    /// Order every legal move of a main-search node.
    pub fn new(
        board: &Board,
        moves: Vec<Move>,
        tt_move: Option<Move>,
        ply: usize,
        ctx: &OrderingContext<'_>,
    ) -> Self {
        let scores = moves
            .iter()
            .map(|&mv| score_move(board, mv, tt_move, ply, ctx))
            .collect();
        Self {
            moves,
            scores,
            cursor: 0,
        }
    }

    /// Keep only the captures, ordered for quiescence search.
    pub fn new_qsearch(board: &Board, moves: Vec<Move>, exchange: Option<&ExchangePolicy>) -> Self {
        let (moves, scores) = moves
            .into_iter()
            .filter_map(|mv| {
                rules::captured_piece(board, mv)
                    .map(|victim| (mv, capture_score(board, mv, victim, exchange)))
            })
            .unzip();
        Self {
            moves,
            scores,
            cursor: 0,
        }
    }

    /// Moves not yet yielded.
    pub fn remaining(&self) -> usize {
        self.moves.len() - self.cursor
    }

    /// Yield the next highest-scored move.
    ///
    /// The chosen move is rotated into place rather than swapped so the moves
    /// it jumps over keep their relative order.
    pub fn pick_next(&mut self) -> Option<Move> {
        if self.cursor >= self.moves.len() {
            return None;
        }

        let mut best_idx = self.cursor;
        for i in (self.cursor + 1)..self.moves.len() {
            if self.scores[i] > self.scores[best_idx] {
                best_idx = i;
            }
        }

        self.moves[self.cursor..=best_idx].rotate_right(1);
        self.scores[self.cursor..=best_idx].rotate_right(1);

        let mv = self.moves[self.cursor];
        self.cursor += 1;
        Some(mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINTS_POLICY: ExchangePolicy = ExchangePolicy {
        values: [1, 3, 3, 5, 9, 100],
        max_loss: 1,
    };

    fn board(fen: &str) -> Board {
        Board::from_fen(fen, false).unwrap()
    }

    fn find(board: &Board, uci: &str) -> Move {
        rules::legal_moves(board)
            .into_iter()
            .find(|m| m.to_string() == uci)
            .unwrap_or_else(|| panic!("{uci} not legal"))
    }

    fn ordered(board: &Board, tt_move: Option<Move>, ctx: &OrderingContext<'_>) -> Vec<String> {
        let mut picker = MovePicker::new(board, rules::legal_moves(board), tt_move, 0, ctx);
        std::iter::from_fn(|| picker.pick_next())
            .map(|m| m.to_string())
            .collect()
    }

    fn empty_ctx<'a>(killers: &'a KillerTable, history: &'a HistoryTable) -> OrderingContext<'a> {
        OrderingContext {
            killers,
            history,
            exchange: None,
        }
    }

    #[test]
    fn picker_yields_every_move_once() {
        let b = Board::default();
        let (k, h) = (KillerTable::new(), HistoryTable::new());
        let mut order = ordered(&b, None, &empty_ctx(&k, &h));
        assert_eq!(order.len(), 20);
        order.sort();
        order.dedup();
        assert_eq!(order.len(), 20);
    }

    #[test]
    fn untouched_quiet_moves_keep_generator_order() {
        let b = Board::default();
        let (k, h) = (KillerTable::new(), HistoryTable::new());
        let generated: Vec<String> = rules::legal_moves(&b).iter().map(|m| m.to_string()).collect();
        assert_eq!(ordered(&b, None, &empty_ctx(&k, &h)), generated);
    }

    #[test]
    fn tt_move_comes_first() {
        let b = Board::default();
        let (k, h) = (KillerTable::new(), HistoryTable::new());
        let tt = find(&b, "b1c3");
        assert_eq!(ordered(&b, Some(tt), &empty_ctx(&k, &h))[0], "b1c3");
    }

    #[test]
    fn mate_before_check_before_capture() {
        // Ra8 mates, Nf6+ checks, Rxh2 and Nxh2 capture.
        let b = board("6k1/5ppp/8/8/6N1/8/R6n/6K1 w - - 0 1");
        let (k, h) = (KillerTable::new(), HistoryTable::new());
        let order = ordered(&b, None, &empty_ctx(&k, &h));
        assert_eq!(order[0], "a2a8", "mate is searched first, got {order:?}");
        let check = order.iter().position(|m| m == "g4f6").unwrap();
        let capture = order.iter().position(|m| m == "a2h2").unwrap();
        assert!(check < capture);
    }

    #[test]
    fn pawn_takes_queen_before_queen_takes_pawn() {
        let b = board("4k3/8/8/3q4/4P3/1p6/Q7/4K3 w - - 0 1");
        let (k, h) = (KillerTable::new(), HistoryTable::new());
        let order = ordered(&b, None, &empty_ctx(&k, &h));
        let pxq = order.iter().position(|m| m == "e4d5").unwrap();
        let qxp = order.iter().position(|m| m == "a2b3").unwrap();
        assert!(pxq < qxp);
    }

    #[test]
    fn promotions_rank_by_piece_after_captures() {
        let b = board("k7/4P3/8/8/8/8/8/4K3 w - - 0 1");
        let (k, h) = (KillerTable::new(), HistoryTable::new());
        let order = ordered(&b, None, &empty_ctx(&k, &h));
        // e8=Q and e8=R give check, so they lead; then bishop before knight.
        let bishop = order.iter().position(|m| m == "e7e8b").unwrap();
        let knight = order.iter().position(|m| m == "e7e8n").unwrap();
        assert!(bishop < knight);
        let quiet = order.iter().position(|m| m == "e1d1").unwrap();
        assert!(knight < quiet);
    }

    #[test]
    fn killers_newest_first_then_history() {
        let b = Board::default();
        let mut k = KillerTable::new();
        let mut h = HistoryTable::new();
        k.store(0, find(&b, "a2a3"));
        k.store(0, find(&b, "h2h3"));
        h.reward(Piece::Knight, cozy_chess::Square::F3, 5);

        let order = ordered(&b, None, &empty_ctx(&k, &h));
        assert_eq!(&order[..3], ["h2h3", "a2a3", "g1f3"]);
    }

    #[test]
    fn losing_capture_is_demoted_with_exchange_policy() {
        // Qxc5 loses the queen to the d6 pawn; it still appears, after quiet moves.
        let b = board("4k3/8/3p4/2p5/8/4Q3/8/4K3 w - - 0 1");
        let (k, h) = (KillerTable::new(), HistoryTable::new());
        let ctx = OrderingContext {
            killers: &k,
            history: &h,
            exchange: Some(&POINTS_POLICY),
        };
        let order = ordered(&b, None, &ctx);
        assert_eq!(order.last().map(String::as_str), Some("e3c5"));

        let plain = ordered(&b, None, &empty_ctx(&k, &h));
        let plain_idx = plain.iter().position(|m| m == "e3c5").unwrap();
        assert!(plain_idx < plain.len() - 1, "without SEE the capture is not demoted");
    }

    #[test]
    fn qsearch_picker_yields_captures_only() {
        let b = board("4k3/8/8/3q4/4P3/1p6/Q7/4K3 w - - 0 1");
        let mut picker = MovePicker::new_qsearch(&b, rules::legal_moves(&b), None);
        assert_eq!(picker.remaining(), 2);
        assert_eq!(picker.pick_next().map(|m| m.to_string()).as_deref(), Some("e4d5"));
        assert_eq!(picker.pick_next().map(|m| m.to_string()).as_deref(), Some("a2b3"));
        assert!(picker.pick_next().is_none());
    }

    #[test]
    fn qsearch_picker_empty_on_starting_position() {
        let b = Board::default();
        let mut picker = MovePicker::new_qsearch(&b, rules::legal_moves(&b), None);
        assert!(picker.pick_next().is_none());
    }
}
