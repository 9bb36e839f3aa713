//! Queries over the external rules component (`cozy-chess`) that the search needs.
//!
//! `cozy-chess` owns board representation, legal move generation and hashing.
//! This module adds the handful of derived predicates it does not provide
//! directly: capture classification and insufficient material.

use cozy_chess::{BitBoard, Board, Color, Move, Piece, Square};

/// Collect every legal move in the position, in generator order.
pub fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::with_capacity(64);
    board.generate_moves(|piece_moves| {
        moves.extend(piece_moves);
        false
    });
    moves
}

/// Whether the side to move has at least one legal move.
pub fn has_legal_move(board: &Board) -> bool {
    board.generate_moves(|_| true)
}

/// Whether the side to move is in check.
#[inline]
pub fn in_check(board: &Board) -> bool {
    !board.checkers().is_empty()
}

/// Whether `mv` is an en passant capture.
///
/// A pawn changing file onto an empty square can only be en passant.
#[inline]
pub fn is_en_passant(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::Pawn)
        && mv.from.file() != mv.to.file()
        && board.piece_on(mv.to).is_none()
}

/// The piece kind removed from the board by `mv`, if any.
///
/// Castling is encoded by the rules crate as the king capturing its own rook,
/// so only enemy-occupied destinations count.
pub fn captured_piece(board: &Board, mv: Move) -> Option<Piece> {
    let enemy = board.colors(!board.side_to_move());
    if enemy.has(mv.to) {
        board.piece_on(mv.to)
    } else if is_en_passant(board, mv) {
        Some(Piece::Pawn)
    } else {
        None
    }
}

/// Whether `mv` captures something.
#[inline]
pub fn is_capture(board: &Board, mv: Move) -> bool {
    captured_piece(board, mv).is_some()
}

/// Whether `mv` is neither a capture nor a promotion.
#[inline]
pub fn is_quiet(board: &Board, mv: Move) -> bool {
    mv.promotion.is_none() && !is_capture(board, mv)
}

/// Square of the pawn removed by an en passant capture.
#[inline]
pub fn en_passant_victim(mv: Move) -> Square {
    Square::new(mv.to.file(), mv.from.rank())
}

/// Apply `mv` to a copy of `board`.
#[inline]
pub fn play(board: &Board, mv: Move) -> Board {
    let mut child = board.clone();
    child.play_unchecked(mv);
    child
}

/// Whether `color` still owns a knight, bishop, rook or queen.
pub fn has_non_pawn_material(board: &Board, color: Color) -> bool {
    let pawns_and_kings = board.pieces(Piece::Pawn) | board.pieces(Piece::King);
    !(board.colors(color) & !pawns_and_kings).is_empty()
}

/// Dead-position detection by material alone.
///
/// Covers K vs K, K+minor vs K, and any number of bishops that all stand on
/// squares of one colour.
pub fn is_insufficient_material(board: &Board) -> bool {
    let heavy = board.pieces(Piece::Pawn) | board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    if !heavy.is_empty() {
        return false;
    }

    let knights = board.pieces(Piece::Knight);
    let bishops = board.pieces(Piece::Bishop);
    let minors = knights.len() + bishops.len();
    if minors <= 1 {
        return true;
    }

    knights.is_empty() && bishops_share_colour(bishops)
}

fn bishops_share_colour(bishops: BitBoard) -> bool {
    let mut parities = bishops
        .into_iter()
        .map(|sq| (sq.file() as usize + sq.rank() as usize) % 2);
    match parities.next() {
        Some(first) => parities.all(|p| p == first),
        None => true,
    }
}
