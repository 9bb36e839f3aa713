//! Static Exchange Evaluation (SEE).
//!
//! Determines the material outcome of a sequence of captures on a single square,
//! assuming both sides recapture with their least valuable attacker. Piece
//! values are supplied by the caller so strategies with their own material
//! scale get an answer in their own units.

use cozy_chess::{
    BitBoard, Board, Color, Move, Piece, Square, get_bishop_moves, get_king_moves,
    get_knight_moves, get_pawn_attacks, get_rook_moves,
};

use crate::rules;

/// Piece values indexed by `Piece as usize` (pawn .. king).
pub type ValueTable = [i32; Piece::NUM];

/// Every piece of either colour attacking `sq` through occupancy `occ`.
fn attackers_of(board: &Board, sq: Square, occ: BitBoard) -> BitBoard {
    let diagonal = board.pieces(Piece::Bishop) | board.pieces(Piece::Queen);
    let orthogonal = board.pieces(Piece::Rook) | board.pieces(Piece::Queen);
    let pawns = board.pieces(Piece::Pawn);

    let white_pawns = get_pawn_attacks(sq, Color::Black) & pawns & board.colors(Color::White);
    let black_pawns = get_pawn_attacks(sq, Color::White) & pawns & board.colors(Color::Black);

    (get_knight_moves(sq) & board.pieces(Piece::Knight))
        | (get_king_moves(sq) & board.pieces(Piece::King))
        | (get_bishop_moves(sq, occ) & diagonal)
        | (get_rook_moves(sq, occ) & orthogonal)
        | white_pawns
        | black_pawns
}

fn least_valuable_attacker(board: &Board, attackers: BitBoard) -> Option<(Square, Piece)> {
    Piece::ALL.into_iter().find_map(|piece| {
        (attackers & board.pieces(piece))
            .next_square()
            .map(|sq| (sq, piece))
    })
}

/// Net material won by the side to move after playing `mv` and letting both
/// sides trade on the destination square for as long as it pays.
///
/// Non-captures score 0 unless they walk into a losing exchange, in which case
/// the result is negative.
pub fn see(board: &Board, mv: Move, values: &ValueTable) -> i32 {
    let target = mv.to;
    let mut occ = board.occupied();

    let mover = board.piece_on(mv.from).unwrap_or(Piece::Pawn);
    let victim_value = rules::captured_piece(board, mv).map_or(0, |p| values[p as usize]);

    occ &= !mv.from.bitboard();
    if rules::is_en_passant(board, mv) {
        occ &= !rules::en_passant_victim(mv).bitboard();
    }

    // The piece standing on the target after the first capture.
    let mut on_target = values[mv.promotion.unwrap_or(mover) as usize];

    let mut gain = [0i32; 32];
    let mut depth = 0usize;
    gain[0] = victim_value;

    let mut side = !board.side_to_move();
    let mut attackers = attackers_of(board, target, occ) & occ;

    loop {
        let Some((sq, piece)) = least_valuable_attacker(board, attackers & board.colors(side))
        else {
            break;
        };

        if depth + 1 == gain.len() {
            break;
        }
        depth += 1;

        gain[depth] = on_target - gain[depth - 1];
        on_target = values[piece as usize];

        occ &= !sq.bitboard();

        // Removing a piece can uncover sliders behind it.
        if matches!(piece, Piece::Pawn | Piece::Bishop | Piece::Queen) {
            attackers |= get_bishop_moves(target, occ)
                & (board.pieces(Piece::Bishop) | board.pieces(Piece::Queen));
        }
        if matches!(piece, Piece::Rook | Piece::Queen) {
            attackers |= get_rook_moves(target, occ)
                & (board.pieces(Piece::Rook) | board.pieces(Piece::Queen));
        }
        attackers &= occ;

        side = !side;
    }

    // Either side may stop trading once continuing would cost it.
    while depth > 0 {
        depth -= 1;
        gain[depth] = -((-gain[depth]).max(gain[depth + 1]));
    }

    gain[0]
}

#[cfg(test)]
mod tests {
    use super::*;

    const CENTIPAWNS: ValueTable = [100, 320, 330, 500, 900, 20_000];
    const POINTS: ValueTable = [1, 3, 3, 5, 9, 100];

    fn find(board: &Board, uci: &str) -> Move {
        rules::legal_moves(board)
            .into_iter()
            .find(|m| m.to_string() == uci)
            .unwrap_or_else(|| panic!("{uci} not legal"))
    }

    fn board(fen: &str) -> Board {
        Board::from_fen(fen, false).unwrap()
    }

    #[test]
    fn pawn_takes_undefended_knight() {
        let b = board("4k3/8/8/3n4/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(see(&b, find(&b, "e4d5"), &CENTIPAWNS), 320);
    }

    #[test]
    fn pawn_takes_defended_knight() {
        // PxN, pxP: 320 - 100.
        let b = board("4k3/8/4p3/3n4/4P3/8/8/4K3 w - - 0 1");
        assert_eq!(see(&b, find(&b, "e4d5"), &CENTIPAWNS), 220);
    }

    #[test]
    fn queen_takes_defended_pawn_loses() {
        let b = board("4k3/8/3p4/2p5/8/4Q3/8/4K3 w - - 0 1");
        assert_eq!(see(&b, find(&b, "e3c5"), &CENTIPAWNS), 100 - 900);
    }

    #[test]
    fn defended_rook_for_queen_in_points() {
        // QxR, pxQ: 5 - 9 on the custom scale.
        let b = board("4k3/8/2p5/3r4/8/8/3Q4/4K3 w - - 0 1");
        assert_eq!(see(&b, find(&b, "d2d5"), &POINTS), -4);
    }

    #[test]
    fn undefended_knight_for_rook_in_points() {
        let b = board("4k3/8/8/3n4/8/8/3R4/3RK3 w - - 0 1");
        assert_eq!(see(&b, find(&b, "d2d5"), &POINTS), 3);
    }

    #[test]
    fn xray_recapture_is_found() {
        // RxP on d5, rook recaptures, the doubled white rook retakes.
        // 1 - 5 + 5 = 1 for white.
        let b = board("3rk3/8/8/3p4/8/8/3R4/3RK3 w - - 0 1");
        assert_eq!(see(&b, find(&b, "d2d5"), &POINTS), 1);
    }

    #[test]
    fn en_passant_wins_a_pawn() {
        let b = board("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 2");
        assert_eq!(see(&b, find(&b, "e5d6"), &POINTS), 1);
    }

    #[test]
    fn quiet_move_into_attack_is_negative() {
        let b = board("4k3/8/4p3/8/8/2N5/8/4K3 w - - 0 1");
        assert_eq!(see(&b, find(&b, "c3d5"), &POINTS), -3);
    }
}
