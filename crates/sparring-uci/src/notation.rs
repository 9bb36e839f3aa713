//! Move notation at the protocol boundary.
//!
//! The rules crate encodes castling as the king capturing its own rook
//! (`e1h1`); the protocol uses the king's two-square step (`e1g1`). Moves are
//! converted in both directions here and nowhere else.

use cozy_chess::{Board, File, Move, Piece, Square};

/// Read a protocol move string and resolve it against `board`.
///
/// Returns `None` if the string does not parse or the move is illegal.
pub fn parse_move(board: &Board, text: &str) -> Option<Move> {
    let mut mv: Move = text.parse().ok()?;

    if board.piece_on(mv.from) == Some(Piece::King) {
        let from_file = mv.from.file() as i32;
        let to_file = mv.to.file() as i32;
        if mv.from.rank() == mv.to.rank() && (to_file - from_file).abs() == 2 {
            let rook_file = if to_file > from_file { File::H } else { File::A };
            mv.to = Square::new(rook_file, mv.from.rank());
        }
    }

    board.is_legal(mv).then_some(mv)
}

/// Write `mv`, played from `board`, in protocol notation.
pub fn format_move(board: &Board, mv: Move) -> String {
    let castles = board.piece_on(mv.from) == Some(Piece::King)
        && board.color_on(mv.to) == Some(board.side_to_move());
    if !castles {
        return mv.to_string();
    }

    let file = if mv.to.file() as usize > mv.from.file() as usize {
        File::G
    } else {
        File::C
    };
    Move {
        from: mv.from,
        to: Square::new(file, mv.from.rank()),
        promotion: None,
    }
    .to_string()
}

/// Write a principal variation, replaying it from `board`.
///
/// Stops early at the first move that is not legal in the replayed position.
pub fn format_line(board: &Board, line: &[Move]) -> String {
    let mut position = board.clone();
    let mut words = Vec::with_capacity(line.len());
    for &mv in line {
        if !position.is_legal(mv) {
            break;
        }
        words.push(format_move(&position, mv));
        position.play_unchecked(mv);
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CASTLING: &str = "r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1";

    fn board(fen: &str) -> Board {
        Board::from_fen(fen, false).unwrap()
    }

    #[test]
    fn king_step_becomes_king_takes_rook() {
        let b = board(CASTLING);
        assert_eq!(parse_move(&b, "e1g1").unwrap().to_string(), "e1h1");
        assert_eq!(parse_move(&b, "e1c1").unwrap().to_string(), "e1a1");
    }

    #[test]
    fn king_takes_rook_is_still_accepted() {
        let b = board(CASTLING);
        assert_eq!(parse_move(&b, "e1h1").unwrap().to_string(), "e1h1");
    }

    #[test]
    fn castling_prints_as_king_step() {
        let b = board(CASTLING);
        let short = parse_move(&b, "e1g1").unwrap();
        let long = parse_move(&b, "e1c1").unwrap();
        assert_eq!(format_move(&b, short), "e1g1");
        assert_eq!(format_move(&b, long), "e1c1");

        let black = board("r3k2r/8/8/8/8/8/8/R3K2R b KQkq - 0 1");
        let mv = parse_move(&black, "e8g8").unwrap();
        assert_eq!(format_move(&black, mv), "e8g8");
    }

    #[test]
    fn ordinary_moves_pass_through() {
        let b = Board::default();
        let mv = parse_move(&b, "e2e4").unwrap();
        assert_eq!(format_move(&b, mv), "e2e4");

        let promo = board("8/4P3/8/8/8/8/k7/4K3 w - - 0 1");
        let mv = parse_move(&promo, "e7e8q").unwrap();
        assert_eq!(format_move(&promo, mv), "e7e8q");
    }

    #[test]
    fn one_square_king_move_is_not_castling() {
        let b = board(CASTLING);
        assert_eq!(parse_move(&b, "e1f1").unwrap().to_string(), "e1f1");
    }

    #[test]
    fn illegal_or_garbage_is_rejected() {
        let b = Board::default();
        assert!(parse_move(&b, "e2e5").is_none());
        assert!(parse_move(&b, "zz").is_none());
        assert!(parse_move(&b, "e1g1").is_none());
    }

    #[test]
    fn line_is_replayed_for_castling() {
        let b = board(CASTLING);
        let line = [
            parse_move(&b, "e1g1").unwrap(),
            "e8h8".parse().unwrap(),
            "f1f2".parse().unwrap(),
        ];
        assert_eq!(format_line(&b, &line), "e1g1 e8g8 f1f2");
    }

    #[test]
    fn line_stops_at_an_illegal_move() {
        let b = Board::default();
        let line = ["e2e4".parse().unwrap(), "e2e4".parse().unwrap()];
        assert_eq!(format_line(&b, &line), "e2e4");
    }
}
