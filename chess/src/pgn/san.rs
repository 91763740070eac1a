use cozy_chess::{Board, File, GameStatus, Move, Piece, Rank, Square};
use lazy_static::lazy_static;
use regex::Regex;

use crate::types::PieceKind;
use crate::uci::{format_square, is_castling, parse_square};

lazy_static! {
    static ref SAN_RE: Regex =
        Regex::new(r"^([NBRQK])?([a-h])?([1-8])?(x)?([a-h][1-8])(?:=?([NBRQ]))?$").unwrap();
    static ref CASTLE_RE: Regex = Regex::new(r"^([O0])-([O0])(-[O0])?$").unwrap();
}

/// Parse Standard Algebraic Notation (SAN) against `board`.
///
/// Check/mate suffixes and annotation glyphs are ignored. A token that fits the
/// grammar but names no legal move is `NoLegalMove`; one that names several is
/// `AmbiguousMove`.
pub fn parse_san(board: &Board, san: &str) -> Result<Move, SanError> {
    let token = san.trim().trim_end_matches(['+', '#', '!', '?']);
    if token.is_empty() {
        return Err(SanError::InvalidFormat(san.to_string()));
    }

    let legal = legal_moves(board);

    if let Some(caps) = CASTLE_RE.captures(token) {
        let long = caps.get(3).is_some();
        return parse_castle(board, &legal, long).ok_or_else(|| SanError::NoLegalMove(san.to_string()));
    }

    let caps = SAN_RE
        .captures(token)
        .ok_or_else(|| SanError::InvalidFormat(san.to_string()))?;

    let piece = caps
        .get(1)
        .and_then(|m| m.as_str().chars().next())
        .and_then(PieceKind::from_char)
        .map(Piece::from)
        .unwrap_or(Piece::Pawn);
    let from_file = caps.get(2).map(|m| m.as_str().as_bytes()[0] - b'a');
    let from_rank = caps.get(3).map(|m| m.as_str().as_bytes()[0] - b'1');
    let to = caps
        .get(5)
        .and_then(|m| parse_square(m.as_str()))
        .ok_or_else(|| SanError::InvalidSquare(san.to_string()))?;
    let promotion = caps
        .get(6)
        .and_then(|m| m.as_str().chars().next())
        .and_then(PieceKind::from_char)
        .map(Piece::from);

    if promotion.is_some() && piece != Piece::Pawn {
        return Err(SanError::InvalidPromotion(san.to_string()));
    }

    let candidates: Vec<Move> = legal
        .iter()
        .copied()
        .filter(|mv| mv.to == to && !is_castling(board, *mv))
        .filter(|mv| board.piece_on(mv.from) == Some(piece))
        .filter(|mv| from_file.map_or(true, |f| mv.from.file() as u8 == f))
        .filter(|mv| from_rank.map_or(true, |r| mv.from.rank() as u8 == r))
        .filter(|mv| mv.promotion == promotion)
        .collect();

    match candidates.as_slice() {
        [] => Err(SanError::NoLegalMove(san.to_string())),
        [mv] => Ok(*mv),
        _ => Err(SanError::AmbiguousMove(san.to_string())),
    }
}

fn parse_castle(board: &Board, legal: &[Move], long: bool) -> Option<Move> {
    let color = board.side_to_move();
    let rights = board.castle_rights(color);
    let rook_file = if long { rights.long } else { rights.short }?;
    let back_rank = Rank::First.relative_to(color);
    let king = board.king(color);
    let mv = Move {
        from: king,
        to: Square::new(rook_file, back_rank),
        promotion: None,
    };
    legal.contains(&mv).then_some(mv)
}

/// Format a legal move as SAN, including the `+`/`#` suffix.
pub fn format_san(board: &Board, mv: Move) -> String {
    let mut san = format_san_body(board, mv);

    let mut after = board.clone();
    if after.try_play(mv).is_ok() && !after.checkers().is_empty() {
        let mate = after.status() == GameStatus::Won;
        san.push(if mate { '#' } else { '+' });
    }
    san
}

/// SAN without the check suffix.
fn format_san_body(board: &Board, mv: Move) -> String {
    if is_castling(board, mv) {
        return if mv.to.file() as u8 > mv.from.file() as u8 {
            "O-O".to_string()
        } else {
            "O-O-O".to_string()
        };
    }

    let Some(piece) = board.piece_on(mv.from) else {
        return crate::uci::format_coordinate(board, mv);
    };
    let is_capture = is_capture(board, mv, piece);
    let mut san = String::new();

    match PieceKind::from(piece).san_letter() {
        Some(letter) => {
            san.push(letter);
            san.push_str(&disambiguation(board, mv, piece));
        }
        None => {
            if is_capture {
                san.push(file_char(mv.from.file()));
            }
        }
    }

    if is_capture {
        san.push('x');
    }
    san.push_str(&format_square(mv.to));

    if let Some(promo) = mv.promotion {
        san.push('=');
        if let Some(letter) = PieceKind::from(promo).san_letter() {
            san.push(letter);
        }
    }

    san
}

/// A move captures if the target holds an enemy piece, or a pawn changes file (en passant).
pub(crate) fn is_capture(board: &Board, mv: Move, piece: Piece) -> bool {
    let enemy = !board.side_to_move();
    board.color_on(mv.to) == Some(enemy) || (piece == Piece::Pawn && mv.from.file() != mv.to.file())
}

fn disambiguation(board: &Board, mv: Move, piece: Piece) -> String {
    let rivals: Vec<Square> = legal_moves(board)
        .into_iter()
        .filter(|other| {
            other.to == mv.to
                && other.from != mv.from
                && board.piece_on(other.from) == Some(piece)
                && !is_castling(board, *other)
        })
        .map(|other| other.from)
        .collect();

    if rivals.is_empty() {
        return String::new();
    }
    let shares_file = rivals.iter().any(|sq| sq.file() == mv.from.file());
    let shares_rank = rivals.iter().any(|sq| sq.rank() == mv.from.rank());

    if !shares_file {
        file_char(mv.from.file()).to_string()
    } else if !shares_rank {
        ((b'1' + mv.from.rank() as u8) as char).to_string()
    } else {
        format_square(mv.from)
    }
}

fn file_char(file: File) -> char {
    (b'a' + file as u8) as char
}

fn legal_moves(board: &Board) -> Vec<Move> {
    let mut moves = Vec::new();
    board.generate_moves(|mvs| {
        moves.extend(mvs);
        false
    });
    moves
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SanError {
    #[error("No legal move found for: {0}")]
    NoLegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
    #[error("Invalid square: {0}")]
    InvalidSquare(String),
    #[error("Invalid promotion: {0}")]
    InvalidPromotion(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uci::format_coordinate;

    fn board(fen: &str) -> Board {
        fen.parse().unwrap()
    }

    #[test]
    fn test_parse_simple_moves() {
        let b = Board::default();
        assert_eq!(format_coordinate(&b, parse_san(&b, "e4").unwrap()), "e2e4");
        assert_eq!(format_coordinate(&b, parse_san(&b, "Nf3").unwrap()), "g1f3");
        assert_eq!(format_coordinate(&b, parse_san(&b, "Nc3+").unwrap()), "b1c3");
    }

    #[test]
    fn test_parse_reports_ambiguity() {
        // Knights on b1 and f3 can both reach d2.
        let b = board("4k3/8/8/8/8/5N2/8/1N2K3 w - - 0 1");
        assert!(matches!(parse_san(&b, "Nd2"), Err(SanError::AmbiguousMove(_))));
        assert_eq!(format_coordinate(&b, parse_san(&b, "Nbd2").unwrap()), "b1d2");
        assert_eq!(format_coordinate(&b, parse_san(&b, "Nfd2").unwrap()), "f3d2");
    }

    #[test]
    fn test_parse_illegal_vs_garbage() {
        let b = Board::default();
        assert!(matches!(parse_san(&b, "Nf6"), Err(SanError::NoLegalMove(_))));
        assert!(matches!(parse_san(&b, "hello"), Err(SanError::InvalidFormat(_))));
        assert!(matches!(parse_san(&b, "Ke2=Q"), Err(SanError::InvalidPromotion(_))));
    }

    #[test]
    fn test_castling_both_ways() {
        let b = board("r3k2r/8/8/8/8/8/8/R3K2R w KQkq - 0 1");
        let short = parse_san(&b, "O-O").unwrap();
        assert_eq!(format_coordinate(&b, short), "e1g1");
        assert_eq!(format_san(&b, short), "O-O");
        let long = parse_san(&b, "0-0-0").unwrap();
        assert_eq!(format_san(&b, long), "O-O-O");
    }

    #[test]
    fn test_format_capture_promotion_and_mate() {
        let b = board("rnbqkbnr/ppp1pppp/8/3p4/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2");
        let mv = parse_san(&b, "exd5").unwrap();
        assert_eq!(format_san(&b, mv), "exd5");

        let b = board("8/P7/8/8/8/8/8/k6K w - - 0 1");
        let mv = parse_san(&b, "a8=Q").unwrap();
        assert_eq!(format_san(&b, mv), "a8=Q+");

        // Fool's mate final move.
        let b = board("rnbqkbnr/pppp1ppp/8/4p3/6P1/5P2/PPPPP2P/RNBQKBNR b KQkq - 0 2");
        let mv = parse_san(&b, "Qh4").unwrap();
        assert_eq!(format_san(&b, mv), "Qh4#");
    }

    #[test]
    fn test_format_disambiguates_by_rank() {
        let b = board("4k3/8/8/R7/8/8/8/R3K3 w - - 0 1");
        let mv = parse_san(&b, "R1a3").unwrap();
        assert_eq!(format_san(&b, mv), "R1a3");
    }
}
