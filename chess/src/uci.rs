//! Coordinate move notation ("e2e4", "e7e8q").
//!
//! Tokens are emitted in standard form: castling is written as the king's
//! two-square step (`e1g1`). cozy-chess represents castling as king-takes-rook
//! (`e1h1`), so both forms are accepted on input and normalised here.

use cozy_chess::{Board, File, Move, Piece, Rank, Square};

use crate::types::PieceKind;

/// Parse a coordinate token without consulting a position.
///
/// Only checks the grammar `[a-h][1-8][a-h][1-8][qrbnQRBN]?`; legality is the
/// caller's concern. Squares must be lowercase so a rank-disambiguated bishop
/// move in SAN (`B1c4`) is never mistaken for `b1c4`.
pub fn parse_coordinate(token: &str) -> Result<Move, CoordinateError> {
    let token = token.trim().to_string();
    if !(token.len() == 4 || token.len() == 5) || !token.is_ascii() {
        return Err(CoordinateError::Syntax(token));
    }

    let from = parse_square(&token[0..2]).ok_or_else(|| CoordinateError::Syntax(token.clone()))?;
    let to = parse_square(&token[2..4]).ok_or_else(|| CoordinateError::Syntax(token.clone()))?;
    let promotion = match token.chars().nth(4) {
        None => None,
        Some(c) => match PieceKind::from_char(c) {
            Some(p @ (PieceKind::Queen | PieceKind::Rook | PieceKind::Bishop | PieceKind::Knight)) => {
                Some(Piece::from(p))
            }
            _ => return Err(CoordinateError::Syntax(token)),
        },
    };

    Ok(Move {
        from,
        to,
        promotion,
    })
}

/// Convert a standard castling step to cozy-chess king-takes-rook notation.
///
/// Only rewrites when a king stands on `from` and the rewritten move is legal;
/// anything else is returned untouched.
pub fn castling_to_internal(board: &Board, mv: Move, legal_moves: &[Move]) -> Move {
    if board.piece_on(mv.from) != Some(Piece::King) || mv.promotion.is_some() {
        return mv;
    }
    let is_back_rank = matches!(mv.from.rank(), Rank::First | Rank::Eighth);
    if !is_back_rank || mv.from.rank() != mv.to.rank() {
        return mv;
    }

    let rook_file = match (mv.from.file(), mv.to.file()) {
        (File::E, File::G) => File::H,
        (File::E, File::C) => File::A,
        _ => return mv,
    };

    let converted = Move {
        from: mv.from,
        to: Square::new(rook_file, mv.from.rank()),
        promotion: None,
    };

    if legal_moves.contains(&converted) {
        converted
    } else {
        mv
    }
}

/// True if `mv` is a castling move in cozy-chess notation on `board`.
pub fn is_castling(board: &Board, mv: Move) -> bool {
    board.piece_on(mv.from) == Some(Piece::King)
        && board.piece_on(mv.to) == Some(Piece::Rook)
        && board.color_on(mv.from) == board.color_on(mv.to)
}

/// Destination square of the king as a human sees it (g- or c-file when castling).
pub fn display_destination(board: &Board, mv: Move) -> Square {
    if is_castling(board, mv) {
        let file = if mv.to.file() as u8 > mv.from.file() as u8 {
            File::G
        } else {
            File::C
        };
        Square::new(file, mv.from.rank())
    } else {
        mv.to
    }
}

/// Format a move as a standard coordinate token, resolving castling against `board`.
pub fn format_coordinate(board: &Board, mv: Move) -> String {
    let mut s = format!(
        "{}{}",
        format_square(mv.from),
        format_square(display_destination(board, mv))
    );
    if let Some(promo) = mv.promotion {
        s.push(PieceKind::from(promo).to_char_lower());
    }
    s
}

pub fn format_square(sq: Square) -> String {
    let file = (b'a' + sq.file() as u8) as char;
    let rank = (b'1' + sq.rank() as u8) as char;
    format!("{}{}", file, rank)
}

pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars = s.chars();
    let file = chars.next()?;
    let rank = chars.next()?;
    if chars.next().is_some() || !('a'..='h').contains(&file) || !('1'..='8').contains(&rank) {
        return None;
    }
    Some(Square::new(
        File::index(file as usize - 'a' as usize),
        Rank::index(rank as usize - '1' as usize),
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordinateError {
    #[error("Not a coordinate move: {0}")]
    Syntax(String),
}
