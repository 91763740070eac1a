//! Position model: a cozy-chess board plus the stack of moves that produced it.

use cozy_chess::{BitBoard, Board, Color, GameStatus, Move, Piece, Square};

use crate::fen::{format_fen, parse_fen, FenError, STARTING_FEN};
use crate::pgn::san::{format_san, is_capture, parse_san, SanError};
use crate::termination::{classify, Termination};
use crate::types::{PieceColor, PieceKind};
use crate::uci::{castling_to_internal, display_destination, format_coordinate, is_castling, parse_coordinate};

/// Why a move token was not applied.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("Unrecognised move notation: {0}")]
    InvalidSyntax(String),
    #[error("Illegal move: {0}")]
    IllegalMove(String),
    #[error("Ambiguous move: {0}")]
    AmbiguousMove(String),
}

impl From<SanError> for MoveError {
    fn from(err: SanError) -> Self {
        match err {
            SanError::NoLegalMove(t) => Self::IllegalMove(t),
            SanError::AmbiguousMove(t) => Self::AmbiguousMove(t),
            SanError::InvalidFormat(t) | SanError::InvalidSquare(t) | SanError::InvalidPromotion(t) => {
                Self::InvalidSyntax(t)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckMarker {
    Check,
    Mate,
}

impl CheckMarker {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Check => "+",
            Self::Mate => "#",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CastleSide {
    Kingside,
    Queenside,
}

impl CastleSide {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Kingside => "O-O",
            Self::Queenside => "O-O-O",
        }
    }
}

/// A move as it was applied, with both notations and the surrounding positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedMove {
    /// Zero-based half-move index within this game.
    pub ply: u32,
    pub color: PieceColor,
    pub piece: PieceKind,
    pub captured: Option<PieceKind>,
    pub promotion: Option<PieceKind>,
    pub from: Square,
    /// Destination as a player sees it (g1/c1 when castling).
    pub to: Square,
    pub uci: String,
    pub san: String,
    pub check: Option<CheckMarker>,
    pub castle: Option<CastleSide>,
    pub fen_before: String,
    pub fen_after: String,
    /// Classification of the position after this move.
    pub termination: Termination,
    /// Internal cozy-chess move (castling as king-takes-rook).
    pub mv: Move,
}

/// A piece and where it stands, for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedPiece {
    pub square: Square,
    pub color: PieceColor,
    pub kind: PieceKind,
}

#[derive(Debug, Clone)]
pub struct Position {
    start: Board,
    start_fen: String,
    board: Board,
    applied: Vec<AppliedMove>,
    /// Board before each applied move.
    boards: Vec<Board>,
    /// Hash of the start position and of the position after each move.
    hashes: Vec<u64>,
    /// Halfmoves since the last capture or pawn move, aligned with `hashes`.
    halfmoves: Vec<u32>,
}

impl Position {
    pub fn new() -> Self {
        let board = Board::default();
        Self::from_board(board, STARTING_FEN.to_string())
    }

    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let board = parse_fen(fen)?;
        let canonical = format_fen(&board);
        Ok(Self::from_board(board, canonical))
    }

    fn from_board(board: Board, start_fen: String) -> Self {
        let halfmoves = u32::from(board.halfmove_clock());
        Self {
            start: board.clone(),
            start_fen,
            hashes: vec![board.hash()],
            halfmoves: vec![halfmoves],
            board,
            applied: Vec::new(),
            boards: Vec::new(),
        }
    }

    /// Replay coordinate or SAN tokens from `start_fen`.
    pub fn replay<'a>(
        start_fen: &str,
        tokens: impl IntoIterator<Item = &'a str>,
    ) -> Result<Self, ReplayError> {
        let mut position = Self::from_fen(start_fen)?;
        for (ply, token) in tokens.into_iter().enumerate() {
            position
                .apply(token)
                .map_err(|source| ReplayError::Move { ply, source })?;
        }
        Ok(position)
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn start_fen(&self) -> &str {
        &self.start_fen
    }

    pub fn start_board(&self) -> &Board {
        &self.start
    }

    pub fn to_fen(&self) -> String {
        format_fen(&self.board)
    }

    pub fn side_to_move(&self) -> PieceColor {
        self.board.side_to_move().into()
    }

    pub fn moves(&self) -> &[AppliedMove] {
        &self.applied
    }

    pub fn last_move(&self) -> Option<&AppliedMove> {
        self.applied.last()
    }

    /// Number of moves applied since the start position.
    pub fn ply(&self) -> u32 {
        self.applied.len() as u32
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        self.board.generate_moves(|mvs| {
            moves.extend(mvs);
            false
        });
        moves
    }

    /// Sorted coordinate tokens for every legal move of the side to move.
    pub fn legal_move_tokens(&self) -> Vec<String> {
        let mut tokens: Vec<String> = self
            .legal_moves()
            .into_iter()
            .map(|mv| format_coordinate(&self.board, mv))
            .collect();
        tokens.sort();
        tokens
    }

    /// Resolve a coordinate or SAN token to a legal move without applying it.
    ///
    /// Coordinate notation is tried first; SAN only when the token is not
    /// coordinate-shaped.
    pub fn resolve(&self, token: &str) -> Result<Move, MoveError> {
        let legal = self.legal_moves();
        match parse_coordinate(token) {
            Ok(mv) => {
                let mv = castling_to_internal(&self.board, mv, &legal);
                if legal.contains(&mv) {
                    Ok(mv)
                } else {
                    Err(MoveError::IllegalMove(token.trim().to_string()))
                }
            }
            Err(_) => Ok(parse_san(&self.board, token)?),
        }
    }

    pub fn apply(&mut self, token: &str) -> Result<AppliedMove, MoveError> {
        let mv = self.resolve(token)?;
        self.play(mv, token)
    }

    fn play(&mut self, mv: Move, token: &str) -> Result<AppliedMove, MoveError> {
        let before = self.board.clone();
        let (Some(piece), Some(color)) = (before.piece_on(mv.from), before.color_on(mv.from)) else {
            return Err(MoveError::IllegalMove(token.to_string()));
        };

        let castle = is_castling(&before, mv).then(|| {
            if mv.to.file() as u8 > mv.from.file() as u8 {
                CastleSide::Kingside
            } else {
                CastleSide::Queenside
            }
        });
        let captured = if castle.is_some() || !is_capture(&before, mv, piece) {
            None
        } else {
            Some(before.piece_on(mv.to).unwrap_or(Piece::Pawn))
        };
        let san = format_san(&before, mv);
        let uci = format_coordinate(&before, mv);

        self.board
            .try_play(mv)
            .map_err(|_| MoveError::IllegalMove(token.to_string()))?;

        let previous = self.halfmoves.last().copied().unwrap_or(0);
        let halfmoves = if piece == Piece::Pawn || captured.is_some() {
            0
        } else {
            previous + 1
        };
        self.hashes.push(self.board.hash());
        self.halfmoves.push(halfmoves);

        let check = if self.board.checkers().is_empty() {
            None
        } else if self.board.status() == GameStatus::Won {
            Some(CheckMarker::Mate)
        } else {
            Some(CheckMarker::Check)
        };

        let applied = AppliedMove {
            ply: self.ply(),
            color: color.into(),
            piece: piece.into(),
            captured: captured.map(PieceKind::from),
            promotion: mv.promotion.map(PieceKind::from),
            from: mv.from,
            to: display_destination(&before, mv),
            uci,
            san,
            check,
            castle,
            fen_before: format_fen(&before),
            fen_after: format_fen(&self.board),
            termination: classify(&self.board, &self.hashes, halfmoves),
            mv,
        };
        self.boards.push(before);
        self.applied.push(applied.clone());
        Ok(applied)
    }

    /// Pop the last move. Returns `None` when nothing has been played.
    pub fn undo(&mut self) -> Option<AppliedMove> {
        let undone = self.applied.pop()?;
        if let Some(board) = self.boards.pop() {
            self.board = board;
        }
        self.hashes.pop();
        self.halfmoves.pop();
        Some(undone)
    }

    pub fn classify_termination(&self) -> Termination {
        let halfmoves = self.halfmoves.last().copied().unwrap_or(0);
        classify(&self.board, &self.hashes, halfmoves)
    }

    /// Squares the piece on `from` can legally reach. Castling targets are
    /// reported as the king's destination (g- or c-file).
    pub fn legal_destinations(&self, from: Square) -> Vec<Square> {
        let mut squares: Vec<Square> = self
            .legal_moves()
            .into_iter()
            .filter(|mv| mv.from == from)
            .map(|mv| display_destination(&self.board, mv))
            .collect();
        squares.sort_by_key(|sq| *sq as u8);
        squares.dedup();
        squares
    }

    /// Pieces of `by` attacking `square`. Does not consider pins.
    pub fn attackers_of(&self, square: Square, by: PieceColor) -> Vec<Square> {
        let color = Color::from(by);
        let board = &self.board;
        let occupied = board.occupied();
        let own = board.colors(color);

        let diagonal = board.pieces(Piece::Bishop) | board.pieces(Piece::Queen);
        let orthogonal = board.pieces(Piece::Rook) | board.pieces(Piece::Queen);

        let attackers: BitBoard = (cozy_chess::get_pawn_attacks(square, !color) & board.pieces(Piece::Pawn))
            | (cozy_chess::get_knight_moves(square) & board.pieces(Piece::Knight))
            | (cozy_chess::get_bishop_moves(square, occupied) & diagonal)
            | (cozy_chess::get_rook_moves(square, occupied) & orthogonal)
            | (cozy_chess::get_king_moves(square) & board.pieces(Piece::King));

        (attackers & own).into_iter().collect()
    }

    /// King square of the side to move, if that king is in check.
    pub fn king_in_check(&self) -> Option<Square> {
        if self.board.checkers().is_empty() {
            None
        } else {
            Some(self.board.king(self.board.side_to_move()))
        }
    }

    /// Squares of the pieces giving check.
    pub fn checkers(&self) -> Vec<Square> {
        self.board.checkers().into_iter().collect()
    }

    pub fn piece_at(&self, square: Square) -> Option<(PieceColor, PieceKind)> {
        let piece = self.board.piece_on(square)?;
        let color = self.board.color_on(square)?;
        Some((color.into(), piece.into()))
    }

    pub fn piece_map(&self) -> Vec<PlacedPiece> {
        self.board
            .occupied()
            .into_iter()
            .filter_map(|square| {
                self.piece_at(square).map(|(color, kind)| PlacedPiece { square, color, kind })
            })
            .collect()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReplayError {
    #[error(transparent)]
    Fen(#[from] FenError),
    #[error("move {ply}: {source}")]
    Move { ply: usize, source: MoveError },
}
