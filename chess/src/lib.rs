pub mod fen;
pub mod pgn;
pub mod position;
pub mod termination;
pub mod types;
pub mod uci;

pub use cozy_chess::{File, Rank, Square};
pub use fen::{format_fen, parse_fen, FenError, STARTING_FEN};
pub use position::{
    AppliedMove, CastleSide, CheckMarker, MoveError, PlacedPiece, Position, ReplayError,
};
pub use termination::{Outcome, Termination};
pub use types::{PieceColor, PieceKind};
pub use uci::{format_square, parse_square};
