use chess::MoveError;
use oracle::OracleError;

use crate::persistence::PersistenceError;

/// Errors produced while operating on a single game.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("{error}")]
    Rejected {
        error: MoveError,
        /// Legal moves for the side to move, for re-prompting.
        legal_moves: Vec<String>,
    },
    #[error("Game is over ({0})")]
    GameOver(String),
    #[error("Stale move: expected ply {expected}, game is at ply {actual}")]
    StaleMove { expected: u32, actual: u32 },
    #[error("No moves to undo")]
    NothingToUndo,
    #[error("Game not found: {0}")]
    NotFound(String),
    #[error("Bad request: {0}")]
    BadRequest(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error("Oracle error: {0}")]
    Oracle(#[from] OracleError),
    #[error("Internal error: {0}")]
    Internal(String),
}
