//! Persistence layer: plain data records, the repository traits, and the
//! SQLite implementation.

pub mod sqlite;
pub mod traits;

pub use sqlite::{Database, SqliteStore};
pub use traits::{ConversationRepository, GameRepository, GameStore, MoveRepository};

use std::time::{SystemTime, UNIX_EPOCH};

use oracle::{ChatRole, ConversationEntry};

/// Errors from the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Migration failed: {0}")]
    Migration(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Game not found: {0}")]
    NotFound(String),
    #[error("Stored game is inconsistent: {0}")]
    Corrupt(String),
}

/// A stored game row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameData {
    pub id: String,
    pub event: String,
    pub site: String,
    pub white: String,
    pub black: String,
    pub round: u32,
    pub date: String,
    pub result: String,
    pub start_fen: String,
    pub fen: String,
    pub pgn: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// A stored move row. Rows are keyed by `(game_id, ply)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMove {
    pub game_id: String,
    pub ply: u32,
    pub color: String,
    pub piece: String,
    pub capture: bool,
    pub source: String,
    pub destination: String,
    pub san: String,
    pub uci: String,
    pub promotion: Option<String>,
    pub check_marker: Option<String>,
    pub castle: Option<String>,
    pub comment: Option<String>,
    pub fen_before: String,
    pub fen_after: String,
    pub created_at: i64,
}

/// A stored conversation entry; `seq` orders entries within a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredChatEntry {
    pub seq: i64,
    pub game_id: String,
    pub role: String,
    pub name: Option<String>,
    pub content: String,
}

impl StoredChatEntry {
    /// The entry as replayed to the oracle.
    pub fn to_entry(&self) -> Result<ConversationEntry, PersistenceError> {
        let role = self
            .role
            .parse::<ChatRole>()
            .map_err(|e| PersistenceError::Corrupt(format!("chat entry {}: {e}", self.seq)))?;
        Ok(ConversationEntry {
            role,
            name: self.name.clone(),
            content: self.content.clone(),
        })
    }
}

/// Current unix timestamp in seconds.
pub fn now_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}
