//! SQLite-backed repositories.
//!
//! [`Database`] wraps a `sqlx::SqlitePool` with WAL journaling, foreign keys
//! and the embedded `migrations/` schema. [`SqliteStore`] implements every
//! repository trait over that pool:
//!
//! | Trait | File |
//! |-------|------|
//! | `GameRepository` | `game_repo.rs` |
//! | `MoveRepository` | `move_repo.rs` |
//! | `ConversationRepository` | `chat_repo.rs` |
//!
//! Writes that span tables (`record_move`, `record_undo`, `create_game`) run in
//! a single transaction.

mod chat_repo;
mod database;
mod game_repo;
mod move_repo;

pub use database::{Database, DATABASE_FILE};

use sqlx::SqlitePool;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
        }
    }
}
