//! Async repository traits for the persistence layer.
//!
//! Methods return `impl Future + Send` rather than using `async fn` so that
//! the futures are guaranteed `Send`, which `tokio::spawn` needs when game
//! actors call them.
//!
//! A move commit touches the game row, the move list and the conversation;
//! implementations must write all three atomically.

use std::future::Future;

use oracle::ConversationEntry;

use super::{GameData, PersistenceError, StoredChatEntry, StoredMove};

pub trait GameRepository: Send + Sync {
    /// Insert a new game together with its opening conversation.
    fn create_game(
        &self,
        game: &GameData,
        seed: &[ConversationEntry],
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    fn load_game(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<GameData>, PersistenceError>> + Send;

    /// All games, most recently updated first.
    fn list_games(&self) -> impl Future<Output = Result<Vec<GameData>, PersistenceError>> + Send;

    /// Append `mv`, update `game` and append `entry` in one transaction.
    fn record_move(
        &self,
        game: &GameData,
        mv: &StoredMove,
        entry: &ConversationEntry,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Remove the move at `ply` (the last one), update `game` and append
    /// `entry` in one transaction.
    fn record_undo(
        &self,
        game: &GameData,
        ply: u32,
        entry: &ConversationEntry,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}

pub trait MoveRepository: Send + Sync {
    /// Moves of a game ordered by ply.
    fn list_moves(
        &self,
        game_id: &str,
    ) -> impl Future<Output = Result<Vec<StoredMove>, PersistenceError>> + Send;

    fn load_move(
        &self,
        game_id: &str,
        ply: u32,
    ) -> impl Future<Output = Result<Option<StoredMove>, PersistenceError>> + Send;
}

pub trait ConversationRepository: Send + Sync {
    fn append_entry(
        &self,
        game_id: &str,
        entry: &ConversationEntry,
    ) -> impl Future<Output = Result<StoredChatEntry, PersistenceError>> + Send;

    /// Entries of a game in insertion order.
    fn list_entries(
        &self,
        game_id: &str,
    ) -> impl Future<Output = Result<Vec<StoredChatEntry>, PersistenceError>> + Send;
}

/// Everything a game actor needs from storage.
pub trait GameStore:
    GameRepository + MoveRepository + ConversationRepository + Clone + 'static
{
}

impl<T> GameStore for T where
    T: GameRepository + MoveRepository + ConversationRepository + Clone + 'static
{
}
