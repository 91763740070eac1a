//! ChessService trait abstraction for client implementations

use crate::error::ClientResult;
use async_trait::async_trait;
use chess_proto::{
    AppendChatRequest, ChatEntryView, CreateGameRequest, GameView, MoveView, SubmitMoveRequest,
    SubmitMoveResponse, SuggestionResponse, UndoResponse,
};

/// Core chess service interface
/// Implemented by both the real HTTP client and MockChessService
#[async_trait]
pub trait ChessService: Send + Sync {
    /// Create a new game
    async fn create_game(&self, req: &CreateGameRequest) -> ClientResult<GameView>;

    async fn get_game(&self, game_id: &str) -> ClientResult<GameView>;

    async fn list_games(&self) -> ClientResult<Vec<GameView>>;

    /// Submit a move token for the side to move
    async fn submit_move(
        &self,
        game_id: &str,
        req: &SubmitMoveRequest,
    ) -> ClientResult<SubmitMoveResponse>;

    /// Take back the last move
    async fn undo(&self, game_id: &str) -> ClientResult<UndoResponse>;

    /// Ask the oracle for a move for the side to move
    async fn request_suggestion(
        &self,
        game_id: &str,
        mode: Option<String>,
    ) -> ClientResult<SuggestionResponse>;

    /// Recorded moves ordered by ply
    async fn get_moves(&self, game_id: &str) -> ClientResult<Vec<MoveView>>;

    /// Conversation entries in insertion order
    async fn get_chat(&self, game_id: &str) -> ClientResult<Vec<ChatEntryView>>;

    async fn append_chat(
        &self,
        game_id: &str,
        req: &AppendChatRequest,
    ) -> ClientResult<ChatEntryView>;
}
