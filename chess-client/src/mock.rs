//! Mock ChessService implementation for testing

use crate::error::{ClientError, ClientResult};
use crate::traits::ChessService;
use async_trait::async_trait;
use chess_proto::{
    AppendChatRequest, ChatEntryView, CreateGameRequest, GameView, MoveView, SubmitMoveRequest,
    SubmitMoveResponse, SuggestionResponse, UndoResponse,
};
use std::sync::{Arc, Mutex};

type Responder<A, T> = Box<dyn Fn(&A) -> ClientResult<T> + Send>;

/// Mock service for testing - only compiled in test mode or with mock feature.
/// Clones share responses and the call log.
#[derive(Clone)]
pub struct MockChessService {
    responses: Arc<Mutex<MockResponses>>,
    call_log: Arc<Mutex<Vec<MockCall>>>,
}

#[derive(Default)]
struct MockResponses {
    create_game: Option<Responder<CreateGameRequest, GameView>>,
    get_game: Option<Responder<String, GameView>>,
    submit_move: Option<Responder<SubmitMoveRequest, SubmitMoveResponse>>,
    undo: Option<Responder<(), UndoResponse>>,
    suggestion: Option<Responder<Option<String>, SuggestionResponse>>,
    get_moves: Option<Responder<String, Vec<MoveView>>>,
    append_chat: Option<Responder<AppendChatRequest, ChatEntryView>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CreateGame(CreateGameRequest),
    GetGame { game_id: String },
    ListGames,
    SubmitMove { game_id: String, token: String, expected_ply: Option<u32> },
    Undo { game_id: String },
    RequestSuggestion { game_id: String, mode: Option<String> },
    GetMoves { game_id: String },
    GetChat { game_id: String },
    AppendChat { game_id: String, role: String, content: String },
}

impl Default for MockChessService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChessService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(MockResponses::default())),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Configure create_game response
    pub fn with_create_game_response<F>(self, f: F) -> Self
    where
        F: Fn(&CreateGameRequest) -> ClientResult<GameView> + Send + 'static,
    {
        self.responses.lock().unwrap().create_game = Some(Box::new(f));
        self
    }

    /// Configure get_game response
    pub fn with_get_game_response<F>(self, f: F) -> Self
    where
        F: Fn(&String) -> ClientResult<GameView> + Send + 'static,
    {
        self.responses.lock().unwrap().get_game = Some(Box::new(f));
        self
    }

    /// Configure submit_move response
    pub fn with_submit_move_response<F>(self, f: F) -> Self
    where
        F: Fn(&SubmitMoveRequest) -> ClientResult<SubmitMoveResponse> + Send + 'static,
    {
        self.responses.lock().unwrap().submit_move = Some(Box::new(f));
        self
    }

    /// Configure undo response
    pub fn with_undo_response<F>(self, f: F) -> Self
    where
        F: Fn() -> ClientResult<UndoResponse> + Send + 'static,
    {
        self.responses.lock().unwrap().undo = Some(Box::new(move |_: &()| f()));
        self
    }

    /// Configure request_suggestion response
    pub fn with_suggestion_response<F>(self, f: F) -> Self
    where
        F: Fn(&Option<String>) -> ClientResult<SuggestionResponse> + Send + 'static,
    {
        self.responses.lock().unwrap().suggestion = Some(Box::new(f));
        self
    }

    /// Configure get_moves response
    pub fn with_moves_response<F>(self, f: F) -> Self
    where
        F: Fn(&String) -> ClientResult<Vec<MoveView>> + Send + 'static,
    {
        self.responses.lock().unwrap().get_moves = Some(Box::new(f));
        self
    }

    /// Configure append_chat response
    pub fn with_append_chat_response<F>(self, f: F) -> Self
    where
        F: Fn(&AppendChatRequest) -> ClientResult<ChatEntryView> + Send + 'static,
    {
        self.responses.lock().unwrap().append_chat = Some(Box::new(f));
        self
    }

    /// Get recorded calls for verification
    pub fn get_calls(&self) -> Vec<MockCall> {
        self.call_log.lock().unwrap().clone()
    }

    /// Clear call history
    pub fn clear_calls(&self) {
        self.call_log.lock().unwrap().clear()
    }

    fn record(&self, call: MockCall) {
        self.call_log.lock().unwrap().push(call);
    }
}

fn respond<A, T>(responder: &Option<Responder<A, T>>, args: &A, name: &str) -> ClientResult<T> {
    match responder {
        Some(f) => f(args),
        None => Err(ClientError::NotConfigured(name.to_string())),
    }
}

#[async_trait]
impl ChessService for MockChessService {
    async fn create_game(&self, req: &CreateGameRequest) -> ClientResult<GameView> {
        self.record(MockCall::CreateGame(req.clone()));
        respond(&self.responses.lock().unwrap().create_game, req, "create_game")
    }

    async fn get_game(&self, game_id: &str) -> ClientResult<GameView> {
        self.record(MockCall::GetGame {
            game_id: game_id.to_string(),
        });
        respond(
            &self.responses.lock().unwrap().get_game,
            &game_id.to_string(),
            "get_game",
        )
    }

    async fn list_games(&self) -> ClientResult<Vec<GameView>> {
        self.record(MockCall::ListGames);
        Ok(Vec::new())
    }

    async fn submit_move(
        &self,
        game_id: &str,
        req: &SubmitMoveRequest,
    ) -> ClientResult<SubmitMoveResponse> {
        self.record(MockCall::SubmitMove {
            game_id: game_id.to_string(),
            token: req.token.clone(),
            expected_ply: req.expected_ply,
        });
        respond(&self.responses.lock().unwrap().submit_move, req, "submit_move")
    }

    async fn undo(&self, game_id: &str) -> ClientResult<UndoResponse> {
        self.record(MockCall::Undo {
            game_id: game_id.to_string(),
        });
        respond(&self.responses.lock().unwrap().undo, &(), "undo")
    }

    async fn request_suggestion(
        &self,
        game_id: &str,
        mode: Option<String>,
    ) -> ClientResult<SuggestionResponse> {
        self.record(MockCall::RequestSuggestion {
            game_id: game_id.to_string(),
            mode: mode.clone(),
        });
        respond(&self.responses.lock().unwrap().suggestion, &mode, "request_suggestion")
    }

    async fn get_moves(&self, game_id: &str) -> ClientResult<Vec<MoveView>> {
        self.record(MockCall::GetMoves {
            game_id: game_id.to_string(),
        });
        respond(
            &self.responses.lock().unwrap().get_moves,
            &game_id.to_string(),
            "get_moves",
        )
    }

    async fn get_chat(&self, game_id: &str) -> ClientResult<Vec<ChatEntryView>> {
        self.record(MockCall::GetChat {
            game_id: game_id.to_string(),
        });
        Ok(Vec::new())
    }

    async fn append_chat(
        &self,
        game_id: &str,
        req: &AppendChatRequest,
    ) -> ClientResult<ChatEntryView> {
        self.record(MockCall::AppendChat {
            game_id: game_id.to_string(),
            role: req.role.clone(),
            content: req.content.clone(),
        });
        respond(&self.responses.lock().unwrap().append_chat, req, "append_chat")
    }
}
