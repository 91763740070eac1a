//! Wire types shared by the server and its clients.
//!
//! Everything here is plain serde data; no behaviour beyond small helpers.

mod chat;
mod error;
mod game;

pub use chat::{AppendChatRequest, ChatEntryView};
pub use error::{ErrorBody, ErrorCode};
pub use game::{
    CreateGameRequest, GameView, MoveView, SubmitMoveRequest, SubmitMoveResponse, SuggestionRequest,
    SuggestionResponse, SuggestionView, UndoResponse,
};
