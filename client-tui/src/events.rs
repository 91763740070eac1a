//! Events consumed by the board controller.

use chess::Square;
use chess_client::{
    ChatEntryView, ClientResult, GameView, MoveView, SubmitMoveResponse, SuggestionResponse, UndoResponse,
};

use crate::board_state::MoveAttempt;

/// User input, already mapped from terminal cells to squares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    PickUp(Square),
    /// `None` when released outside the board.
    Drop(Option<Square>),
    Undo,
    /// Answer "retry" to a blocking notice.
    Retry,
    ChatSubmitted(String),
    FlipView,
}

/// Completion of a network request, queued by the task that ran it.
#[derive(Debug)]
pub enum ControllerEvent {
    MoveCommitted {
        attempt: MoveAttempt,
        result: ClientResult<SubmitMoveResponse>,
    },
    UndoFinished(ClientResult<UndoResponse>),
    SuggestionArrived(ClientResult<SuggestionResponse>),
    ChatAppended {
        content: String,
        result: ClientResult<ChatEntryView>,
    },
    GameReloaded(ClientResult<(GameView, Vec<MoveView>)>),
}
