use oracle::protocol::{Suggestion, SuggestionMode};
use oracle::ConversationEntry;
use tokio::sync::oneshot;

use super::snapshot::GameSnapshot;
use crate::game::GameError;
use crate::persistence::{StoredChatEntry, StoredMove};

#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub mv: StoredMove,
    pub snapshot: GameSnapshot,
    /// The move was already recorded; nothing was written.
    pub replayed: bool,
}

#[derive(Debug, Clone)]
pub struct UndoOutcome {
    pub removed: StoredMove,
    pub snapshot: GameSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionReply {
    /// Ply of the position the oracle was asked about.
    pub for_ply: u32,
    pub suggestion: Suggestion,
}

/// Commands sent to a game actor. Each embeds a oneshot for the reply.
pub enum GameCommand {
    SubmitMove {
        token: String,
        expected_ply: Option<u32>,
        reply: oneshot::Sender<Result<MoveOutcome, GameError>>,
    },
    Undo {
        reply: oneshot::Sender<Result<UndoOutcome, GameError>>,
    },
    RequestSuggestion {
        mode: SuggestionMode,
        reply: oneshot::Sender<Result<SuggestionReply, GameError>>,
    },
    AppendChat {
        entry: ConversationEntry,
        reply: oneshot::Sender<Result<StoredChatEntry, GameError>>,
    },
    GetSnapshot {
        reply: oneshot::Sender<GameSnapshot>,
    },
    Shutdown,
}
