use oracle::protocol::SuggestionMode;
use oracle::ConversationEntry;
use tokio::sync::{mpsc, oneshot};

use super::commands::{GameCommand, MoveOutcome, SuggestionReply, UndoOutcome};
use super::snapshot::GameSnapshot;
use crate::game::GameError;
use crate::persistence::StoredChatEntry;

/// Cheap, cloneable handle to a game actor.
#[derive(Clone)]
pub struct GameHandle {
    id: String,
    cmd_tx: mpsc::Sender<GameCommand>,
}

impl GameHandle {
    pub(crate) fn new(id: String, cmd_tx: mpsc::Sender<GameCommand>) -> Self {
        Self { id, cmd_tx }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub async fn submit_move(
        &self,
        token: String,
        expected_ply: Option<u32>,
    ) -> Result<MoveOutcome, GameError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameCommand::SubmitMove {
            token,
            expected_ply,
            reply: tx,
        })
        .await?;
        rx.await
            .map_err(|_| GameError::Internal("Reply dropped".into()))?
    }

    pub async fn undo(&self) -> Result<UndoOutcome, GameError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameCommand::Undo { reply: tx }).await?;
        rx.await
            .map_err(|_| GameError::Internal("Reply dropped".into()))?
    }

    pub async fn request_suggestion(
        &self,
        mode: SuggestionMode,
    ) -> Result<SuggestionReply, GameError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameCommand::RequestSuggestion { mode, reply: tx })
            .await?;
        rx.await
            .map_err(|_| GameError::Internal("Reply dropped".into()))?
    }

    pub async fn append_chat(&self, entry: ConversationEntry) -> Result<StoredChatEntry, GameError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameCommand::AppendChat { entry, reply: tx })
            .await?;
        rx.await
            .map_err(|_| GameError::Internal("Reply dropped".into()))?
    }

    pub async fn get_snapshot(&self) -> Result<GameSnapshot, GameError> {
        let (tx, rx) = oneshot::channel();
        self.send(GameCommand::GetSnapshot { reply: tx }).await?;
        rx.await
            .map_err(|_| GameError::Internal("Reply dropped".into()))
    }

    pub async fn shutdown(&self) {
        let _ = self.cmd_tx.send(GameCommand::Shutdown).await;
    }

    async fn send(&self, cmd: GameCommand) -> Result<(), GameError> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| GameError::Internal("Game actor closed".into()))
    }
}
