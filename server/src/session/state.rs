//! State owned by one game actor and the operations it runs on it.

use std::sync::Arc;

use oracle::protocol::{request_suggestion, SuggestionMode};
use oracle::{ConversationEntry, Oracle, OracleError, SuggestionOutcome};
use tokio::sync::{mpsc, oneshot};

use super::commands::{MoveOutcome, SuggestionReply, UndoOutcome};
use super::snapshot::GameSnapshot;
use crate::game::{applier, Commit, GameError, GameRecord, PreparedMove};
use crate::persistence::{now_timestamp, GameStore, PersistenceError, StoredChatEntry, StoredMove};

/// An oracle round trip that finished off the actor task.
pub(crate) struct SuggestionDone {
    pub for_ply: u32,
    /// Position the oracle was asked about.
    pub for_fen: String,
    pub result: Result<SuggestionOutcome, OracleError>,
    pub reply: oneshot::Sender<Result<SuggestionReply, GameError>>,
}

pub(crate) struct GameState<S: GameStore> {
    pub record: GameRecord,
    store: S,
    oracle: Arc<dyn Oracle>,
}

impl<S: GameStore> GameState<S> {
    pub fn new(record: GameRecord, store: S, oracle: Arc<dyn Oracle>) -> Self {
        Self {
            record,
            store,
            oracle,
        }
    }

    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::from(&self.record)
    }

    pub async fn submit_move(
        &mut self,
        token: &str,
        expected_ply: Option<u32>,
    ) -> Result<MoveOutcome, GameError> {
        match applier::commit(&self.record, token, expected_ply, now_timestamp())? {
            Commit::Replayed(ply) => {
                tracing::info!(ply, token, "Duplicate move replayed");
                let mv = self.recorded_move(ply).await?;
                Ok(MoveOutcome {
                    mv,
                    snapshot: self.snapshot(),
                    replayed: true,
                })
            }
            Commit::Applied(prepared) => {
                let PreparedMove {
                    record,
                    stored,
                    entry,
                } = *prepared;
                self.store.record_move(record.data(), &stored, &entry).await?;
                self.record = record;
                Ok(MoveOutcome {
                    mv: stored,
                    snapshot: self.snapshot(),
                    replayed: false,
                })
            }
        }
    }

    pub async fn undo(&mut self) -> Result<UndoOutcome, GameError> {
        let prepared = applier::undo(&self.record, now_timestamp())?;
        let removed = self.recorded_move(prepared.ply).await?;
        self.store
            .record_undo(prepared.record.data(), prepared.ply, &prepared.entry)
            .await?;
        self.record = prepared.record;
        Ok(UndoOutcome {
            removed,
            snapshot: self.snapshot(),
        })
    }

    pub async fn append_chat(&self, entry: &ConversationEntry) -> Result<StoredChatEntry, GameError> {
        Ok(self.store.append_entry(self.record.id(), entry).await?)
    }

    /// Load the conversation and hand the oracle call to a separate task. The
    /// result comes back through `done_tx`.
    pub async fn start_suggestion(
        &self,
        mode: SuggestionMode,
        reply: oneshot::Sender<Result<SuggestionReply, GameError>>,
        done_tx: &mpsc::UnboundedSender<SuggestionDone>,
    ) {
        let outcome = self.record.outcome();
        if outcome.is_terminal() {
            let _ = reply.send(Err(GameError::GameOver(outcome.as_str().to_string())));
            return;
        }

        let log = match self.conversation().await {
            Ok(log) => log,
            Err(e) => {
                let _ = reply.send(Err(e));
                return;
            }
        };

        let oracle = Arc::clone(&self.oracle);
        let position = self.record.position().clone();
        let notation = self.record.data().pgn.clone();
        let for_ply = position.ply();
        let for_fen = self.record.data().fen.clone();
        let done_tx = done_tx.clone();

        tracing::debug!(for_ply, mode = mode.as_str(), "Requesting suggestion");
        tokio::spawn(async move {
            let result =
                request_suggestion(oracle.as_ref(), &log, &position, &notation, mode).await;
            let _ = done_tx.send(SuggestionDone {
                for_ply,
                for_fen,
                result,
                reply,
            });
        });
    }

    /// Record the oracle's reply in the conversation and answer the caller.
    ///
    /// A reply computed for a position the game has since left is not
    /// appended: it would land after the newer move entries. The caller still
    /// gets it, tagged with the old `for_ply`, and discards it.
    pub async fn finish_suggestion(&self, done: SuggestionDone) {
        let SuggestionDone {
            for_ply,
            for_fen,
            result,
            reply,
        } = done;

        let current = for_ply == self.record.ply() && for_fen == self.record.data().fen;
        let response = match result {
            Ok(outcome) if !current => {
                tracing::info!(for_ply, ply = self.record.ply(), "Stale suggestion not recorded");
                Ok(SuggestionReply {
                    for_ply,
                    suggestion: outcome.suggestion,
                })
            }
            Ok(outcome) => self
                .append_chat(&outcome.reply_entry)
                .await
                .map(|_| SuggestionReply {
                    for_ply,
                    suggestion: outcome.suggestion,
                }),
            Err(e) => {
                tracing::warn!(for_ply, error = %e, "Oracle request failed");
                Err(GameError::Oracle(e))
            }
        };
        let _ = reply.send(response);
    }

    async fn conversation(&self) -> Result<Vec<ConversationEntry>, GameError> {
        let stored = self.store.list_entries(self.record.id()).await?;
        let entries = stored
            .iter()
            .map(StoredChatEntry::to_entry)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    async fn recorded_move(&self, ply: u32) -> Result<StoredMove, GameError> {
        self.store
            .load_move(self.record.id(), ply)
            .await?
            .ok_or_else(|| {
                GameError::Persistence(PersistenceError::Corrupt(format!(
                    "{}: move {ply} missing from store",
                    self.record.id()
                )))
            })
    }
}
