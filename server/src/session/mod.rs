//! One actor task per game. The manager spawns actors on demand and routes
//! callers to them through cloneable handles.

pub mod actor;
pub mod commands;
pub mod handle;
pub mod snapshot;
pub mod state;

use std::collections::HashMap;
use std::sync::Arc;

use chess_proto::CreateGameRequest;
use oracle::conversation::seed_entries;
use oracle::{Oracle, SuggestionMode};
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::game::{GameError, GameRecord};
use crate::persistence::{now_timestamp, GameStore, StoredChatEntry, StoredMove};
use actor::run_game_actor;
pub use commands::{MoveOutcome, SuggestionReply, UndoOutcome};
pub use handle::GameHandle;
pub use snapshot::GameSnapshot;
use state::GameState;

/// Settings applied to every game.
#[derive(Debug, Clone)]
pub struct GameSettings {
    pub suggestion_mode: SuggestionMode,
    pub system_prompt: String,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            suggestion_mode: SuggestionMode::default(),
            system_prompt: oracle::conversation::DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Owns the live game actors.
pub struct GameManager<S: GameStore> {
    games: RwLock<HashMap<String, GameHandle>>,
    store: S,
    oracle: Arc<dyn Oracle>,
    settings: GameSettings,
}

impl<S: GameStore> GameManager<S> {
    pub fn new(store: S, oracle: Arc<dyn Oracle>, settings: GameSettings) -> Self {
        Self {
            games: RwLock::new(HashMap::new()),
            store,
            oracle,
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub async fn create_game(&self, req: &CreateGameRequest) -> Result<GameSnapshot, GameError> {
        let id = Uuid::new_v4().to_string();
        let today = chrono::Local::now().format("%Y.%m.%d").to_string();
        let record = GameRecord::create(id.clone(), req, &today, now_timestamp())?;

        let seed = seed_entries(&self.settings.system_prompt, record.position().side_to_move());
        self.store.create_game(record.data(), &seed).await?;
        tracing::info!(game_id = %id, white = %record.data().white, black = %record.data().black, "Game created");

        let snapshot = GameSnapshot::from(&record);
        let handle = self.spawn(record);
        self.games.write().await.insert(id, handle);
        Ok(snapshot)
    }

    /// Handle for a game, loading it from the store and starting its actor
    /// when it is not running yet.
    pub async fn handle(&self, id: &str) -> Result<GameHandle, GameError> {
        if let Some(handle) = self.games.read().await.get(id) {
            return Ok(handle.clone());
        }

        let mut games = self.games.write().await;
        if let Some(handle) = games.get(id) {
            return Ok(handle.clone());
        }

        let data = self
            .store
            .load_game(id)
            .await?
            .ok_or_else(|| GameError::NotFound(id.to_string()))?;
        let record = GameRecord::from_data(data)?;
        tracing::info!(game_id = %id, ply = record.ply(), "Game loaded from store");

        let handle = self.spawn(record);
        games.insert(id.to_string(), handle.clone());
        Ok(handle)
    }

    pub async fn list_games(&self) -> Result<Vec<GameSnapshot>, GameError> {
        let mut snapshots = Vec::new();
        for data in self.store.list_games().await? {
            match GameRecord::from_data(data) {
                Ok(record) => snapshots.push(GameSnapshot::from(&record)),
                Err(e) => tracing::warn!(error = %e, "Skipping unreadable game"),
            }
        }
        Ok(snapshots)
    }

    pub async fn moves(&self, id: &str) -> Result<Vec<StoredMove>, GameError> {
        self.ensure_exists(id).await?;
        Ok(self.store.list_moves(id).await?)
    }

    pub async fn chat(&self, id: &str) -> Result<Vec<StoredChatEntry>, GameError> {
        self.ensure_exists(id).await?;
        Ok(self.store.list_entries(id).await?)
    }

    pub async fn shutdown_all(&self) {
        let handles: Vec<GameHandle> = self.games.write().await.drain().map(|(_, h)| h).collect();
        for handle in handles {
            handle.shutdown().await;
        }
    }

    async fn ensure_exists(&self, id: &str) -> Result<(), GameError> {
        if self.games.read().await.contains_key(id) {
            return Ok(());
        }
        match self.store.load_game(id).await? {
            Some(_) => Ok(()),
            None => Err(GameError::NotFound(id.to_string())),
        }
    }

    fn spawn(&self, record: GameRecord) -> GameHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(32);
        let id = record.id().to_string();
        let state = GameState::new(record, self.store.clone(), Arc::clone(&self.oracle));
        tokio::spawn(async move {
            run_game_actor(state, cmd_rx).await;
        });
        GameHandle::new(id, cmd_tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{Database, SqliteStore};
    use oracle::{OracleError, OracleReply, ScriptedOracle, Suggestion};

    async fn manager(oracle: ScriptedOracle) -> GameManager<SqliteStore> {
        let db = Database::new_in_memory().await.unwrap();
        GameManager::new(SqliteStore::new(&db), Arc::new(oracle), GameSettings::default())
    }

    #[tokio::test]
    async fn test_create_seeds_conversation() {
        let mgr = manager(ScriptedOracle::replying("e2e4")).await;
        let snap = mgr.create_game(&CreateGameRequest::default()).await.unwrap();
        assert_eq!(snap.ply, 0);
        assert_eq!(snap.legal_moves.len(), 20);

        let chat = mgr.chat(&snap.data.id).await.unwrap();
        let contents: Vec<&str> = chat.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(
            contents,
            vec![
                "You are a chess master.",
                "White, what's your first move?",
                "Return a single move in chess notation."
            ]
        );
    }

    #[tokio::test]
    async fn test_concurrent_commits_are_serialized() {
        let mgr = manager(ScriptedOracle::replying("e2e4")).await;
        let id = mgr.create_game(&CreateGameRequest::default()).await.unwrap().data.id;
        let a = mgr.handle(&id).await.unwrap();
        let b = mgr.handle(&id).await.unwrap();

        let (ra, rb) = tokio::join!(
            a.submit_move("e2e4".into(), Some(0)),
            b.submit_move("d2d4".into(), Some(0))
        );
        // Exactly one wins; the other sees the stale ply.
        assert!(ra.is_ok() != rb.is_ok());
        let loser = if ra.is_ok() { rb } else { ra };
        assert!(matches!(loser, Err(GameError::StaleMove { .. })));
        assert_eq!(mgr.moves(&id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_after_shutdown() {
        let mgr = manager(ScriptedOracle::replying("e2e4")).await;
        let id = mgr.create_game(&CreateGameRequest::default()).await.unwrap().data.id;
        let handle = mgr.handle(&id).await.unwrap();
        handle.submit_move("e4".into(), None).await.unwrap();
        handle.submit_move("e5".into(), None).await.unwrap();

        mgr.shutdown_all().await;
        let snap = mgr.handle(&id).await.unwrap().get_snapshot().await.unwrap();
        assert_eq!(snap.ply, 2);
        assert_eq!(
            snap.data.fen,
            "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq - 0 2"
        );
    }

    #[tokio::test]
    async fn test_suggestion_appends_reply_and_reports_ply() {
        let oracle = ScriptedOracle::replying("I like e2e4.");
        let mgr = manager(oracle.clone()).await;
        let id = mgr.create_game(&CreateGameRequest::default()).await.unwrap().data.id;
        let handle = mgr.handle(&id).await.unwrap();

        let reply = handle
            .request_suggestion(SuggestionMode::Freeform)
            .await
            .unwrap();
        assert_eq!(reply.for_ply, 0);
        assert_eq!(reply.suggestion, Suggestion::Move("e2e4".into()));

        let chat = mgr.chat(&id).await.unwrap();
        let last = chat.last().unwrap();
        assert_eq!(last.role, "assistant");
        assert_eq!(last.content, "I like e2e4.");

        // The oracle saw the seed conversation plus the two context entries.
        assert_eq!(oracle.requests()[0].messages.len(), 5);
    }

    #[tokio::test]
    async fn test_reply_for_an_old_position_is_not_recorded() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let oracle = ScriptedOracle::replying("I like d2d4.").gated(Arc::clone(&gate));
        let mgr = manager(oracle.clone()).await;
        let id = mgr.create_game(&CreateGameRequest::default()).await.unwrap().data.id;
        let handle = mgr.handle(&id).await.unwrap();

        let pending = tokio::spawn({
            let handle = handle.clone();
            async move { handle.request_suggestion(SuggestionMode::Freeform).await }
        });
        tokio::time::timeout(std::time::Duration::from_secs(5), async {
            while oracle.requests().is_empty() {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();

        handle.submit_move("e2e4".into(), Some(0)).await.unwrap();
        gate.notify_one();
        let reply = pending.await.unwrap().unwrap();
        assert_eq!(reply.for_ply, 0);

        let chat = mgr.chat(&id).await.unwrap();
        let last = chat.last().unwrap();
        assert_eq!(last.content, "white: e2e4");
        assert!(chat.iter().all(|e| e.content != "I like d2d4."));
    }

    #[tokio::test]
    async fn test_oracle_failure_is_reported() {
        let oracle = ScriptedOracle::new(|_| Err(OracleError::Unavailable("down".into())));
        let mgr = manager(oracle).await;
        let id = mgr.create_game(&CreateGameRequest::default()).await.unwrap().data.id;
        let handle = mgr.handle(&id).await.unwrap();

        let result = handle.request_suggestion(SuggestionMode::Enumerated).await;
        assert!(matches!(result, Err(GameError::Oracle(OracleError::Unavailable(_)))));
        // Nothing was added to the conversation.
        assert_eq!(mgr.chat(&id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_structured_reply() {
        let oracle = ScriptedOracle::new(|_| {
            Ok(OracleReply::StructuredField {
                name: "move".into(),
                value: "g1f3".into(),
            })
        });
        let mgr = manager(oracle).await;
        let id = mgr.create_game(&CreateGameRequest::default()).await.unwrap().data.id;
        let reply = mgr
            .handle(&id)
            .await
            .unwrap()
            .request_suggestion(SuggestionMode::Enumerated)
            .await
            .unwrap();
        assert_eq!(reply.suggestion, Suggestion::Move("g1f3".into()));
        let chat = mgr.chat(&id).await.unwrap();
        assert_eq!(chat.last().unwrap().name.as_deref(), Some("get_next_move"));
    }

    #[tokio::test]
    async fn test_unknown_game() {
        let mgr = manager(ScriptedOracle::replying("")).await;
        assert!(matches!(mgr.handle("missing").await, Err(GameError::NotFound(_))));
        assert!(matches!(mgr.moves("missing").await, Err(GameError::NotFound(_))));
    }
}
