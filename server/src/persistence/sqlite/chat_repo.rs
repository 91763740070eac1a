//! SQLite-backed conversation log.

use oracle::ConversationEntry;
use sqlx::{Executor, Sqlite};

use super::SqliteStore;
use crate::persistence::traits::ConversationRepository;
use crate::persistence::{PersistenceError, StoredChatEntry};

#[derive(sqlx::FromRow)]
struct ChatRow {
    seq: i64,
    game_id: String,
    role: String,
    name: Option<String>,
    content: String,
}

impl From<ChatRow> for StoredChatEntry {
    fn from(r: ChatRow) -> Self {
        Self {
            seq: r.seq,
            game_id: r.game_id,
            role: r.role,
            name: r.name,
            content: r.content,
        }
    }
}

/// Insert one entry and return its sequence number. Shared with the game
/// repository so entries can join a move transaction.
pub(super) async fn insert_entry<'e, E>(
    executor: E,
    game_id: &str,
    entry: &ConversationEntry,
) -> Result<i64, PersistenceError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result =
        sqlx::query("INSERT INTO chat_entries (game_id, role, name, content) VALUES (?, ?, ?, ?)")
            .bind(game_id)
            .bind(entry.role.as_str())
            .bind(&entry.name)
            .bind(&entry.content)
            .execute(executor)
            .await?;
    Ok(result.last_insert_rowid())
}

impl ConversationRepository for SqliteStore {
    async fn append_entry(
        &self,
        game_id: &str,
        entry: &ConversationEntry,
    ) -> Result<StoredChatEntry, PersistenceError> {
        let seq = insert_entry(&self.pool, game_id, entry).await?;
        Ok(StoredChatEntry {
            seq,
            game_id: game_id.to_string(),
            role: entry.role.as_str().to_string(),
            name: entry.name.clone(),
            content: entry.content.clone(),
        })
    }

    async fn list_entries(&self, game_id: &str) -> Result<Vec<StoredChatEntry>, PersistenceError> {
        let rows: Vec<ChatRow> = sqlx::query_as(
            "SELECT seq, game_id, role, name, content FROM chat_entries WHERE game_id = ? ORDER BY seq",
        )
        .bind(game_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(StoredChatEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::sqlite::game_repo::tests::sample_game;
    use crate::persistence::sqlite::Database;
    use crate::persistence::traits::GameRepository;

    #[tokio::test]
    async fn test_entries_keep_insertion_order() {
        let db = Database::new_in_memory().await.unwrap();
        let store = SqliteStore::new(&db);
        store
            .create_game(&sample_game("g1"), &[ConversationEntry::system("seed")])
            .await
            .unwrap();

        let a = store
            .append_entry("g1", &ConversationEntry::user("hello"))
            .await
            .unwrap();
        let b = store
            .append_entry("g1", &ConversationEntry::assistant("e2e4").with_name("get_next_move"))
            .await
            .unwrap();
        assert!(b.seq > a.seq);

        let entries = store.list_entries("g1").await.unwrap();
        let contents: Vec<&str> = entries.iter().map(|e| e.content.as_str()).collect();
        assert_eq!(contents, vec!["seed", "hello", "e2e4"]);
        assert_eq!(entries[2].name.as_deref(), Some("get_next_move"));
        assert_eq!(entries[2].role, "assistant");
    }

    #[tokio::test]
    async fn test_entry_for_unknown_game_fails() {
        let db = Database::new_in_memory().await.unwrap();
        let store = SqliteStore::new(&db);
        let result = store
            .append_entry("missing", &ConversationEntry::user("hi"))
            .await;
        assert!(matches!(result, Err(PersistenceError::Sqlx(_))));
    }
}
