//! SQLite-backed game rows, and the multi-table move/undo transactions.

use oracle::ConversationEntry;
use sqlx::{Executor, Sqlite};

use super::chat_repo::insert_entry;
use super::move_repo::insert_move;
use super::SqliteStore;
use crate::persistence::traits::GameRepository;
use crate::persistence::{GameData, PersistenceError, StoredMove};

#[derive(sqlx::FromRow)]
struct GameRow {
    id: String,
    event: String,
    site: String,
    white: String,
    black: String,
    round: i64,
    date: String,
    result: String,
    start_fen: String,
    fen: String,
    pgn: String,
    created_at: i64,
    updated_at: i64,
}

impl From<GameRow> for GameData {
    fn from(r: GameRow) -> Self {
        Self {
            id: r.id,
            event: r.event,
            site: r.site,
            white: r.white,
            black: r.black,
            round: r.round as u32,
            date: r.date,
            result: r.result,
            start_fen: r.start_fen,
            fen: r.fen,
            pgn: r.pgn,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

/// Write the mutable columns of `game`. Fails with `NotFound` when no row matched.
async fn update_game<'e, E>(executor: E, game: &GameData) -> Result<(), PersistenceError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"
        UPDATE games
        SET result = ?, fen = ?, pgn = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&game.result)
    .bind(&game.fen)
    .bind(&game.pgn)
    .bind(game.updated_at)
    .bind(&game.id)
    .execute(executor)
    .await?;

    if result.rows_affected() == 0 {
        return Err(PersistenceError::NotFound(game.id.clone()));
    }
    Ok(())
}

impl GameRepository for SqliteStore {
    async fn create_game(
        &self,
        game: &GameData,
        seed: &[ConversationEntry],
    ) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO games
                (id, event, site, white, black, round, date, result,
                 start_fen, fen, pgn, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&game.id)
        .bind(&game.event)
        .bind(&game.site)
        .bind(&game.white)
        .bind(&game.black)
        .bind(game.round as i64)
        .bind(&game.date)
        .bind(&game.result)
        .bind(&game.start_fen)
        .bind(&game.fen)
        .bind(&game.pgn)
        .bind(game.created_at)
        .bind(game.updated_at)
        .execute(&mut *tx)
        .await?;

        for entry in seed {
            insert_entry(&mut *tx, &game.id, entry).await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn load_game(&self, id: &str) -> Result<Option<GameData>, PersistenceError> {
        let row: Option<GameRow> = sqlx::query_as(
            r#"
            SELECT id, event, site, white, black, round, date, result,
                   start_fen, fen, pgn, created_at, updated_at
            FROM games
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(GameData::from))
    }

    async fn list_games(&self) -> Result<Vec<GameData>, PersistenceError> {
        let rows: Vec<GameRow> = sqlx::query_as(
            r#"
            SELECT id, event, site, white, black, round, date, result,
                   start_fen, fen, pgn, created_at, updated_at
            FROM games
            ORDER BY updated_at DESC, created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(GameData::from).collect())
    }

    async fn record_move(
        &self,
        game: &GameData,
        mv: &StoredMove,
        entry: &ConversationEntry,
    ) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;
        insert_move(&mut *tx, mv).await?;
        update_game(&mut *tx, game).await?;
        insert_entry(&mut *tx, &game.id, entry).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn record_undo(
        &self,
        game: &GameData,
        ply: u32,
        entry: &ConversationEntry,
    ) -> Result<(), PersistenceError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM moves WHERE game_id = ? AND ply = ?")
            .bind(&game.id)
            .bind(ply as i64)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(PersistenceError::NotFound(format!("{} ply {ply}", game.id)));
        }

        update_game(&mut *tx, game).await?;
        insert_entry(&mut *tx, &game.id, entry).await?;
        tx.commit().await?;
        Ok(())
    }
}
