//! SQLite-backed move list.

use sqlx::{Executor, Sqlite};

use super::SqliteStore;
use crate::persistence::traits::MoveRepository;
use crate::persistence::{PersistenceError, StoredMove};

const MOVE_COLUMNS: &str = "game_id, ply, color, piece, capture, source, destination, san, uci, \
     promotion, check_marker, castle, comment, fen_before, fen_after, created_at";

#[derive(sqlx::FromRow)]
struct MoveRow {
    game_id: String,
    ply: i64,
    color: String,
    piece: String,
    capture: bool,
    source: String,
    destination: String,
    san: String,
    uci: String,
    promotion: Option<String>,
    check_marker: Option<String>,
    castle: Option<String>,
    comment: Option<String>,
    fen_before: String,
    fen_after: String,
    created_at: i64,
}

impl From<MoveRow> for StoredMove {
    fn from(r: MoveRow) -> Self {
        Self {
            game_id: r.game_id,
            ply: r.ply as u32,
            color: r.color,
            piece: r.piece,
            capture: r.capture,
            source: r.source,
            destination: r.destination,
            san: r.san,
            uci: r.uci,
            promotion: r.promotion,
            check_marker: r.check_marker,
            castle: r.castle,
            comment: r.comment,
            fen_before: r.fen_before,
            fen_after: r.fen_after,
            created_at: r.created_at,
        }
    }
}

pub(super) async fn insert_move<'e, E>(executor: E, mv: &StoredMove) -> Result<(), PersistenceError>
where
    E: Executor<'e, Database = Sqlite>,
{
    let sql = format!(
        "INSERT INTO moves ({MOVE_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    );
    sqlx::query(&sql)
        .bind(&mv.game_id)
        .bind(mv.ply as i64)
        .bind(&mv.color)
        .bind(&mv.piece)
        .bind(mv.capture)
        .bind(&mv.source)
        .bind(&mv.destination)
        .bind(&mv.san)
        .bind(&mv.uci)
        .bind(&mv.promotion)
        .bind(&mv.check_marker)
        .bind(&mv.castle)
        .bind(&mv.comment)
        .bind(&mv.fen_before)
        .bind(&mv.fen_after)
        .bind(mv.created_at)
        .execute(executor)
        .await?;
    Ok(())
}

impl MoveRepository for SqliteStore {
    async fn list_moves(&self, game_id: &str) -> Result<Vec<StoredMove>, PersistenceError> {
        let sql = format!("SELECT {MOVE_COLUMNS} FROM moves WHERE game_id = ? ORDER BY ply");
        let rows: Vec<MoveRow> = sqlx::query_as(&sql)
            .bind(game_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(StoredMove::from).collect())
    }

    async fn load_move(
        &self,
        game_id: &str,
        ply: u32,
    ) -> Result<Option<StoredMove>, PersistenceError> {
        let sql = format!("SELECT {MOVE_COLUMNS} FROM moves WHERE game_id = ? AND ply = ?");
        let row: Option<MoveRow> = sqlx::query_as(&sql)
            .bind(game_id)
            .bind(ply as i64)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(StoredMove::from))
    }
}
