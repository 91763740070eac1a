//! Authoritative per-game state: the stored row plus a live position kept in
//! lockstep with it.

use chess::pgn::{parse_pgn, write_pgn, PgnTags};
use chess::{Outcome, Position, STARTING_FEN};
use chess_proto::CreateGameRequest;

use super::GameError;
use crate::persistence::{GameData, PersistenceError};

pub const DEFAULT_EVENT: &str = "Casual Game";
pub const DEFAULT_SITE: &str = "?";

#[derive(Debug, Clone)]
pub struct GameRecord {
    data: GameData,
    position: Position,
}

impl GameRecord {
    /// A fresh game built from an optional request. `today` is `YYYY.MM.DD`.
    pub fn create(
        id: String,
        req: &CreateGameRequest,
        today: &str,
        now: i64,
    ) -> Result<Self, GameError> {
        let start_fen = req.fen.as_deref().unwrap_or(STARTING_FEN);
        let position =
            Position::from_fen(start_fen).map_err(|e| GameError::BadRequest(e.to_string()))?;

        let mut data = GameData {
            id,
            event: non_empty(&req.event).unwrap_or(DEFAULT_EVENT).to_string(),
            site: DEFAULT_SITE.to_string(),
            white: non_empty(&req.white).unwrap_or("White").to_string(),
            black: non_empty(&req.black).unwrap_or("Black").to_string(),
            round: req.round.unwrap_or(1),
            date: non_empty(&req.date).unwrap_or(today).to_string(),
            result: Outcome::InProgress.as_str().to_string(),
            start_fen: position.start_fen().to_string(),
            fen: position.to_fen(),
            pgn: String::new(),
            created_at: now,
            updated_at: now,
        };
        data.pgn = write_pgn(&tags_of(&data), &position, Outcome::InProgress);

        Ok(Self { data, position })
    }

    /// Rebuild from a stored row by replaying its game notation. The replay
    /// must land on the stored position notation.
    pub fn from_data(data: GameData) -> Result<Self, PersistenceError> {
        let corrupt = |msg: String| PersistenceError::Corrupt(format!("{}: {msg}", data.id));

        let game = parse_pgn(&data.pgn).map_err(|e| corrupt(e.to_string()))?;
        let position = game.replay().map_err(|e| corrupt(e.to_string()))?;

        if position.to_fen() != data.fen {
            return Err(corrupt(format!(
                "replayed position {} differs from stored {}",
                position.to_fen(),
                data.fen
            )));
        }
        if Outcome::parse(&data.result).is_none() {
            return Err(corrupt(format!("unknown result {}", data.result)));
        }

        Ok(Self { data, position })
    }

    pub fn id(&self) -> &str {
        &self.data.id
    }

    pub fn data(&self) -> &GameData {
        &self.data
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn outcome(&self) -> Outcome {
        Outcome::parse(&self.data.result).unwrap_or(Outcome::InProgress)
    }

    pub fn ply(&self) -> u32 {
        self.position.ply()
    }

    /// Replace the position, setting `result` and refreshing every derived column.
    pub(super) fn advance(&mut self, position: Position, result: Outcome, now: i64) {
        self.position = position;
        self.data.result = result.as_str().to_string();
        self.data.fen = self.position.to_fen();
        self.data.pgn = write_pgn(&tags_of(&self.data), &self.position, result);
        self.data.updated_at = now;
    }
}

fn tags_of(data: &GameData) -> PgnTags {
    PgnTags {
        event: data.event.clone(),
        site: data.site.clone(),
        date: data.date.clone(),
        round: data.round.to_string(),
        white: data.white.clone(),
        black: data.black.clone(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_defaults() {
        let record =
            GameRecord::create("g1".into(), &CreateGameRequest::default(), "2024.03.01", 5).unwrap();
        let data = record.data();
        assert_eq!(data.event, "Casual Game");
        assert_eq!(data.white, "White");
        assert_eq!(data.black, "Black");
        assert_eq!(data.round, 1);
        assert_eq!(data.date, "2024.03.01");
        assert_eq!(data.result, "*");
        assert_eq!(data.fen, STARTING_FEN);
        assert!(data.pgn.contains("[Date \"2024.03.01\"]"));
        assert_eq!(record.ply(), 0);
    }

    #[test]
    fn test_create_rejects_bad_fen() {
        let req = CreateGameRequest {
            fen: Some("not a fen".into()),
            ..Default::default()
        };
        assert!(matches!(
            GameRecord::create("g1".into(), &req, "2024.03.01", 5),
            Err(GameError::BadRequest(_))
        ));
    }

    #[test]
    fn test_from_data_round_trip_with_custom_start() {
        let req = CreateGameRequest {
            white: Some("Alice".into()),
            fen: Some("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1".into()),
            ..Default::default()
        };
        let record = GameRecord::create("g1".into(), &req, "2024.03.01", 5).unwrap();
        let restored = GameRecord::from_data(record.data().clone()).unwrap();
        assert_eq!(restored.position().to_fen(), record.position().to_fen());
        assert_eq!(restored.data().white, "Alice");
    }

    #[test]
    fn test_from_data_detects_drift() {
        let record =
            GameRecord::create("g1".into(), &CreateGameRequest::default(), "2024.03.01", 5).unwrap();
        let mut data = record.data().clone();
        data.fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1".into();
        assert!(matches!(
            GameRecord::from_data(data),
            Err(PersistenceError::Corrupt(_))
        ));
    }
}
