use chess::PieceColor;

use crate::game::GameRecord;
use crate::persistence::GameData;

/// Point-in-time copy of a game for callers outside the actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub data: GameData,
    pub side_to_move: PieceColor,
    pub ply: u32,
    /// Empty once the game has a result.
    pub legal_moves: Vec<String>,
}

impl From<&GameRecord> for GameSnapshot {
    fn from(record: &GameRecord) -> Self {
        let position = record.position();
        let legal_moves = if record.outcome().is_terminal() {
            Vec::new()
        } else {
            position.legal_move_tokens()
        };
        Self {
            data: record.data().clone(),
            side_to_move: position.side_to_move(),
            ply: position.ply(),
            legal_moves,
        }
    }
}
