use serde::{Deserialize, Serialize};

/// All fields optional; the server fills in defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateGameRequest {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub white: Option<String>,
    #[serde(default)]
    pub black: Option<String>,
    #[serde(default)]
    pub round: Option<u32>,
    /// `YYYY.MM.DD`
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub fen: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameView {
    pub id: String,
    pub event: String,
    pub white: String,
    pub black: String,
    pub round: u32,
    pub date: String,
    /// `*`, `1-0`, `0-1` or `1/2-1/2`.
    pub result: String,
    pub start_fen: String,
    pub fen: String,
    pub pgn: String,
    pub side_to_move: String,
    /// Number of moves recorded; also the ply of the next move.
    pub ply: u32,
    pub legal_moves: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveView {
    pub ply: u32,
    pub color: String,
    /// SAN piece letter; empty for pawns.
    pub piece: String,
    pub capture: bool,
    pub source: String,
    pub destination: String,
    pub san: String,
    pub uci: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promotion: Option<String>,
    /// `+` or `#`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    /// `O-O` or `O-O-O`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub castle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub fen_before: String,
    pub fen_after: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitMoveRequest {
    pub token: String,
    /// Ply the client believes this move will occupy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_ply: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitMoveResponse {
    #[serde(rename = "move")]
    pub mv: MoveView,
    pub game: GameView,
    /// True when the move had already been recorded and nothing was appended.
    #[serde(default)]
    pub replayed: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionRequest {
    /// `enumerated` or `freeform`; server default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SuggestionView {
    Move { token: String },
    Text { text: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionResponse {
    /// Ply the suggestion was computed for.
    pub for_ply: u32,
    pub suggestion: SuggestionView,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoResponse {
    pub removed: MoveView,
    pub game: GameView,
}
