//! Role-tagged conversation entries replayed to the oracle.

use std::str::FromStr;

use chess::PieceColor;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a chess master.";
pub const MOVE_INSTRUCTION: &str = "Return a single move in chess notation.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
    Function,
}

impl ChatRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Function => "function",
        }
    }
}

impl FromStr for ChatRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "system" => Ok(Self::System),
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "function" => Ok(Self::Function),
            other => Err(format!("unknown chat role: {other}")),
        }
    }
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One message in a game's conversation. Insertion order is the only ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    pub role: ChatRole,
    /// Function name for `function` entries and structured assistant replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub content: String,
}

impl ConversationEntry {
    pub fn new(role: ChatRole, content: impl Into<String>) -> Self {
        Self {
            role,
            name: None,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(ChatRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(ChatRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(ChatRole::Assistant, content)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Entry recorded after a move is committed, e.g. `white: e2e4`.
    pub fn move_played(color: PieceColor, token: &str) -> Self {
        Self::user(format!("{}: {}", color.as_str(), token))
    }

    /// Entry recorded after a takeback.
    pub fn takeback(token: &str) -> Self {
        Self::user(format!("takeback {token}"))
    }
}

/// Opening messages for a new game.
pub fn seed_entries(system_prompt: &str, first_mover: PieceColor) -> Vec<ConversationEntry> {
    vec![
        ConversationEntry::system(system_prompt),
        ConversationEntry::user(format!("{}, what's your first move?", first_mover.title())),
        ConversationEntry::assistant(MOVE_INSTRUCTION),
    ]
}
