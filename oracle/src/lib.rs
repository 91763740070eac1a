//! Move-suggestion oracle: the collaborator interface, the conversation model
//! replayed to it, and the protocol that turns its replies into moves.

pub mod conversation;
pub mod openai;
pub mod protocol;
#[cfg(any(test, feature = "mock"))]
pub mod scripted;

pub use conversation::{ChatRole, ConversationEntry};
pub use openai::{ChatCompletionsOracle, OracleConfig};
pub use protocol::{Suggestion, SuggestionMode, SuggestionOutcome};
#[cfg(any(test, feature = "mock"))]
pub use scripted::ScriptedOracle;

use async_trait::async_trait;

/// Schema constraining the oracle's reply to one string field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionSchema {
    pub name: String,
    pub description: String,
    pub field: String,
    /// Allowed values for `field`, if enumerated.
    pub choices: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleRequest {
    pub messages: Vec<ConversationEntry>,
    pub function: Option<FunctionSchema>,
}

/// What the oracle answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleReply {
    PlainText(String),
    StructuredField { name: String, value: String },
}

impl OracleReply {
    pub fn text(&self) -> &str {
        match self {
            Self::PlainText(text) => text,
            Self::StructuredField { value, .. } => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
    #[error("Oracle timed out")]
    Timeout,
    #[error("Oracle returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("Could not decode oracle reply: {0}")]
    Decode(String),
}

impl OracleError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }
}

/// A stateless text-in/text-out move suggester. All continuity comes from
/// the messages in each request.
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(&self, request: OracleRequest) -> Result<OracleReply, OracleError>;
}
