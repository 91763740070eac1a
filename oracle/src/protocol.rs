//! Builds oracle requests from a game's conversation and position, and turns
//! replies back into move tokens.

use std::str::FromStr;

use chess::uci::parse_coordinate;
use chess::Position;
use lazy_static::lazy_static;
use regex::Regex;

use crate::conversation::ConversationEntry;
use crate::{FunctionSchema, Oracle, OracleError, OracleReply, OracleRequest};

pub const MOVE_FUNCTION: &str = "get_next_move";
pub const MOVE_FIELD: &str = "move";

lazy_static! {
    static ref MOVE_TOKEN_RE: Regex = Regex::new(r"(?i)\b([a-h][1-8][a-h][1-8][qrbn]?)\b").unwrap();
}

/// How the oracle is asked for a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuggestionMode {
    /// The reply is constrained by a function schema enumerating the legal moves.
    #[default]
    Enumerated,
    /// Unconstrained chat; a move is extracted from free text.
    Freeform,
}

impl SuggestionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Enumerated => "enumerated",
            Self::Freeform => "freeform",
        }
    }
}

impl FromStr for SuggestionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "enumerated" => Ok(Self::Enumerated),
            "freeform" => Ok(Self::Freeform),
            other => Err(format!("unknown suggestion mode: {other}")),
        }
    }
}

/// A parsed reply: a move token, or conversation to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suggestion {
    Move(String),
    Text(String),
}

/// Result of one suggestion round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionOutcome {
    pub suggestion: Suggestion,
    /// The raw reply, to be appended to the conversation whether or not a
    /// move was found.
    pub reply_entry: ConversationEntry,
}

/// Conversation plus two context entries: the game so far and the legal-move menu.
pub fn build_request(
    log: &[ConversationEntry],
    position: &Position,
    game_notation: &str,
    mode: SuggestionMode,
) -> OracleRequest {
    let legal = position.legal_move_tokens();
    let mover = position.side_to_move().title();

    let mut messages = log.to_vec();
    messages.push(ConversationEntry::system(format!(
        "The game so far:\n{}",
        game_notation.trim()
    )));
    messages.push(ConversationEntry::system(format!(
        "Legal moves for {mover}: {}. Reply with exactly one of them in coordinate notation.",
        legal.join(", ")
    )));

    let function = match mode {
        SuggestionMode::Enumerated => Some(FunctionSchema {
            name: MOVE_FUNCTION.to_string(),
            description: format!("Play the next move for {mover}"),
            field: MOVE_FIELD.to_string(),
            choices: Some(legal),
        }),
        SuggestionMode::Freeform => None,
    };

    OracleRequest { messages, function }
}

/// Strict coordinate parse first, then a single move-shaped token in free
/// text. Zero or several distinct candidates mean no move.
pub fn parse_reply(reply: &OracleReply) -> Suggestion {
    let text = reply.text().trim();

    if parse_coordinate(text).is_ok() {
        return Suggestion::Move(text.to_ascii_lowercase());
    }

    let mut candidates: Vec<String> = MOVE_TOKEN_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_ascii_lowercase())
        .collect();
    candidates.sort();
    candidates.dedup();

    match candidates.as_slice() {
        [token] => Suggestion::Move(token.clone()),
        _ => Suggestion::Text(text.to_string()),
    }
}

/// The assistant entry recording `reply` in the conversation.
pub fn reply_entry(reply: &OracleReply) -> ConversationEntry {
    match reply {
        OracleReply::PlainText(text) => ConversationEntry::assistant(text.clone()),
        OracleReply::StructuredField { value, .. } => {
            ConversationEntry::assistant(value.clone()).with_name(MOVE_FUNCTION)
        }
    }
}

/// Ask `oracle` for the next move. Never mutates the game; the caller commits
/// the suggested token and appends `reply_entry`.
pub async fn request_suggestion(
    oracle: &dyn Oracle,
    log: &[ConversationEntry],
    position: &Position,
    game_notation: &str,
    mode: SuggestionMode,
) -> Result<SuggestionOutcome, OracleError> {
    let request = build_request(log, position, game_notation, mode);
    let reply = oracle.complete(request).await?;
    let suggestion = parse_reply(&reply);
    match &suggestion {
        Suggestion::Move(token) => tracing::info!(%token, mode = mode.as_str(), "Oracle suggested a move"),
        Suggestion::Text(_) => tracing::info!(mode = mode.as_str(), "Oracle replied without a move"),
    }
    Ok(SuggestionOutcome {
        suggestion,
        reply_entry: reply_entry(&reply),
    })
}
