use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::fen::STARTING_FEN;
use crate::position::{MoveError, Position};
use crate::termination::Outcome;

lazy_static! {
    static ref TAG_RE: Regex = Regex::new(r#"^\[\s*([A-Za-z0-9_]+)\s+"((?:[^"\\]|\\.)*)"\s*\]$"#).unwrap();
    static ref MOVE_NUMBER_RE: Regex = Regex::new(r"^\d+\.+(.*)$").unwrap();
}

/// A parsed PGN game. Comments, variations and NAGs are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PgnGame {
    pub tags: BTreeMap<String, String>,
    pub moves: Vec<String>,
    pub result: Outcome,
}

impl PgnGame {
    /// Starting FEN named by the `FEN` tag, or the standard start.
    pub fn start_fen(&self) -> &str {
        self.tags.get("FEN").map(String::as_str).unwrap_or(STARTING_FEN)
    }

    /// Rebuild a position with full move history.
    pub fn replay(&self) -> Result<Position, PgnError> {
        let mut position =
            Position::from_fen(self.start_fen()).map_err(|e| PgnError::InvalidTag(e.to_string()))?;
        for (index, san) in self.moves.iter().enumerate() {
            position
                .apply(san)
                .map_err(|source| PgnError::Move { index, source })?;
        }
        Ok(position)
    }
}

/// Parse a single PGN game.
pub fn parse_pgn(input: &str) -> Result<PgnGame, PgnError> {
    let mut tags = BTreeMap::new();
    let mut movetext = String::new();

    for line in input.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('[') && movetext.trim().is_empty() {
            let caps = TAG_RE
                .captures(trimmed)
                .ok_or_else(|| PgnError::InvalidTag(trimmed.to_string()))?;
            let value = caps[2].replace("\\\"", "\"").replace("\\\\", "\\");
            tags.insert(caps[1].to_string(), value);
        } else if !trimmed.starts_with('%') {
            movetext.push_str(line);
            movetext.push('\n');
        }
    }

    let mut moves = Vec::new();
    let mut result = None;
    for token in tokenize(&movetext)? {
        if let Some(outcome) = Outcome::parse(&token) {
            result = Some(outcome);
            break;
        }
        let token = match MOVE_NUMBER_RE.captures(&token) {
            Some(caps) => caps[1].to_string(),
            None => token,
        };
        if !token.is_empty() {
            moves.push(token);
        }
    }

    let result = result
        .or_else(|| tags.get("Result").and_then(|r| Outcome::parse(r)))
        .unwrap_or(Outcome::InProgress);

    Ok(PgnGame {
        tags,
        moves,
        result,
    })
}

/// Split movetext into tokens, skipping `{}` and `;` comments, `()` variations
/// and `$n` glyphs.
fn tokenize(movetext: &str) -> Result<Vec<String>, PgnError> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = movetext.chars();
    let mut variation_depth = 0usize;

    fn flush(current: &mut String, tokens: &mut Vec<String>) {
        if !current.is_empty() {
            tokens.push(std::mem::take(current));
        }
    }

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                flush(&mut current, &mut tokens);
                if !chars.by_ref().any(|c| c == '}') {
                    return Err(PgnError::InvalidFormat("unterminated comment".into()));
                }
            }
            ';' => {
                flush(&mut current, &mut tokens);
                let _ = chars.by_ref().any(|c| c == '\n');
            }
            '(' => {
                flush(&mut current, &mut tokens);
                variation_depth += 1;
            }
            ')' => {
                flush(&mut current, &mut tokens);
                variation_depth = variation_depth
                    .checked_sub(1)
                    .ok_or_else(|| PgnError::InvalidFormat("unbalanced ')'".into()))?;
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            _ if variation_depth > 0 => {}
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);

    if variation_depth > 0 {
        return Err(PgnError::InvalidFormat("unterminated variation".into()));
    }
    Ok(tokens.into_iter().filter(|t| !t.starts_with('$')).collect())
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PgnError {
    #[error("Invalid PGN format: {0}")]
    InvalidFormat(String),
    #[error("Invalid tag: {0}")]
    InvalidTag(String),
    #[error("move {index}: {source}")]
    Move { index: usize, source: MoveError },
}
