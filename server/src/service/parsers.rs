//! Wire request → domain parsing.

use chess_proto::AppendChatRequest;
use oracle::{ChatRole, ConversationEntry, SuggestionMode};

use crate::game::GameError;

/// Requested mode, or `default` when none was given.
pub fn parse_mode(mode: Option<&str>, default: SuggestionMode) -> Result<SuggestionMode, GameError> {
    match mode {
        None => Ok(default),
        Some(m) => m.parse().map_err(GameError::BadRequest),
    }
}

pub fn parse_chat_request(req: AppendChatRequest) -> Result<ConversationEntry, GameError> {
    let role: ChatRole = req.role.parse().map_err(GameError::BadRequest)?;
    if req.content.trim().is_empty() {
        return Err(GameError::BadRequest("Chat content is empty".into()));
    }
    let entry = ConversationEntry::new(role, req.content);
    Ok(match req.name.filter(|n| !n.trim().is_empty()) {
        Some(name) => entry.with_name(name),
        None => entry,
    })
}

pub fn parse_token(token: &str) -> Result<String, GameError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(GameError::BadRequest("Move token is required".into()));
    }
    Ok(token.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!(
            parse_mode(None, SuggestionMode::Freeform).unwrap(),
            SuggestionMode::Freeform
        );
        assert_eq!(
            parse_mode(Some("enumerated"), SuggestionMode::Freeform).unwrap(),
            SuggestionMode::Enumerated
        );
        assert!(matches!(
            parse_mode(Some("loud"), SuggestionMode::Freeform),
            Err(GameError::BadRequest(_))
        ));
    }

    #[test]
    fn test_parse_chat_request() {
        let entry = parse_chat_request(AppendChatRequest {
            role: "user".into(),
            content: "What about the queen?".into(),
            name: None,
        })
        .unwrap();
        assert_eq!(entry.role, ChatRole::User);

        assert!(parse_chat_request(AppendChatRequest {
            role: "narrator".into(),
            content: "hi".into(),
            name: None,
        })
        .is_err());
        assert!(parse_chat_request(AppendChatRequest {
            role: "user".into(),
            content: "  ".into(),
            name: None,
        })
        .is_err());
    }
}
