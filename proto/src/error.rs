use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    InvalidSyntax,
    IllegalMove,
    AmbiguousMove,
    GameOver,
    StaleMove,
    NothingToUndo,
    NotFound,
    OracleUnavailable,
    BadRequest,
    Internal,
}

impl ErrorCode {
    /// Rules errors: the same actor should try again with a different move.
    pub fn is_rules_error(self) -> bool {
        matches!(self, Self::InvalidSyntax | Self::IllegalMove | Self::AmbiguousMove)
    }

    /// Transport-level failures worth retrying unchanged.
    pub fn is_retryable(self) -> bool {
        matches!(self, Self::OracleUnavailable | Self::Internal)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
    /// Present on `IllegalMove` so the caller can re-prompt with the menu.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_moves: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_shape() {
        let body = ErrorBody {
            code: ErrorCode::IllegalMove,
            message: "Illegal move: e2e5".into(),
            legal_moves: Some(vec!["e2e4".into()]),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["code"], "IllegalMove");
        assert_eq!(json["legal_moves"][0], "e2e4");

        let bare: ErrorBody =
            serde_json::from_str(r#"{"code":"GameOver","message":"game is over"}"#).unwrap();
        assert_eq!(bare.code, ErrorCode::GameOver);
        assert!(bare.legal_moves.is_none());
    }
}
