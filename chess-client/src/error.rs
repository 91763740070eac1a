//! Error types for the chess client

use chess_proto::ErrorCode;
use thiserror::Error;

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    /// The server could not be reached or did not answer in time.
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with an error body.
    #[error("{code}: {message}")]
    Rejected {
        code: ErrorCode,
        message: String,
        legal_moves: Vec<String>,
    },

    #[error("Server returned invalid data: {0}")]
    Decode(String),

    #[error("Mock response not configured for: {0}")]
    NotConfigured(String),
}

impl ClientError {
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Rejected { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Transport failures worth offering a retry for.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Rejected { code, .. } => code.is_retryable(),
            _ => false,
        }
    }

    /// The move was refused on chess grounds; the same actor should try again.
    pub fn is_rules_error(&self) -> bool {
        self.code().is_some_and(ErrorCode::is_rules_error)
    }
}
