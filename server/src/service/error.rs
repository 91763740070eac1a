//! HTTP mapping for [`GameError`].

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chess::MoveError;
use chess_proto::{ErrorBody, ErrorCode};

use crate::game::GameError;
use crate::persistence::PersistenceError;

pub struct ApiError(pub GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(GameError::BadRequest(rejection.body_text()))
    }
}

impl ApiError {
    fn parts(&self) -> (StatusCode, ErrorCode, Option<Vec<String>>) {
        match &self.0 {
            GameError::Rejected { error, legal_moves } => {
                let code = match error {
                    MoveError::InvalidSyntax(_) => ErrorCode::InvalidSyntax,
                    MoveError::IllegalMove(_) => ErrorCode::IllegalMove,
                    MoveError::AmbiguousMove(_) => ErrorCode::AmbiguousMove,
                };
                (StatusCode::UNPROCESSABLE_ENTITY, code, Some(legal_moves.clone()))
            }
            GameError::GameOver(_) => (StatusCode::CONFLICT, ErrorCode::GameOver, None),
            GameError::StaleMove { .. } => (StatusCode::CONFLICT, ErrorCode::StaleMove, None),
            GameError::NothingToUndo => (StatusCode::CONFLICT, ErrorCode::NothingToUndo, None),
            GameError::NotFound(_) | GameError::Persistence(PersistenceError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, ErrorCode::NotFound, None)
            }
            GameError::BadRequest(_) => (StatusCode::BAD_REQUEST, ErrorCode::BadRequest, None),
            GameError::Oracle(e) if e.is_timeout() => {
                (StatusCode::GATEWAY_TIMEOUT, ErrorCode::OracleUnavailable, None)
            }
            GameError::Oracle(_) => (StatusCode::BAD_GATEWAY, ErrorCode::OracleUnavailable, None),
            GameError::Persistence(_) | GameError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::Internal, None)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, legal_moves) = self.parts();
        if status.is_server_error() {
            tracing::error!(%code, error = %self.0, "Request failed");
        } else {
            tracing::debug!(%code, error = %self.0, "Request rejected");
        }
        let body = ErrorBody {
            code,
            message: self.0.to_string(),
            legal_moves,
        };
        (status, Json(body)).into_response()
    }
}
