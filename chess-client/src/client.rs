//! HTTP client for the chessgpt server.

use std::time::Duration;

use async_trait::async_trait;
use chess_proto::{
    AppendChatRequest, ChatEntryView, CreateGameRequest, ErrorBody, GameView, MoveView,
    SubmitMoveRequest, SubmitMoveResponse, SuggestionRequest, SuggestionResponse, UndoResponse,
};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{ClientError, ClientResult};
use crate::traits::ChessService;

pub struct HttpChessClient {
    base_url: String,
    http: reqwest::Client,
}

impl HttpChessClient {
    /// Client for the server at `base_url`; every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> ClientResult<Self> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ClientError::InvalidAddress(base_url));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Network(e.to_string()))?;
        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Network("request timed out".to_string())
            } else {
                ClientError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(%status, %body, "Server returned an error");
            return Err(error_from_response(status, &body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

/// Map a non-success response to a client error. Bodies that are not an
/// [`ErrorBody`] are reported as transport failures when the status is a
/// server error.
pub(crate) fn error_from_response(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(err) => ClientError::Rejected {
            code: err.code,
            message: err.message,
            legal_moves: err.legal_moves.unwrap_or_default(),
        },
        Err(_) if status.is_server_error() => ClientError::Network(format!("HTTP {status}: {body}")),
        Err(e) => ClientError::Decode(format!("HTTP {status}: {e}")),
    }
}

#[async_trait]
impl ChessService for HttpChessClient {
    async fn create_game(&self, req: &CreateGameRequest) -> ClientResult<GameView> {
        self.send(self.http.post(self.url("/games")).json(req)).await
    }

    async fn get_game(&self, game_id: &str) -> ClientResult<GameView> {
        self.send(self.http.get(self.url(&format!("/games/{game_id}"))))
            .await
    }

    async fn list_games(&self) -> ClientResult<Vec<GameView>> {
        self.send(self.http.get(self.url("/games"))).await
    }

    async fn submit_move(
        &self,
        game_id: &str,
        req: &SubmitMoveRequest,
    ) -> ClientResult<SubmitMoveResponse> {
        tracing::debug!(%game_id, token = %req.token, "submit_move");
        self.send(
            self.http
                .post(self.url(&format!("/games/{game_id}/moves")))
                .json(req),
        )
        .await
    }

    async fn undo(&self, game_id: &str) -> ClientResult<UndoResponse> {
        self.send(self.http.post(self.url(&format!("/games/{game_id}/undo"))))
            .await
    }

    async fn request_suggestion(
        &self,
        game_id: &str,
        mode: Option<String>,
    ) -> ClientResult<SuggestionResponse> {
        self.send(
            self.http
                .post(self.url(&format!("/games/{game_id}/suggestion")))
                .json(&SuggestionRequest { mode }),
        )
        .await
    }

    async fn get_moves(&self, game_id: &str) -> ClientResult<Vec<MoveView>> {
        self.send(self.http.get(self.url(&format!("/games/{game_id}/moves"))))
            .await
    }

    async fn get_chat(&self, game_id: &str) -> ClientResult<Vec<ChatEntryView>> {
        self.send(self.http.get(self.url(&format!("/games/{game_id}/chat"))))
            .await
    }

    async fn append_chat(
        &self,
        game_id: &str,
        req: &AppendChatRequest,
    ) -> ClientResult<ChatEntryView> {
        self.send(
            self.http
                .post(self.url(&format!("/games/{game_id}/chat")))
                .json(req),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chess_proto::ErrorCode;

    #[test]
    fn test_rejects_bad_address() {
        assert!(matches!(
            HttpChessClient::new("localhost:8000", Duration::from_secs(1)),
            Err(ClientError::InvalidAddress(_))
        ));
        let client = HttpChessClient::new("http://localhost:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
        assert_eq!(client.url("/games"), "http://localhost:8000/games");
    }

    #[test]
    fn test_error_body_becomes_rejection() {
        let body = r#"{"code":"IllegalMove","message":"Illegal move: e2e5","legal_moves":["e2e4"]}"#;
        let err = error_from_response(StatusCode::UNPROCESSABLE_ENTITY, body);
        assert_eq!(
            err,
            ClientError::Rejected {
                code: ErrorCode::IllegalMove,
                message: "Illegal move: e2e5".into(),
                legal_moves: vec!["e2e4".into()],
            }
        );
        assert!(err.is_rules_error());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_unstructured_errors() {
        let err = error_from_response(StatusCode::BAD_GATEWAY, "upstream down");
        assert!(matches!(err, ClientError::Network(_)));
        assert!(err.is_retryable());

        let err = error_from_response(StatusCode::BAD_REQUEST, "nope");
        assert!(matches!(err, ClientError::Decode(_)));
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        // Port 9 (discard) is not expected to serve HTTP.
        let client = HttpChessClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.list_games().await.unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
    }
}
