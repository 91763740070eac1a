//! Conversation and suggestion endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chess_proto::{AppendChatRequest, ChatEntryView, SuggestionRequest, SuggestionResponse};

use crate::persistence::GameStore;
use crate::service::converters::{convert_chat_entry, convert_suggestion};
use crate::service::parsers::{parse_chat_request, parse_mode};
use crate::service::ApiError;
use crate::session::GameManager;

pub async fn list_chat<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<ChatEntryView>>, ApiError> {
    let entries = manager.chat(&id).await?;
    Ok(Json(entries.iter().map(convert_chat_entry).collect()))
}

pub async fn append_chat<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<AppendChatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ChatEntryView>), ApiError> {
    let Json(req) = payload?;
    let entry = parse_chat_request(req)?;
    tracing::debug!(game_id = %id, role = %entry.role, "POST /chat");

    let stored = manager.handle(&id).await?.append_chat(entry).await?;
    Ok((StatusCode::CREATED, Json(convert_chat_entry(&stored))))
}

pub async fn request_suggestion<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
    Path(id): Path<String>,
    payload: Option<Json<SuggestionRequest>>,
) -> Result<Json<SuggestionResponse>, ApiError> {
    let req = payload.map(|Json(r)| r).unwrap_or_default();
    let mode = parse_mode(req.mode.as_deref(), manager.settings().suggestion_mode)?;
    tracing::info!(game_id = %id, mode = mode.as_str(), "POST /suggestion");

    let reply = manager.handle(&id).await?.request_suggestion(mode).await?;
    Ok(Json(convert_suggestion(reply)))
}
