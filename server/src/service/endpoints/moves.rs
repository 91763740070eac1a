//! Move submission, history and takeback endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use chess_proto::{MoveView, SubmitMoveRequest, SubmitMoveResponse, UndoResponse};

use crate::persistence::GameStore;
use crate::service::converters::{convert_move, convert_move_outcome, convert_undo_outcome};
use crate::service::parsers::parse_token;
use crate::service::ApiError;
use crate::session::GameManager;

pub async fn submit_move<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
    Path(id): Path<String>,
    payload: Result<Json<SubmitMoveRequest>, JsonRejection>,
) -> Result<Json<SubmitMoveResponse>, ApiError> {
    let Json(req) = payload?;
    let token = parse_token(&req.token)?;
    tracing::info!(game_id = %id, %token, expected_ply = ?req.expected_ply, "POST /moves");

    let outcome = manager
        .handle(&id)
        .await?
        .submit_move(token, req.expected_ply)
        .await?;
    Ok(Json(convert_move_outcome(&outcome)))
}

pub async fn list_moves<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<MoveView>>, ApiError> {
    let moves = manager.moves(&id).await?;
    Ok(Json(moves.iter().map(convert_move).collect()))
}

pub async fn undo<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
    Path(id): Path<String>,
) -> Result<Json<UndoResponse>, ApiError> {
    tracing::info!(game_id = %id, "POST /undo");
    let outcome = manager.handle(&id).await?.undo().await?;
    Ok(Json(convert_undo_outcome(&outcome)))
}
