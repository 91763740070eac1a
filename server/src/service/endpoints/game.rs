//! Game creation and lookup endpoints

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chess_proto::{CreateGameRequest, GameView};

use crate::persistence::GameStore;
use crate::service::converters::convert_snapshot;
use crate::service::ApiError;
use crate::session::GameManager;

pub async fn create_game<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<GameView>), ApiError> {
    let Json(req) = payload?;
    tracing::info!(event = ?req.event, fen = ?req.fen, "POST /games");
    let snapshot = manager.create_game(&req).await?;
    Ok((StatusCode::CREATED, Json(convert_snapshot(&snapshot))))
}

pub async fn list_games<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
) -> Result<Json<Vec<GameView>>, ApiError> {
    let games = manager.list_games().await?;
    Ok(Json(games.iter().map(convert_snapshot).collect()))
}

pub async fn get_game<S: GameStore>(
    State(manager): State<Arc<GameManager<S>>>,
    Path(id): Path<String>,
) -> Result<Json<GameView>, ApiError> {
    let snapshot = manager.handle(&id).await?.get_snapshot().await?;
    Ok(Json(convert_snapshot(&snapshot)))
}
