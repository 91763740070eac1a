//! HTTP service with modular organization
//!
//! - converters: domain → wire conversions
//! - parsers: wire → domain parsing
//! - error: `GameError` → status code and `ErrorBody`
//! - endpoints: handlers grouped by resource

mod converters;
mod error;
mod parsers;

pub mod endpoints;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use crate::persistence::GameStore;
use crate::session::GameManager;
use endpoints::{chat, game, moves};
pub use error::ApiError;

/// Build the router for every game route.
pub fn router<S: GameStore>(manager: Arc<GameManager<S>>) -> Router {
    Router::new()
        .route("/games", post(game::create_game::<S>).get(game::list_games::<S>))
        .route("/games/{id}", get(game::get_game::<S>))
        .route(
            "/games/{id}/moves",
            post(moves::submit_move::<S>).get(moves::list_moves::<S>),
        )
        .route("/games/{id}/undo", post(moves::undo::<S>))
        .route("/games/{id}/suggestion", post(chat::request_suggestion::<S>))
        .route(
            "/games/{id}/chat",
            get(chat::list_chat::<S>).post(chat::append_chat::<S>),
        )
        .with_state(manager)
}
