//! Terminal board for playing against a language-model oracle through the
//! chessgpt server.

pub mod board_state;
pub mod config;
pub mod controller;
pub mod events;
pub mod ui;

pub use board_state::{BoardStateError, ClientBoardState};
pub use controller::{BoardController, ControllerSettings};
