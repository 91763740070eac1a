//! Command line and environment configuration for the terminal client.

use std::path::PathBuf;
use std::time::Duration;

use chess::PieceColor;
use chess_client::CreateGameRequest;
use clap::{Parser, ValueEnum};

use crate::controller::{ControllerSettings, DEFAULT_ORACLE_RETRIES};

const DEFAULT_LOG_DIR: &str = "logs";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlayAs {
    White,
    Black,
    /// Both sides at one keyboard; the oracle only answers chat.
    Both,
}

#[derive(Debug, Clone, Parser)]
#[command(name = "chessgpt", version, about = "Play chess against a language-model oracle")]
pub struct Cli {
    /// Base URL of the chessgpt server
    #[arg(long, env = "CHESSGPT_SERVER_URL", default_value = "http://127.0.0.1:8000")]
    pub server: String,

    /// Side you play; the oracle takes the other one
    #[arg(long, value_enum, default_value_t = PlayAs::White)]
    pub play_as: PlayAs,

    /// Event name recorded in the game tags
    #[arg(long)]
    pub event: Option<String>,

    /// Continue an existing game instead of creating one
    #[arg(long)]
    pub game: Option<String>,

    /// Starting position in FEN
    #[arg(long)]
    pub fen: Option<String>,

    /// Attempts the oracle gets to produce a legal move
    #[arg(long, default_value_t = DEFAULT_ORACLE_RETRIES)]
    pub oracle_retries: u32,

    /// Suggestion mode override (enumerated or freeform)
    #[arg(long, value_parser = ["enumerated", "freeform"])]
    pub suggestion_mode: Option<String>,

    /// Timeout for each request to the server
    #[arg(long, default_value_t = 60)]
    pub request_timeout_secs: u64,
}

impl Cli {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn controller_settings(&self) -> ControllerSettings {
        let oracle_side = match self.play_as {
            PlayAs::White => Some(PieceColor::Black),
            PlayAs::Black => Some(PieceColor::White),
            PlayAs::Both => None,
        };
        ControllerSettings {
            oracle_side,
            oracle_retries: self.oracle_retries.max(1),
            suggestion_mode: self.suggestion_mode.clone(),
        }
    }

    pub fn create_request(&self) -> CreateGameRequest {
        let (white, black) = match self.play_as {
            PlayAs::White => (Some("You".to_string()), Some("Oracle".to_string())),
            PlayAs::Black => (Some("Oracle".to_string()), Some("You".to_string())),
            PlayAs::Both => (None, None),
        };
        CreateGameRequest {
            event: self.event.clone(),
            white,
            black,
            fen: self.fen.clone(),
            ..CreateGameRequest::default()
        }
    }
}

/// Get the directory for log files.
///
/// Priority:
/// 1. CHESSGPT_LOG_DIR env variable if set
/// 2. ./logs as fallback
pub fn get_log_dir() -> PathBuf {
    std::env::var("CHESSGPT_LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_LOG_DIR))
}
