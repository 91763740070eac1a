//! Configuration for the chessgpt server
//!
//! Every value comes from an environment variable (a `.env` file is loaded
//! first) and falls back to a compile-time default.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use oracle::openai::{DEFAULT_MODEL, DEFAULT_TIMEOUT, DEFAULT_URL};
use oracle::{OracleConfig, SuggestionMode};

use crate::session::GameSettings;

const DEV_DATA_DIR: &str = "./data";
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

/// Get the data directory for the database.
///
/// Priority:
/// 1. CHESSGPT_DATA_DIR env variable if set
/// 2. the platform data directory
/// 3. ./data as fallback
pub fn get_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("CHESSGPT_DATA_DIR") {
        return PathBuf::from(dir);
    }

    ProjectDirs::from("", "", "chessgpt")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(DEV_DATA_DIR))
}

pub fn get_bind_addr() -> anyhow::Result<SocketAddr> {
    let raw = std::env::var("CHESSGPT_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
    raw.parse()
        .map_err(|e| anyhow::anyhow!("Invalid CHESSGPT_BIND_ADDR {raw:?}: {e}"))
}

pub fn get_oracle_config() -> OracleConfig {
    let timeout = std::env::var("CHESSGPT_ORACLE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_TIMEOUT);

    OracleConfig {
        url: std::env::var("CHESSGPT_ORACLE_URL").unwrap_or_else(|_| DEFAULT_URL.to_string()),
        model: std::env::var("CHESSGPT_ORACLE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
        api_key: std::env::var("OPENAI_API_KEY").ok().filter(|k| !k.is_empty()),
        timeout,
    }
}

pub fn get_game_settings() -> GameSettings {
    let defaults = GameSettings::default();
    GameSettings {
        suggestion_mode: suggestion_mode_or_default(
            std::env::var("CHESSGPT_SUGGESTION_MODE").ok().as_deref(),
        ),
        system_prompt: std::env::var("CHESSGPT_SYSTEM_PROMPT")
            .ok()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(defaults.system_prompt),
    }
}

fn suggestion_mode_or_default(value: Option<&str>) -> SuggestionMode {
    match value.map(str::parse::<SuggestionMode>) {
        Some(Ok(mode)) => mode,
        Some(Err(e)) => {
            tracing::warn!("{e}; using {}", SuggestionMode::default().as_str());
            SuggestionMode::default()
        }
        None => SuggestionMode::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_data_dir_fallback() {
        // Depends on CHESSGPT_DATA_DIR in the environment; either way the path is usable.
        let dir = get_data_dir();
        assert!(!dir.as_os_str().is_empty());
    }

    #[test]
    fn test_suggestion_mode_parsing() {
        assert_eq!(suggestion_mode_or_default(None), SuggestionMode::Enumerated);
        assert_eq!(suggestion_mode_or_default(Some("freeform")), SuggestionMode::Freeform);
        assert_eq!(suggestion_mode_or_default(Some("bogus")), SuggestionMode::Enumerated);
    }

    #[test]
    fn test_default_bind_addr_parses() {
        assert!(DEFAULT_BIND_ADDR.parse::<SocketAddr>().is_ok());
    }
}
