use std::sync::Arc;

use chess_client::{ChessService, HttpChessClient};
use clap::Parser;
use client_tui::config::{self, Cli};
use client_tui::{ui, BoardController};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The terminal belongs to the UI, so logs go to a daily file.
    let log_dir = config::get_log_dir();
    std::fs::create_dir_all(&log_dir).ok();
    let file_appender = tracing_appender::rolling::daily(&log_dir, "chessgpt-client");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!(server = %cli.server, "chessgpt client starting up");
    println!("Connecting to {}", cli.server);
    println!("Debug logs: {}/chessgpt-client.YYYY-MM-DD", log_dir.display());

    let service: Arc<dyn ChessService> = Arc::new(HttpChessClient::new(&cli.server, cli.request_timeout())?);
    let settings = cli.controller_settings();
    let controller = match &cli.game {
        Some(game_id) => BoardController::resume(service, settings, game_id).await?,
        None => BoardController::start(service, settings, &cli.create_request()).await?,
    };

    ui::run_app(controller).await?;

    tracing::info!("chessgpt client shutting down");
    Ok(())
}
