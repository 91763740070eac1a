mod config;
mod game;
mod persistence;
mod service;
mod session;

use std::sync::Arc;

use oracle::{ChatCompletionsOracle, Oracle};
use persistence::{Database, SqliteStore};
use session::GameManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine; real environment variables still apply.
    let _ = dotenvy::dotenv();

    // Initialize tracing with span durations
    use tracing_subscriber::fmt::format::FmtSpan;
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!("Starting chessgpt server");

    let data_dir = config::get_data_dir();
    tracing::info!("Using data directory: {}", data_dir.display());
    let db = Database::open(&data_dir.join(persistence::sqlite::DATABASE_FILE)).await?;
    let store = SqliteStore::new(&db);

    let oracle_config = config::get_oracle_config();
    if oracle_config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; suggestions will fail until it is");
    }
    tracing::info!(url = %oracle_config.url, model = %oracle_config.model, "Oracle configured");
    let oracle: Arc<dyn Oracle> = Arc::new(ChatCompletionsOracle::new(oracle_config)?);

    let settings = config::get_game_settings();
    tracing::info!(mode = settings.suggestion_mode.as_str(), "Suggestion mode");
    let manager = Arc::new(GameManager::new(store, oracle, settings));

    let app = service::router(Arc::clone(&manager));
    let addr = config::get_bind_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown requested");
        })
        .await?;

    manager.shutdown_all().await;
    Ok(())
}
