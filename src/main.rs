//! API Key Manager - Main Application Entry Point
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create the credential store (PostgreSQL pool + migrations, or in-memory)
//! 3. Wire the summarizer collaborators
//! 4. Build HTTP router with routes and middleware
//! 5. Start server on configured port

use std::sync::Arc;

use api_key_manager::{
    build_router,
    config::Config,
    db,
    services::summary_service::{GitHubReadmeClient, OpenAiSummarizer, Summarizer, SummaryService},
    state::AppState,
    store::{InMemoryCredentialStore, PgCredentialStore, SharedCredentialStore},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;
    tracing::info!("Configuration loaded");

    let store: SharedCredentialStore = match config.database_url.as_deref() {
        Some(database_url) => {
            let pool = db::create_pool(database_url, config.database_max_connections).await?;
            tracing::info!("Database pool created");

            db::run_migrations(&pool).await?;
            tracing::info!("Database migrations complete");

            Arc::new(PgCredentialStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, API keys are kept in memory only");
            Arc::new(InMemoryCredentialStore::new())
        }
    };

    let readmes = GitHubReadmeClient::new(&config.github_api_url)?;
    let summarizer: Option<Arc<dyn Summarizer>> = match config.openai_api_key.as_deref() {
        Some(api_key) if config.summarizer_enabled() => Some(Arc::new(OpenAiSummarizer::new(
            &config.openai_base_url,
            api_key,
            &config.openai_model,
        )?)),
        _ => {
            tracing::info!("OPENAI_API_KEY not set, repository summarizer disabled");
            None
        }
    };

    let state = AppState::new(store, SummaryService::new(Arc::new(readmes), summarizer));
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
