use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use bilemo_api::config;
use bilemo_api::database::{DatabaseManager, MemoryStore};
use bilemo_api::{app, fixtures, AppState};

#[derive(Debug, Parser)]
#[command(name = "bilemo-api", version, about = "BileMo catalogue API")]
struct Cli {
    /// Port to listen on (falls back to PORT, then 3000)
    #[arg(long, env = "PORT", default_value_t = 3000)]
    port: u16,

    /// Use the in-memory store even when DATABASE_URL is set
    #[arg(long)]
    memory: bool,

    /// Load the demo fixtures at startup
    #[arg(long)]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();
    tracing::info!("Starting BileMo API in {:?} mode", config.environment);
    if bilemo_api::is_development!() {
        tracing::warn!("Development mode: permissive CORS and the built-in JWT secret unless JWT_SECRET is set");
    }

    let state = if cli.memory || config.database.url.is_none() {
        let store = Arc::new(MemoryStore::new());
        if cli.seed {
            fixtures::seed(store.as_ref(), store.as_ref()).await?;
        }
        tracing::info!("Using in-memory store");
        AppState::memory(store, config)
    } else {
        let pool = DatabaseManager::connect(&config.database)
            .await
            .context("connecting to the database")?;
        let state = AppState::postgres(pool, config);
        if cli.seed {
            fixtures::seed(state.products.as_ref(), state.users.as_ref()).await?;
        }
        state
    };

    let bind_addr = format!("0.0.0.0:{}", cli.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("BileMo API listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server error")?;
    Ok(())
}
