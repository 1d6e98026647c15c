use std::sync::Arc;

use clap::Parser;
use reactx_core::{MemoryStore, PgStore, ReactxConfig, Store, StoreBackend};
use tokio::sync::broadcast;
use tracing_subscriber::{fmt, EnvFilter};

use reactx_server::http::{self, AppState};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(short, long, default_value = "reactx.toml")]
    config: String,

    /// Check the store connection and exit
    #[arg(long)]
    health: bool,
}

async fn open_store(config: &ReactxConfig) -> anyhow::Result<Arc<dyn Store>> {
    match config.database.backend {
        StoreBackend::Postgres => {
            let pool = reactx_core::db::create_pool(&config.database).await?;
            reactx_core::db::ensure_schema(&pool).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::new()))
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present (dev convenience; production uses real env vars)
    dotenvy::dotenv().ok();

    let args = Args::parse();

    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .init();

    let config = match ReactxConfig::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config from {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    let store = match open_store(&config).await {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open {:?} store: {}", config.database.backend, e);
            std::process::exit(1);
        }
    };

    if args.health {
        match store.health().await {
            Ok(v) => println!("✅ {} store ready: {}", store.name(), v),
            Err(e) => {
                println!("❌ {} store check failed: {}", store.name(), e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let (tx, _rx) = broadcast::channel(1);
    let shutdown_tx = tx.clone();

    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            return;
        }
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx.send(());
    });

    let state = Arc::new(AppState::new(store, config));
    http::start_http_server(state, tx.subscribe()).await?;

    Ok(())
}
