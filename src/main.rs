use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use accounts_api::config::AppConfig;
use accounts_api::database::{MemoryUserStore, PgUserStore, UserStore};
use accounts_api::{app, AppState};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StoreKind {
    /// Postgres via DATABASE_URL
    Postgres,
    /// Process-local store, lost on exit
    Memory,
}

#[derive(Parser)]
#[command(name = "accounts-api")]
#[command(about = "User registration, login and lookup API")]
#[command(version)]
struct Cli {
    #[arg(long, value_enum, env = "ACCOUNTS_STORE", default_value = "postgres")]
    store: StoreKind,

    #[arg(long, help = "Listen port (overrides PORT)")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = AppConfig::from_env().context("invalid configuration")?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    tracing::info!("Starting accounts-api in {:?} mode", config.environment);
    if config.security.jwt_secret_is_default {
        tracing::warn!(
            "JWT_SECRET is not set, falling back to the built-in development secret. \
             This is unsafe for production use"
        );
    }

    let mut pg: Option<PgUserStore> = None;
    let users: Arc<dyn UserStore> = match cli.store {
        StoreKind::Postgres => {
            let store = PgUserStore::connect(&config.database)
                .await
                .context("failed to connect to database")?;
            store
                .ensure_schema()
                .await
                .context("failed to prepare users table")?;
            pg = Some(store.clone());
            Arc::new(store)
        }
        StoreKind::Memory => {
            tracing::warn!("Using the in-memory user store; data is lost on exit");
            Arc::new(MemoryUserStore::new())
        }
    };

    let app = app(AppState::new(&config.security, users));

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("accounts-api listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(store) = pg {
        store.close().await;
    }

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
