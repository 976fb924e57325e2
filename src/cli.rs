use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::app::app;
use crate::config::AppConfig;
use crate::state::AppState;
use crate::store::{MemoryStore, PgStore};

#[derive(Parser)]
#[command(name = "debts-api")]
#[command(about = "Debts API - debt listings and stage transitions over PostgreSQL or a JSON fixture")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Port to listen on (overrides PORT)")]
    pub port: Option<u16>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    #[command(about = "Serve against PostgreSQL (DATABASE_URL); the default")]
    Serve,

    #[command(about = "Serve against a json-server style fixture file")]
    Mock {
        #[arg(long, help = "Fixture file (overrides MOCK_DB_PATH)")]
        db: Option<PathBuf>,
    },
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = AppConfig::from_env()?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    info!("Starting Debts API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let database = config.require_database()?;
            let store = Arc::new(PgStore::connect(database).await.context("failed to connect to database")?);
            let state = AppState { store: store.clone() };
            serve(&config, state).await?;
            store.close().await;
        }
        Commands::Mock { db } => {
            let path = db.unwrap_or_else(|| PathBuf::from(&config.mock.db_path));
            let store = MemoryStore::load(&path).await?;
            serve(&config, AppState::new(store)).await?;
        }
    }

    Ok(())
}

async fn serve(config: &AppConfig, state: AppState) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    info!(store = state.store.kind(), "Debts API listening on http://{}", bind_addr);

    axum::serve(listener, app(state, &config.security.cors_origins))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
