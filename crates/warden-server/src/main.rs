//! Warden server entry point.

use anyhow::Context;
use tokio::net::TcpListener;
use warden_db::DbManager;
use warden_server::{AppState, ServerConfig, app, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging();

    let config = ServerConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.db.database,
        "Starting Warden server"
    );

    let db = DbManager::connect(&config.db)
        .await
        .context("failed to connect to SurrealDB")?;
    warden_db::run_migrations(db.client())
        .await
        .context("failed to run migrations")?;

    let state = AppState::new(db.client().clone(), db.home().clone(), &config.auth)
        .context("failed to initialise services")?;

    let addr = format!("{}:{}", config.host, config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("Warden server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
