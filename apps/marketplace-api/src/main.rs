//! # Marketplace API binary
//!
//! Loads configuration, opens the database, and serves the router until
//! Ctrl+C or SIGTERM.

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use motorhub_api::config::AppConfig;
use motorhub_api::{router, AppState};
use motorhub_db::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load().context("loading configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .context("parsing log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "Starting marketplace API");

    let addr = config.server.socket_addr()?;
    info!(
        %addr,
        database = %config.database.path.display(),
        "Configuration loaded"
    );

    let db = Database::new(config.database.db_config())
        .await
        .context("opening database")?;

    let state = AppState::new(db.clone(), config.payment_links.clone());
    let app = router(state);

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix. In-flight requests finish and
/// their transactions commit or roll back before the pool closes.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        tokio::select! {
            res = tokio::signal::ctrl_c() => res.expect("install Ctrl+C handler"),
            _ = sigterm.recv() => {}
        }
    }

    #[cfg(not(unix))]
    tokio::signal::ctrl_c().await.expect("install Ctrl+C handler");

    info!("Shutdown requested, draining connections");
}
