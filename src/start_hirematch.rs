//! Startup helpers for the hirematch server.

use std::process::ExitCode;

use anyhow::Context;

use crate::matching::core::config::MatchConfig;
use crate::server::{self, AppState};

/// Run the server (used by the `hirematch-server` binary).
///
/// # Returns
/// `ExitCode::SUCCESS` on graceful shutdown, `1` on failure.
#[must_use]
pub fn run() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting hirematch v{}", env!("CARGO_PKG_VERSION"));

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = rt.block_on(serve(get_port())) {
        tracing::error!("Server error: {e:#}");
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

async fn serve(port: u16) -> anyhow::Result<()> {
    let config = MatchConfig::from_env().context("loading HIREMATCH_* configuration")?;
    if let Some(url) = &config.embedding.base_url {
        tracing::info!("Ollama endpoint: {url}");
    }
    let state = AppState::new(&config)
        .await
        .context("initializing matching engine")?;
    server::run_server_with_shutdown(state, port, shutdown_signal())
        .await
        .context("running HTTP server")
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::warn!("could not install Ctrl-C handler; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
}

/// Get configured server port.
#[must_use]
pub fn get_port() -> u16 {
    std::env::var("HIREMATCH_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(server::DEFAULT_PORT)
}
