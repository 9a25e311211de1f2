//! Process wiring and lifecycle.

use std::sync::Arc;

use relay_api::{serve, AppState};
use relay_core::OllamaClient;
use thiserror::Error;
use tracing::{info, warn};

use crate::cli::Cli;

/// Errors that end the process.
#[derive(Debug, Error)]
pub enum AppError {
    /// The dashboard server could not bind or failed while serving.
    #[error("server error: {0}")]
    Server(#[from] std::io::Error),
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builds every component and serves the dashboard until Ctrl-C.
pub async fn run(cli: Cli) -> Result<(), AppError> {
    let relay = cli.relay_config();
    if let Err(e) = relay.ensure_dirs() {
        warn!(error = %e, dir = %relay.data_dir.display(), "Could not create data directories");
    }
    info!(data_dir = %relay.data_dir.display(), "Using data directory");

    let ollama = Arc::new(OllamaClient::new(
        &relay.ollama_url,
        &relay.ollama_model,
        relay.ollama_timeout,
    ));
    match ollama.check_availability().await {
        Ok(()) => info!(model = %relay.ollama_model, "Ollama is available"),
        Err(e) => warn!(error = %e, "Ollama unavailable; LLM replies will fall back"),
    }

    let bot_token = relay.bot_token.clone();
    let state = AppState::new(cli.api_config(), relay, ollama);

    if let Some(token) = bot_token {
        if let Err(e) = state.link.restore(&token).await {
            warn!(error = %e, "Configured bot token was rejected; connect again from the dashboard");
        }
    }

    let monitor = Arc::clone(&state.monitor);
    serve(state, shutdown_signal()).await?;

    if monitor.stop().await {
        info!("Telegram monitoring stopped");
    }
    info!("Goodbye");
    Ok(())
}
