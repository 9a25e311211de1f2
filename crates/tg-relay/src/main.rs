//! tg-relay entry point.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use relay_core::config::ENV_FILE_ENV;
use tg_relay::app;
use tg_relay::cli::Cli;

#[tokio::main]
async fn main() {
    // Load the env file before parsing so clap sees its values
    let default_env = std::env::var(ENV_FILE_ENV).unwrap_or_else(|_| ".env".to_string());
    let _ = dotenvy::from_filename(&default_env);

    let cli = Cli::parse();
    if let Some(path) = cli.env_file_path() {
        let _ = dotenvy::from_path(path);
    }

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    fmt().with_env_filter(filter).with_target(false).init();

    if let Err(e) = app::run(cli).await {
        tracing::error!(error = %e, "tg-relay failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
