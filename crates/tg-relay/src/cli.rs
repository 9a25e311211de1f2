//! Command-line interface definition using clap.

use std::path::PathBuf;

use clap::Parser;
use relay_api::ApiConfig;
use relay_core::config::{DATA_DIR_ENV, ENV_FILE_ENV};
use relay_core::{expand_path, RelayConfig};

/// tg-relay - Telegram DM logger and auto-responder dashboard
#[derive(Parser, Debug)]
#[command(name = "tg-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Host to bind the dashboard to
    #[arg(long, env = "HOST", default_value = relay_api::config::DEFAULT_HOST)]
    pub host: String,

    /// Port to bind the dashboard to
    #[arg(short, long, env = "PORT", default_value_t = relay_api::config::DEFAULT_PORT)]
    pub port: u16,

    /// Path to the data directory
    #[arg(short, long, env = DATA_DIR_ENV)]
    pub data_dir: Option<String>,

    /// `.env` file to load and to persist the bot token to
    #[arg(short, long, env = ENV_FILE_ENV)]
    pub env_file: Option<String>,
}

impl Cli {
    /// Resolves the relay configuration, CLI flags taking precedence.
    pub fn relay_config(&self) -> RelayConfig {
        let mut config = RelayConfig::from_env();
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(expand_path(dir));
        }
        if let Some(file) = &self.env_file {
            config = config.with_env_file(expand_path(file));
        }
        config
    }

    pub fn api_config(&self) -> ApiConfig {
        ApiConfig::new(&self.host, self.port)
    }

    /// The env file given on the command line, if any.
    pub fn env_file_path(&self) -> Option<PathBuf> {
        self.env_file.as_deref().map(expand_path)
    }

    /// Returns the default log filter based on verbosity.
    pub fn log_filter(&self) -> String {
        let level = match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        };
        format!(
            "tg_relay={level},relay_api={level},relay_core={level},relay_telegram={level},\
             relay_persistence={level},tower_http={level},teloxide=warn"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tg-relay"]);
        assert_eq!(cli.verbose, 0);
        assert!(cli.log_filter().starts_with("tg_relay=info"));
        assert!(cli.log_filter().ends_with("teloxide=warn"));
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "tg-relay",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--data-dir",
            "/srv/relay",
            "-vv",
        ]);
        assert_eq!(cli.api_config().bind_address(), "0.0.0.0:8080");
        assert_eq!(cli.relay_config().data_dir, PathBuf::from("/srv/relay"));
        assert!(cli.log_filter().contains("relay_core=trace"));
    }

    #[test]
    fn test_cli_env_file() {
        let cli = Cli::parse_from(["tg-relay", "--env-file", "/etc/tg-relay.env"]);
        assert_eq!(cli.env_file_path(), Some(PathBuf::from("/etc/tg-relay.env")));
        assert_eq!(cli.relay_config().env_file, PathBuf::from("/etc/tg-relay.env"));
    }

    #[test]
    fn test_cli_debug_assert() {
        Cli::command().debug_assert();
    }
}
