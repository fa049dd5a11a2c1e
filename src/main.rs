//! FolderTree CLI entry point.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use foldertree_core::config::AppConfig;
use foldertree_core::error::AppError;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {e}"));
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(&config).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration(config_path: &str) -> Result<AppConfig, AppError> {
    let config_path = std::env::var("FOLDERTREE_CONFIG").unwrap_or_else(|_| config_path.to_string());
    let env = std::env::var("FOLDERTREE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(config_path.trim_end_matches(".toml"), &env)
}

/// Initialize tracing/logging. Logs go to stderr so command output stays
/// machine-readable.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
