//! Retouch - HTTP image enhancement service.
//!
//! Accepts an uploaded image with a few flags (upscale, denoise, face
//! restore) and returns an enhanced PNG.
//!
//! # Usage
//!
//! ```bash
//! # Run the HTTP service
//! retouch serve --port 8000
//!
//! # Enhance a local file with the same pipeline
//! retouch enhance photo.jpg -o photo.png --upscale 2 --denoise
//!
//! # View configuration
//! retouch config show
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;
mod logging;
mod server;

/// Retouch - HTTP image enhancement service.
#[derive(Parser, Debug)]
#[command(name = "retouch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    /// Config file to use instead of the default location
    #[arg(short, long, global = true, env = "RETOUCH_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP enhancement service
    Serve(cli::serve::ServeArgs),

    /// Enhance a local image file
    Enhance(cli::enhance::EnhanceArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match &cli.config {
        Some(path) => {
            let path = cli::expand_path(path);
            retouch_core::Config::load_from(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?
        }
        None => match retouch_core::Config::load() {
            Ok(config) => config,
            Err(e) => {
                eprintln!(
                    "Warning: Failed to load config: {e}\n  \
                     Using default configuration. Check your config file with `retouch config path`."
                );
                retouch_core::Config::default()
            }
        },
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Retouch v{}", retouch_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Enhance(args) => cli::enhance::execute(args, config).await,
        Commands::Config(args) => cli::config::execute(args, config, cli.config).await,
    }
}
