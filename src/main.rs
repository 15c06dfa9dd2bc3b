mod engine;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tormeta::config::{Config, DEFAULT_CONFIG_PATH};

/// Inspect .torrent files and announce them to their tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML config file
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Decode a bencoded value and print it as JSON
    Decode { value: String },
    /// Print the metainfo of a .torrent file
    Info { torrent: PathBuf },
    /// Announce a .torrent file to its tracker and list the returned peers
    Peers { torrent: PathBuf },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load_from(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("could not load {}: {e}, using defaults", cli.config.display());
            Config::default()
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    if let Err(e) = engine::use_command(cli.command, &config).await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
