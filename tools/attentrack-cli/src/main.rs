//! Attentrack CLI: score feature streams and drive the participant tracker.
//!
//! Usage:
//!   attentrack score <PATH>     Score a JSONL feature file
//!   attentrack track            Run the tracker loop on synthetic frames
//!   attentrack config           Show or initialise the configuration

use std::path::PathBuf;

use attentrack_common::config::{config_file_path, AppConfig};
use clap::{Parser, Subcommand};

mod commands;
mod synthetic;

#[derive(Parser)]
#[command(
    name = "attentrack",
    about = "Cognitive-signal scoring and participant tracking",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the standard location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score a JSONL file of feature samples
    Score {
        /// Path to the feature samples (one JSON object per line)
        input: PathBuf,

        /// Write scored points here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write alert events to this JSONL file
        #[arg(long)]
        alerts: Option<PathBuf>,

        /// Decimate input to at most this many samples per second
        #[arg(long)]
        hz: Option<u32>,

        /// Recompute blink rate from the eye-aspect-ratio stream
        #[arg(long)]
        blink_from_ear: bool,
    },

    /// Run the heatmap and participant tracker on synthetic frames
    Track {
        /// Number of ticks to run
        #[arg(long, default_value = "40")]
        ticks: u64,

        /// Tick rate (defaults to the configured frame rate)
        #[arg(long)]
        hz: Option<u32>,

        /// Synthetic frame width
        #[arg(long)]
        width: Option<u32>,

        /// Synthetic frame height
        #[arg(long)]
        height: Option<u32>,

        /// Write participant states here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Write a default config file to the standard location
        #[arg(long)]
        init: bool,

        /// Overwrite an existing file with --init
        #[arg(long)]
        force: bool,

        /// Print the config file location and exit
        #[arg(long)]
        path: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let initialising = matches!(cli.command, Commands::Config { init: true, .. });
    let config = match &cli.config {
        Some(path) if initialising && !path.exists() => AppConfig::default(),
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display()))?,
        None => AppConfig::load(),
    };

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    attentrack_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Score {
            input,
            output,
            alerts,
            hz,
            blink_from_ear,
        } => commands::score::run(&config, input, output, alerts, hz, blink_from_ear),
        Commands::Track {
            ticks,
            hz,
            width,
            height,
            output,
        } => commands::track::run(&config, ticks, hz, width, height, output).await,
        Commands::Config { init, force, path } => {
            let location = cli.config.unwrap_or_else(config_file_path);
            commands::config::run(&config, location, init, force, path)
        }
    }
}
