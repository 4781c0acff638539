//! Weathercast CLI: drives the raw-data, feature, training, and inference
//! stages from the terminal.

mod commands;

use clap::Parser;
use std::path::PathBuf;

/// Weathercast: temperature regression over weather observations
#[derive(Parser, Debug)]
#[command(name = "weathercast", version, about, long_about = None)]
struct Cli {
    /// Workspace directory; relative data paths resolve against it
    #[arg(short, long, default_value = ".")]
    workspace: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Append synthetic observations to the raw table
    Generate {
        /// Number of observations (defaults to generator.records)
        #[arg(short = 'n', long)]
        records: Option<usize>,
    },
    /// Fit the encoder and scaler and write the transformed table
    Preprocess,
    /// Train the model on the transformed table
    Train,
    /// Preprocess and train, committing all outputs together
    Run,
    /// Predict the temperature for one observation
    Predict {
        #[arg(long)]
        humidity: f64,
        #[arg(long)]
        wind_kph: f64,
        #[arg(long)]
        condition: String,
        #[arg(long)]
        hour: u32,
        #[arg(long)]
        day: u32,
        #[arg(long)]
        month: u32,
        #[arg(long)]
        day_of_year: u32,
        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ConfigAction {
    /// Print the effective configuration as TOML
    Show,
    /// Write a default weathercast.toml into the workspace
    Init,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = weathercast_core::logging::init(cli.verbose, cli.quiet, None);

    let workspace = cli
        .workspace
        .canonicalize()
        .unwrap_or_else(|_| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    commands::handle_command(cli.command, &workspace, cli.config.as_deref())
}
