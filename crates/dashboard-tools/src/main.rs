//! Dashboard Data Tools
//!
//! Emits CSV import templates, synthesizes mock dashboard datasets and
//! validates or imports populated data.

mod commands;

use clap::{Args, Parser, Subcommand};
use colored::*;
use std::path::PathBuf;
use tracing::Level;

const DEFAULT_OUTPUT: &str = "./data_templates";

#[derive(Parser)]
#[command(name = "dashboard-tools")]
#[command(about = "Healthcare analytics dashboard data templates and mock data")]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Synthesizer options shared by `all` and `mock`
#[derive(Args)]
struct SynthArgs {
    /// Seed for reproducible output (random when omitted)
    #[arg(short, long)]
    seed: Option<u64>,

    /// JSON file overriding synthesizer defaults
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate templates, mock data, validation report and mapping
    All {
        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,

        #[command(flatten)]
        synth: SynthArgs,
    },

    /// Write the CSV import templates
    Templates {
        /// Output directory
        #[arg(short, long, default_value = DEFAULT_OUTPUT)]
        output: PathBuf,
    },

    /// Generate a mock dataset as JSON
    Mock {
        /// Output JSON file
        #[arg(short, long, default_value = "./data_templates/mock_dataset.json")]
        output: PathBuf,

        #[command(flatten)]
        synth: SynthArgs,
    },

    /// Validate a dataset JSON file
    Validate {
        /// Dataset JSON file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Import populated CSV templates from a directory
    Import {
        /// Directory containing populated templates
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write the visualization mapping JSON
    Mapping {
        /// Output JSON file
        #[arg(short, long, default_value = "./data_templates/visualization_mapping.json")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();

    println!("{}", "═".repeat(60).cyan());
    println!("{}", "  HEALTHCARE ANALYTICS DATA TEMPLATE GENERATOR".cyan().bold());
    println!("{}", "  Dashboard data contract tools".cyan());
    println!("{}", "═".repeat(60).cyan());
    println!();

    match cli.command {
        Commands::All { output, synth } => {
            commands::run_all(&output, synth.seed, synth.config.as_deref())
        }
        Commands::Templates { output } => commands::templates(&output),
        Commands::Mock { output, synth } => {
            commands::mock(&output, synth.seed, synth.config.as_deref())
        }
        Commands::Validate { input } => commands::validate_file(&input),
        Commands::Import { input } => commands::import(&input),
        Commands::Mapping { output } => commands::mapping(&output),
    }
}
