//! # Main — CLI Entry Point
//!
//! Routes subcommands to the execution functions in `cli.rs` and handles the
//! shared concerns: structured logging setup, country config loading, and the
//! request identity recorded into analysis results.
//!
//! ## Subcommands
//!
//! - `generate` — synthesize a batch of numbers for a country and simulate
//!   existence checks; prompts for any parameter not given as a flag.
//! - `analyze` — parse and describe real numbers interactively (or one-shot
//!   via `--number`), recording every attempt to the history log.
//! - `countries` — list the configured generation profiles.
//! - `history` — print a saved history snapshot.
//!
//! ## Global Options
//!
//! - `--countries` / `DIALFORGE_COUNTRIES`: JSON profile file; the built-in
//!   table is used when the file does not exist.
//! - `--existence-probability`: chance a synthesized number "exists".
//! - `--user`: requesting user stamped into analysis records.

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use dialforge::verify;

#[derive(Parser)]
#[command(
    name = "dialforge",
    about = "Synthesize plausible phone numbers and analyze real ones"
)]
struct Cli {
    /// Path to the country profile JSON file (built-in table if absent)
    #[arg(long, env = "DIALFORGE_COUNTRIES", default_value = "countries_data.json")]
    countries: PathBuf,

    /// Probability that a synthesized number "exists" (0.0 - 1.0)
    #[arg(long, default_value_t = verify::DEFAULT_EXISTENCE_PROBABILITY)]
    existence_probability: f64,

    /// Requesting user recorded in analysis results (defaults to $USER)
    #[arg(long)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a batch of numbers and simulate existence verification
    Generate {
        /// Country display name, must match a configured profile (prompted when omitted)
        #[arg(long)]
        country: Option<String>,
        /// Batch size, 1 to 1000 (prompted when omitted)
        #[arg(long)]
        size: Option<u64>,
        /// Delay between numbers in seconds, 0 to 5 (prompted when omitted)
        #[arg(long)]
        delay: Option<f64>,
    },
    /// Analyze real phone numbers (interactive loop; salir/exit/quit ends it)
    Analyze {
        /// Analyze a single number and exit instead of looping
        #[arg(long)]
        number: Option<String>,
        /// Where the history snapshot is saved on exit
        #[arg(long, default_value = "search_history.json")]
        history_out: PathBuf,
        /// Skip writing the history snapshot
        #[arg(long)]
        no_save: bool,
    },
    /// List configured countries and their generation profiles
    Countries,
    /// Show a saved history snapshot
    History {
        /// Path to the snapshot file
        #[arg(long, default_value = "search_history.json")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    // Structured logging: LOG_FORMAT=json for machine consumption,
    // human-readable to stderr otherwise.
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt().json().with_target(false).init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();

    match &cli.command {
        Commands::Generate {
            country,
            size,
            delay,
        } => cli::run_generate(&cli, country.as_deref(), *size, *delay),
        Commands::Analyze {
            number,
            history_out,
            no_save,
        } => cli::run_analyze(&cli, number.as_deref(), history_out, *no_save),
        Commands::Countries => cli::run_countries(&cli),
        Commands::History { file } => cli::run_history(file),
    }
}
