//! Koth CLI - Command-line interface for running and checking King of
//! the Hill matches.

// Allow print in the CLI binary
#![allow(clippy::print_stdout, clippy::print_stderr)]

mod cli;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

/// Koth - a King of the Hill rules engine
#[derive(Parser, Debug)]
#[command(name = "koth")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a scenario file and report the match outcome
    Run {
        /// Scenario file (.json)
        #[arg(required = true)]
        scenario: std::path::PathBuf,

        /// Output format: text or json
        #[arg(short, long, default_value = "text")]
        format: cli::OutputFormat,

        /// Suppress the tick-by-tick transition log
        #[arg(short, long)]
        quiet: bool,
    },

    /// Run mass randomized matches and check invariants
    Soak {
        /// Number of matches to run (default: 1000)
        #[arg(short, long, default_value = "1000")]
        matches: u64,

        /// Starting seed (increments for each match)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Parallel threads (default: CPU count)
        #[arg(short = 'j', long)]
        threads: Option<usize>,

        /// Show progress bar
        #[arg(short, long)]
        progress: bool,
    },

    /// Validate a scenario file and print its resolved configuration
    Validate {
        /// Scenario file to validate
        #[arg(required = true)]
        scenario: std::path::PathBuf,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let result = match args.command {
        Commands::Run {
            scenario,
            format,
            quiet,
        } => cli::run::execute(scenario, format, quiet),

        Commands::Soak {
            matches,
            seed,
            threads,
            progress,
        } => cli::soak::execute(matches, seed, threads, progress),

        Commands::Validate { scenario } => cli::validate::execute(scenario),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
