//! wmchunk: run working-memory chunking sessions in the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod app;
mod commands;
mod terminal;

#[derive(Parser)]
#[command(name = "wmchunk", version, about = "Working-memory chunking task")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a target file with a subject
    Run {
        /// Target file (CSV, one row per trial)
        #[arg(long)]
        target: PathBuf,

        /// Subject result file; new trials are appended
        #[arg(long)]
        results: PathBuf,

        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Stop waiting for responses after this many milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// Check a target file without running it
    Validate {
        #[arg(long)]
        target: PathBuf,

        /// Mask symbol used in retrieval rows
        #[arg(long, default_value = "#")]
        mask: char,
    },

    /// Write a randomised target file
    Generate {
        /// Output path, defaults to WMC_<run>.csv
        #[arg(long)]
        out: Option<PathBuf>,

        #[arg(long, default_value = "1")]
        run_number: u32,

        /// Repetitions of each chunk size / recall direction pair
        #[arg(long, default_value = "5")]
        repetitions: usize,

        #[arg(long, default_value = "6")]
        seq_length: usize,

        /// Seed for a reproducible design
        #[arg(long)]
        seed: Option<u64>,

        /// TOML config file (mask symbol)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the scoreboard for one run of a result file
    Summary {
        #[arg(long)]
        results: PathBuf,

        #[arg(long)]
        run_number: u32,

        /// TOML config file (scoring rules)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,wmchunk=info"));
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            target,
            results,
            config,
            timeout_ms,
        } => commands::run(target, results, config, timeout_ms),
        Commands::Validate { target, mask } => commands::validate(target, mask),
        Commands::Generate {
            out,
            run_number,
            repetitions,
            seq_length,
            seed,
            config,
        } => commands::generate(out, run_number, repetitions, seq_length, seed, config),
        Commands::Summary {
            results,
            run_number,
            config,
        } => commands::summary(results, run_number, config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
