use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate N days of a scenario with a given seed
    Run {
        /// Path to the scenario spec (YAML/JSON)
        #[arg(long)]
        spec: PathBuf,
        /// scenario_id within the spec to run
        #[arg(long)]
        scenario: String,
        /// Starting daily budget for the user advertiser
        #[arg(long, default_value_t = 500.0)]
        daily_budget: f64,
        /// RNG seed
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Number of days to simulate
        #[arg(long, default_value_t = 30)]
        days: u32,
        /// Write the full `RunResult` JSON here instead of just printing a summary
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Validate a scenario spec, reporting warnings and errors
    Validate {
        /// Path to the scenario spec (YAML/JSON)
        #[arg(long)]
        spec: PathBuf,
    },
    /// Fan scenario/seed combinations out across a thread pool
    Batch {
        /// Path to the scenario spec (YAML/JSON)
        #[arg(long)]
        spec: PathBuf,
        /// scenario_ids to run (comma separated). Defaults to every scenario in the spec.
        #[arg(long)]
        scenarios: Option<String>,
        /// RNG seeds to run (comma separated)
        #[arg(long, default_value = "1")]
        seeds: String,
        /// Starting daily budget for the user advertiser
        #[arg(long, default_value_t = 500.0)]
        daily_budget: f64,
        /// Number of days to simulate per job
        #[arg(long, default_value_t = 30)]
        days: u32,
        /// Output directory root for per-job results and the batch manifest
        #[arg(short, long)]
        out: PathBuf,
        /// Thread count (0 = auto)
        #[arg(short = 't', long, default_value_t = 0)]
        threads: usize,
    },
    /// Run manifest management
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum RunsCommands {
    /// List recorded runs
    List {
        /// Root path to scan for run manifests
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Output format for the listing
        #[arg(long, value_enum, default_value_t = RunFormat::Plain)]
        format: RunFormat,
    },
    /// Show a recorded run
    Show {
        /// Manifest path or run_id alias
        target: String,
        /// Root path to scan (used when target is a run_id)
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = RunFormat::Plain)]
        format: RunFormat,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum RunFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}
