//! EnsembleStat CLI

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod estimate;
mod plan;

#[derive(Parser)]
#[command(name = "ensemblestat")]
#[command(about = "EnsembleStat - trajectory-ensemble distribution estimation")]
#[command(version = es_core::VERSION)]
struct Cli {
    /// Log verbosity level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: tracing::Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate marginal and sliced distributions from a saved ensemble
    Estimate {
        /// Input ensemble (JSON: n_runs, n_time, n_species, flat row-major data)
        #[arg(short, long)]
        input: PathBuf,

        /// Reference state for the sliced distributions, as comma-separated
        /// raw populations. Defaults to the per-species observed minimum.
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
        slice: Option<Vec<i64>>,

        /// Also compute the full joint distribution (small systems only)
        #[arg(long)]
        full_joint: bool,

        /// Output file for the distribution bundle (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build a sampling plan from a tabulated initial density
    Plan {
        /// Tabulated density (JSON: interval, liml, probabilities in index order)
        #[arg(long)]
        p0: PathBuf,

        /// Approximate total run budget to allocate across the lattice
        #[arg(long)]
        sweeps: u64,

        /// Output file for the plan (pretty JSON). Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Estimate { input, slice, full_joint, output } => {
            estimate::run(input, slice, full_joint, output)
        }
        Commands::Plan { p0, sweeps, output } => plan::run(p0, sweeps, output),
    }
}
