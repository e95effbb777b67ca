use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Lumi snowfall microphysics estimator.
#[derive(Parser)]
#[command(
    name = "lumi",
    version,
    about = "Snowfall microphysics estimation from gauge, PSD and fall-velocity data"
)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Command {
    /// Derive the full per-window summary table.
    Analyze(AnalyzeArgs),
    /// Reconcile rate parameters and derive bulk density.
    Density(DensityArgs),
}

/// Instrument input files and windowing options shared by all
/// subcommands.
#[derive(clap::Args)]
pub struct InputArgs {
    /// Path to the gauge CSV (columns: time, amount).
    #[arg(short, long)]
    pub gauge: PathBuf,

    /// Path to the PSD CSV (time column, then one column per bin center).
    #[arg(short, long)]
    pub psd: PathBuf,

    /// Path to the particle velocity CSV
    /// (columns: time, particle_id, diameter, velocity).
    #[arg(long)]
    pub velocity: PathBuf,

    /// Fixed aggregation window in seconds; omit for tick-adaptive
    /// windows.
    #[arg(long)]
    pub fixed: Option<i64>,

    /// Number of adjacent gauge ticks pooled into one window opener.
    #[arg(long, default_value_t = 1)]
    pub n_combined: usize,

    /// Restrict the analysis to samples at or after this RFC 3339 time.
    #[arg(long)]
    pub start: Option<String>,

    /// Restrict the analysis to samples before this RFC 3339 time.
    #[arg(long)]
    pub end: Option<String>,
}

/// Arguments for the `analyze` subcommand.
#[derive(clap::Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Reconcile rate parameters before building the summary, adding
    /// the particle intensity column.
    #[arg(long)]
    pub fit_rate: bool,

    /// Path for the summary CSV; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `density` subcommand.
#[derive(clap::Args)]
pub struct DensityArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Path for the density CSV; stdout when omitted.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
