//! LOCKSTEP CLI
//!
//! Stimulus generation, stream inspection and golden versus hardware trace
//! verification.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod commands;
mod report;

use clap::{ArgGroup, Args, Parser, Subcommand};
use color_eyre::Result;
use commands::Status;
use console::style;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lockstep")]
#[command(about = "LOCKSTEP - ITCH stimulus generation and bit-accuracy verification", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a binary ITCH Add Order stream
    Generate(GenerateArgs),
    /// Compare a golden trace against a hardware trace
    Verify(VerifyArgs),
    /// Decode and print a binary stream
    Inspect(InspectArgs),
}

/// Arguments of `generate`
#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("source").required(true).args(["synthetic", "input"])))]
pub struct GenerateArgs {
    /// Binary output file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Also write a CSV order log
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Generate synthetic random-walk order flow
    #[arg(long)]
    pub synthetic: bool,

    /// Convert a historical price CSV
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Number of synthetic orders
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub num_orders: u64,

    /// Symbols to trade (comma separated)
    #[arg(long, value_delimiter = ',', num_args = 1..)]
    pub symbols: Vec<String>,

    /// Starting mid price in dollars
    #[arg(long, default_value_t = 150.0)]
    pub base_price: f64,

    /// Proportional per-order price volatility
    #[arg(long, default_value_t = 0.001)]
    pub volatility: f64,

    /// Random seed: an integer, or any other string to hash into one
    #[arg(short, long, default_value = "42")]
    pub seed: String,
}

/// Arguments of `verify`
#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Golden model trace
    #[arg(short, long, default_value = "build/golden_trace.csv")]
    pub golden: PathBuf,

    /// Hardware simulation trace
    #[arg(long, visible_alias = "hw", default_value = "sim/verilator/verilator_trace.csv")]
    pub hardware: PathBuf,

    /// Tolerance for floating-point fields
    #[arg(short, long, default_value_t = lockstep_verify::DEFAULT_TOLERANCE)]
    pub tolerance: f64,

    /// JSON policy table replacing the default field rules
    #[arg(short, long)]
    pub policy: Option<PathBuf>,

    /// Write the verdict as JSON
    #[arg(long)]
    pub verdict_json: Option<PathBuf>,

    /// Compare the golden trace against itself
    #[arg(long)]
    pub self_test: bool,
}

/// Arguments of `inspect`
#[derive(Args, Debug, Clone)]
pub struct InspectArgs {
    /// Binary stream to decode
    #[arg(short, long)]
    pub input: PathBuf,

    /// Stop after this many records
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Print the raw bytes of each record
    #[arg(long)]
    pub hex: bool,
}

fn init_tracing(verbose: u8, json: bool) {
    let default = match verbose {
        0 => "lockstep=info",
        1 => "lockstep=debug",
        _ => "lockstep=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json_logs);

    let mut stdout = std::io::stdout().lock();
    let result = match &cli.command {
        Commands::Generate(args) => commands::generate(args, &mut stdout),
        Commands::Verify(args) => commands::verify(args, &mut stdout),
        Commands::Inspect(args) => commands::inspect(args, &mut stdout),
    };

    match result {
        Ok(status) => Ok(status.into()),
        Err(err) if commands::is_input_error(&err) => {
            eprintln!("{} {:#}", style("ERROR:").red().bold(), err);
            Ok(Status::InputError.into())
        }
        Err(err) => Err(err),
    }
}
