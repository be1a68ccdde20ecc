//! cgats - inspect, query and edit CGATS data files

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "cgats")]
#[command(author, version, about = "Inspect, query and edit CGATS data files")]
#[command(long_about = "
Reads the CGATS text files measurement and calibration tools exchange
(test charts, measurement results, calibration curves), and writes them
back in canonical form.

Examples:
  cgats info chart.ti3                      # Documents, keys, fields, sets
  cgats info 'measurements/*.ti3' --json    # Many files, JSON output
  cgats fmt chart.ti1 -o clean.ti1          # Re-serialize canonically
  cgats query chart.ti3 RGB_R=100 RGB_G=0   # Rows matching all terms
  cgats query chart.ti3 DESCRIPTOR --values --first
  cgats keyword chart.ti3 ACCURATE_EXPECTED_VALUES --value true -o out.ti3
  cgats remove-row chart.ti3 0 -o out.ti3
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Number of threads (0 = auto)
    #[arg(short = 'j', long, global = true, default_value = "0")]
    threads: usize,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the documents of one or more files
    #[command(visible_alias = "i")]
    Info(InfoArgs),

    /// Parse and write back in canonical form
    #[command(visible_alias = "f")]
    Fmt(FmtArgs),

    /// Search nodes by KEY or KEY=VALUE terms
    #[command(visible_alias = "q")]
    Query(QueryArgs),

    /// Declare or remove a header keyword
    #[command(visible_alias = "k")]
    Keyword(KeywordArgs),

    /// Remove one data row
    #[command(name = "remove-row", visible_alias = "rr")]
    RemoveRow(RemoveRowArgs),
}

#[derive(Args)]
struct InfoArgs {
    /// Input files or glob patterns
    #[arg(required = true)]
    input: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct FmtArgs {
    /// Input file
    input: PathBuf,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct QueryArgs {
    /// Input file
    input: PathBuf,

    /// KEY (presence) or KEY=VALUE (equality) terms, all must hold
    #[arg(required = true)]
    terms: Vec<String>,

    /// Stop at the first match
    #[arg(long)]
    first: bool,

    /// Print the matched value instead of the node (single-term queries)
    #[arg(long)]
    values: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct KeywordArgs {
    /// Input file
    input: PathBuf,

    /// Keyword name
    name: String,

    /// Value to set alongside the declaration
    #[arg(long)]
    value: Option<String>,

    /// Remove the declaration and its value instead
    #[arg(long, conflicts_with = "value")]
    remove: bool,

    /// Document index
    #[arg(short, long, default_value = "0")]
    document: usize,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct RemoveRowArgs {
    /// Input file
    input: PathBuf,

    /// Row index (0-based)
    row: usize,

    /// Document index
    #[arg(short, long, default_value = "0")]
    document: usize,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // Configure thread pool
    if cli.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(cli.threads)
            .build_global()
            .context("Failed to configure thread pool")?;
    }

    match cli.command {
        Commands::Info(args) => commands::info::run(args, cli.verbose),
        Commands::Fmt(args) => commands::fmt::run(args),
        Commands::Query(args) => commands::query::run(args),
        Commands::Keyword(args) => commands::keyword::run(args),
        Commands::RemoveRow(args) => commands::remove_row::run(args),
    }
}
