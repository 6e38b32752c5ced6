/// SiLK command-line tool: inspect, dump and validate SiLK flow files.
///
/// # Command overview
///
/// ```text
/// silk <COMMAND> [OPTIONS]
///
/// Commands:
///   inspect    Print the header, its entries and the record count
///   dump       Write every flow as CSV or JSON lines
///   validate   Decode the whole file and report problems
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decoder progress to stderr
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                 |
/// |------|-----------------------------------------|
/// | 0    | Success                                 |
/// | 1    | Error (I/O failure, invalid file, etc.) |
///
/// Logs and error details go to stderr so stdout can be piped cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, prelude::*};

mod cmd_dump;
mod cmd_inspect;
mod cmd_validate;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// Read SiLK network flow files.
#[derive(Parser)]
#[command(name = "silk", version, about = "SiLK flow file CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decoder progress (debug level) unless `RUST_LOG` is set.
    #[arg(short, long, global = true)]
    verbose: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print the header, its entries and the record count.
    Inspect(InspectArgs),
    /// Write every flow as CSV or JSON lines.
    Dump(DumpArgs),
    /// Decode the whole file and report problems.
    Validate(ValidateArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Arguments for `silk inspect`.
///
/// ```text
/// ┌────────────┬──────────────────────────────────────────────────────┐
/// │ Flag       │ Effect                                               │
/// ├────────────┼──────────────────────────────────────────────────────┤
/// │ --entries  │ List every variable-length header entry with content │
/// └────────────┴──────────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct InspectArgs {
    /// Path to the SiLK file.
    pub file: PathBuf,

    /// List the variable-length header entries.
    #[arg(long)]
    pub entries: bool,
}

/// Arguments for `silk dump`.
#[derive(clap::Args)]
pub struct DumpArgs {
    /// Path to the SiLK file.
    pub file: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value_t = DumpFormat::Csv)]
    pub format: DumpFormat,

    /// Stop after this many flows.
    #[arg(long)]
    pub limit: Option<u64>,

    /// Write to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DumpFormat {
    Csv,
    Json,
}

/// Arguments for `silk validate`.
#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Path to the SiLK file.
    pub file: PathBuf,

    /// Also require the 0xDEADBEEF magic number.
    #[arg(long)]
    pub strict: bool,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(if cli.verbose { "debug" } else { "warn" });

    let result = match cli.command {
        Commands::Inspect(args) => cmd_inspect::run(&args),
        Commands::Dump(args) => cmd_dump::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Log to stderr, filtered by `RUST_LOG` or else `default_filter`.
fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}
