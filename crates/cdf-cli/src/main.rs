//! # cdf-validate entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.
//! Uses clap derive macros for argument parsing; verbosity controls both
//! the tracing filter and the report detail level.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cdf_cli::list::{run_list, ListArgs};
use cdf_cli::validate::{run_validate, ValidateArgs};

/// NIST 1500-100 election data feed validator.
///
/// Runs structural rules against XML feeds and reports findings grouped
/// by severity and rule, most frequent rules first.
#[derive(Parser, Debug)]
#[command(name = "cdf-validate", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate XML feed files against the selected rules.
    Validate(ValidateArgs),

    /// List the selected rules and their summaries.
    List(ListArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    tracing::debug!("cdf-validate v{} starting", cdf_cli::VERSION);

    let mut stdout = std::io::stdout();
    let result = match cli.command {
        Commands::Validate(args) => run_validate(&args, cli.verbose >= 1, &mut stdout),
        Commands::List(args) => run_list(&args, &mut stdout).map(|()| 0),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
