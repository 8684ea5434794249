//! # juris CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use juris_cli::simulate::{run_simulate, SimulateArgs};
use juris_cli::templates::{run_templates, TemplatesArgs};
use juris_cli::validate::{run_validate, ValidateArgs};

/// Juris workflow automation toolkit.
///
/// Inspects the standard workflow templates, validates workflow definition
/// files, and dry-runs domain events against activated workflows.
#[derive(Parser, Debug)]
#[command(name = "juris", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List or print the standard workflow templates.
    Templates(TemplatesArgs),

    /// Validate a workflow definition file (JSON or YAML).
    Validate(ValidateArgs),

    /// Feed a domain event to activated templates using logging-only handlers.
    Simulate(SimulateArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    // Logs go to stderr so JSON on stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "juris CLI starting");

    let result = match cli.command {
        Commands::Templates(args) => run_templates(&args),
        Commands::Validate(args) => run_validate(&args),
        Commands::Simulate(args) => run_simulate(&args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
