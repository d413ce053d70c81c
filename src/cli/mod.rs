//! CLI module for povscene
//!
//! Provides command-line interface for:
//! - emit: Build a scene document and print SDL
//! - check: Build and serialize a scene document, report the outcome

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{check, emit, render, run_command};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    run_command(cli.command)
}
