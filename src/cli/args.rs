//! CLI argument definitions using clap
//!
//! Commands:
//! - povscene emit --scene <path> [--config <path>]
//! - povscene check --scene <path> [--config <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// povscene - build POV-Ray scene files from JSON scene documents
#[derive(Parser, Debug)]
#[command(name = "povscene")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build a scene document and print the SDL text to stdout
    Emit {
        /// Path to the JSON scene document
        #[arg(long)]
        scene: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Build and serialize a scene document without printing it
    Check {
        /// Path to the JSON scene document
        #[arg(long)]
        scene: PathBuf,

        /// Path to configuration file
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
