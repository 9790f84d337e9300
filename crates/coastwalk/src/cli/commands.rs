//! CLI command definitions.
//!
//! This module defines the arguments of each subcommand.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Full pipeline arguments.
#[derive(Debug, Args)]
pub struct RunCommand {
    /// Print the run summary as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Ingest command arguments.
#[derive(Debug, Args)]
pub struct IngestCommand {
    /// Report new tracks without writing the manifest
    #[arg(short = 'n', long)]
    pub dry_run: bool,
}

/// Stats command arguments.
#[derive(Debug, Args)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file paths that are consulted
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
