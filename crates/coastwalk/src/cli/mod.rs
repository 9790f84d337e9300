//! Command-line interface for coastwalk.
//!
//! Each subcommand is an independent batch step; `run` chains them all.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::logging::Verbosity;

pub use commands::{ConfigCommand, IngestCommand, RunCommand, StatsCommand};

/// coastwalk - Track progress along the coast
///
/// Scans a folder of GPX tracks, keeps a YAML manifest of walks, creates
/// markdown journal stubs and a table of contents, and draws every walk on
/// an interactive map with the total distance covered.
#[derive(Debug, Parser)]
#[command(name = "coastwalk")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project root; configured paths are relative to it
    #[arg(short, long, global = true, value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Path to a configuration file (default: <root>/coastwalk.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Ingest tracks, write journals and TOC, and render the map
    Run(RunCommand),

    /// Add new track files to the manifest
    Ingest(IngestCommand),

    /// Create missing journal stubs and the journal index
    Journals,

    /// Rebuild the table of contents from the journals
    Toc,

    /// Render the map from the manifest
    Map,

    /// Show per-walk and total distances
    Stats(StatsCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }
}
