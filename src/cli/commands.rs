//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Forecast tap: extracts Forecast API resources as SCHEMA/RECORD/STATE messages
#[derive(Parser, Debug)]
#[command(name = "tap-forecast")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON)
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    /// Inline state JSON
    #[arg(long, global = true)]
    pub state_json: Option<String>,

    /// Also write state checkpoints to this file
    #[arg(long, global = true)]
    pub state_output: Option<PathBuf>,

    /// Catalog file with the stream selection
    #[arg(long, global = true, visible_alias = "properties")]
    pub catalog: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Defaults to `sync`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// CLI subcommands
#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Print the catalog of every known stream
    Discover,

    /// Sync the selected streams
    Sync,

    /// Test the API key against the API
    Check,
}

impl Cli {
    /// The command to run
    pub fn resolved_command(&self) -> Commands {
        self.command.unwrap_or(Commands::Sync)
    }
}
