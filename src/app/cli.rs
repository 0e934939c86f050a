//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Hook Relay - ordered cross-thread delivery of input hook events
#[derive(Parser, Debug)]
#[command(name = "hook-relay")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a synthetic capture session and print delivered events
    Feed {
        /// Number of synthetic events to emit
        #[arg(short, long, default_value = "16")]
        count: u64,

        /// Enable the capture-library debug sink
        #[arg(short, long)]
        debug: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the active configuration as TOML
    Show,
    /// Write a default config file to the default location
    Init,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
