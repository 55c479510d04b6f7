//! Command-Line Interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Reader Intent - replay and inspect reader interaction traces
#[derive(Parser, Debug)]
#[command(name = "reader-intent")]
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
    /// Replay a captured trace through the engine
    Replay {
        /// Input trace file
        #[arg(short, long)]
        input: PathBuf,

        /// Skip augmentation and telemetry delivery
        #[arg(long)]
        offline: bool,
    },

    /// Print trace metadata and event counts
    Inspect {
        /// Input trace file
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Write the default configuration file
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// View configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
