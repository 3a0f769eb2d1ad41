//! CLI interface for pocket-signals
//!
//! Provides subcommands for:
//! - `run`: Connect to the broker and stream signals
//! - `replay`: Feed recorded frames through the pipeline offline
//! - `config`: Show the effective configuration

pub mod replay;
mod run;

pub use replay::{OutputFormat, ReplayArgs};
pub use run::RunArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pocket-signals")]
#[command(about = "Market-data ingestion and signal pipeline for the PocketOption WebSocket feed")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Connect and stream signals until interrupted
    Run(RunArgs),
    /// Replay a file of recorded frames
    Replay(ReplayArgs),
    /// Show configuration
    Config,
}
