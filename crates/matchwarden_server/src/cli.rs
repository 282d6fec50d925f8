//! Command-line interface for matchwarden.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Matchwarden - server-authoritative tic-tac-toe match coordinator
#[derive(Parser, Debug)]
#[command(name = "matchwarden")]
#[command(about = "Pairs players by tier and referees their matches", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Read JSON-line events on stdin, write JSON-line notifications to stdout
    Serve,

    /// Run a JSON-line event script and print the notifications it produces
    Replay {
        /// Script file, one event per line
        script: PathBuf,
    },
}
