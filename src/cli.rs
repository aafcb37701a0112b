//! Command-line interface for word_trinity.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use word_trinity::StatsSubject;

/// Word Trinity - triangle word puzzle client
#[derive(Parser, Debug)]
#[command(name = "word_trinity")]
#[command(about = "Play the daily triangle word puzzle in a terminal", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to a TOML config file. Defaults to ./word_trinity.toml when present.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Puzzle server URL, overriding config and environment
    #[arg(long, global = true)]
    pub server_url: Option<String>,

    /// Player id for statistics, overriding config and environment
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Play today's puzzle interactively
    Play,

    /// Print statistics
    Stats {
        /// Whose statistics: user or population
        #[arg(short, long, default_value = "user")]
        subject: StatsSubject,
    },
}
