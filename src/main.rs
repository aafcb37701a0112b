//! Word Trinity - terminal client
//!
//! Plays the daily triangle word puzzle against a puzzle server.

#![warn(missing_docs)]

mod cli;
mod tui;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;
use word_trinity::{ClientConfig, HttpBackend, PuzzleBackend, PuzzleSession, StatsSubject};

const DEFAULT_CONFIG: &str = "word_trinity.toml";
const LOG_FILE: &str = "word_trinity.log";

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play => {
            // Log to a file so the terminal UI stays clean
            let log_file = std::fs::File::create(LOG_FILE)
                .with_context(|| format!("Failed to create {}", LOG_FILE))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false)
                .init();
            let config = load_config(cli.config, cli.server_url, cli.user_id)?;
            run_play(config).await
        }
        Command::Stats { subject } => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .init();
            let config = load_config(cli.config, cli.server_url, cli.user_id)?;
            run_stats(config, subject).await
        }
    }
}

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// File, then environment, then command line.
#[instrument(skip_all)]
fn load_config(
    path: Option<PathBuf>,
    server_url: Option<String>,
    user_id: Option<String>,
) -> Result<ClientConfig> {
    let config = match path {
        Some(path) => ClientConfig::from_file(&path)?,
        None if Path::new(DEFAULT_CONFIG).exists() => ClientConfig::from_file(DEFAULT_CONFIG)?,
        None => ClientConfig::default(),
    };
    Ok(config
        .with_env_overrides()
        .with_overrides(server_url, user_id))
}

fn backend(config: &ClientConfig) -> Result<HttpBackend> {
    Ok(HttpBackend::new(
        config.server_url(),
        config.user_id().clone(),
        config.request_timeout(),
    )?)
}

/// Run the interactive client
#[instrument(skip_all, fields(server_url = %config.server_url()))]
async fn run_play(config: ClientConfig) -> Result<()> {
    info!("Starting Word Trinity");
    let session = PuzzleSession::new(backend(&config)?, *config.max_turns());
    tui::run(session).await
}

/// Print statistics for one subject
#[instrument(skip_all, fields(server_url = %config.server_url(), %subject))]
async fn run_stats(config: ClientConfig, subject: StatsSubject) -> Result<()> {
    let stats = backend(&config)?.statistics(subject).await?;

    println!("Win rate: {}%", stats.win_rate());
    println!("Average guesses: {}", stats.average_guesses());
    if subject == StatsSubject::User {
        println!("Your win rate: {}%", stats.user_win_rate());
        for (turn, (count, percent)) in stats
            .guess_distribution()
            .iter()
            .zip(stats.percentages())
            .enumerate()
        {
            let bar = "#".repeat((percent / 5.0).round() as usize);
            println!("{:>2} | {:<20} {}", turn + 1, bar, count);
        }
    }
    Ok(())
}
