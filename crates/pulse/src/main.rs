//! pulse - EventPulse CLI
//!
//! Track topics with AI-generated intelligence updates, read a chronological
//! event log per topic, chat about it, and produce cross-topic briefings.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod cli;
mod commands;
mod config;
mod context;
mod error;
mod render;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::from_default_env()
                .add_directive("pulse=info".parse()?)
                .add_directive("pulse_core=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = config::Config::load()?;

    // Execute command
    match cli.command {
        Commands::Topic(cmd) => commands::topic::execute(cmd, &config),
        Commands::Refresh { id, all } => commands::refresh::execute(id, all, &config).await,
        Commands::Watch { interval } => commands::watch::execute(interval, &config).await,
        Commands::Briefing(cmd) => commands::briefing::execute(cmd, &config).await,
        Commands::Chat { id } => commands::chat::interactive(&id, &config).await,
        Commands::Ask { id, question } => commands::chat::ask(&id, &question, &config).await,
        Commands::Clear { yes } => commands::clear::execute(yes, &config),
        Commands::Config(cmd) => commands::config::execute(cmd, &config),
        Commands::Doctor => commands::doctor::execute(&config),
        Commands::Version => {
            println!("pulse {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
