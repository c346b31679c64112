use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use covidash_core::AppConfig;

mod commands;

#[derive(Parser)]
#[command(name = "covidash")]
#[command(version, about = "Scheduled refresh engine for a public-health dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the refresh engine until interrupted
    Run,
    /// Refresh both feeds immediately and print the result
    Fetch,
    /// Show the configured updates and their next firing times
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();

    // Load configuration
    let config = Arc::new(AppConfig::load()?);

    match cli.command {
        Some(Commands::Run) | None => commands::run::run(config).await,
        Some(Commands::Fetch) => commands::fetch::run(config).await,
        Some(Commands::Status) => commands::status::run(&config),
    }
}
