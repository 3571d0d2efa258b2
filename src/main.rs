use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod app;
mod commands;
mod config;
mod db;

use commands::{
    ApiCommand, CacheCommand, ConfigCommand, QueueCommand, StatusCommand, SyncCommand,
};
use config::Config;

#[derive(Parser)]
#[command(name = "nibble")]
#[command(version)]
#[command(about = "Offline-first client for the Nibble nutrition API", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Treat the network as unavailable for this invocation
    #[arg(long, global = true)]
    offline: bool,

    /// Log progress to stderr
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show connectivity and pending-sync state
    Status(StatusCommand),

    /// Send pending offline requests to the server
    Sync(SyncCommand),

    /// Inspect and edit the offline request queue
    Queue(QueueCommand),

    /// Inspect and clear cached data
    Cache(CacheCommand),

    /// Call the API with offline fallback
    Api(ApiCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "nibble=info,nibble_core=info"
    } else {
        "nibble=warn,nibble_core=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config)?;

    match cli.command {
        Some(Commands::Status(cmd)) => cmd.run(&config, cli.offline).await?,
        Some(Commands::Sync(cmd)) => cmd.run(&config, cli.offline).await?,
        Some(Commands::Queue(cmd)) => cmd.run(&config).await?,
        Some(Commands::Cache(cmd)) => cmd.run(&config).await?,
        Some(Commands::Api(cmd)) => cmd.run(&config, cli.offline).await?,
        Some(Commands::Config(cmd)) => cmd.run(&config)?,
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}
