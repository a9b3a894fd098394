use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use kokoromi_monitor::config::Config;
use kokoromi_monitor::seed::seed_defaults;
use kokoromi_monitor::{HttpProber, MonitorService, Prober, open_store};

#[derive(Parser)]
#[command(version, about = "Uptime monitor for the Kokoromi upstream APIs")]
struct Cli {
    /// Path to the TOML config file (defaults to ~/.config/kokoromi/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Monitor all active APIs until interrupted
    Run,
    /// Add the configured default APIs that are not stored yet
    Seed,
    /// Probe a single URL once and print the outcome
    Probe { url: String },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    logger::init();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_ref()).context("loading configuration")?;

    match cli.command {
        Command::Run => run(config).await,
        Command::Seed => {
            let store = open_store(&config.database.path).await?;
            let added = seed_defaults(store.as_ref(), &config.defaults).await?;
            info!("API initialization completed ({} added)", added);
            Ok(())
        }
        Command::Probe { url } => {
            let outcome = HttpProber::new()?.probe(&url).await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Command::Config => {
            print!("{config}");
            Ok(())
        }
    }
}

async fn run(config: Config) -> Result<()> {
    let store = open_store(&config.database.path)
        .await
        .with_context(|| format!("opening database {}", config.database.path.display()))?;
    seed_defaults(store.as_ref(), &config.defaults).await?;

    let service = MonitorService::new(store, Arc::new(HttpProber::new()?));
    service.initialize().await?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    service.shutdown().await;

    Ok(())
}
