use anyhow::Result;
use clap::Parser;
use log::{info, warn};

use token_oracle::cli::{Cli, Command};
use token_oracle::config::Config;
use token_oracle::engine::TokenEngine;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    if let Some(log_file) = &cli.log_file {
        token_oracle::logging::init(log_file)?;
    } else if cli.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::init();
    }

    // Load configuration
    let config_path = cli.config.unwrap_or_else(|| "config/config.toml".into());
    let config = match Config::load(&config_path) {
        Ok(cfg) => {
            info!("Configuration loaded from {:?}", config_path);
            cfg
        }
        Err(e) => {
            warn!(
                "Failed to load configuration from {:?} ({}), using defaults",
                config_path, e
            );
            Config::default()
        }
    };

    let engine = TokenEngine::new(&config);

    match cli.command {
        Command::Resolve { address } => {
            let snapshot = engine.resolve(&address).await?;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        Command::Predict { address } => {
            let prediction = engine.predict(&address).await;
            println!("{}", serde_json::to_string_pretty(&prediction)?);
        }
        Command::Watch { addresses } => {
            let addresses = if addresses.is_empty() {
                config.watchlist.addresses.clone()
            } else {
                addresses
            };
            if addresses.is_empty() {
                warn!("Watchlist is empty - nothing to resolve");
                return Ok(());
            }

            info!("Resolving {} tracked tokens", addresses.len());
            let results = engine.resolve_many(&addresses).await;
            for (address, result) in addresses.iter().zip(results) {
                match result {
                    Ok(snapshot) => println!("{}", serde_json::to_string_pretty(&snapshot)?),
                    Err(e) => eprintln!("{}: {}", address, e),
                }
            }
        }
        Command::Popular { limit } => {
            let tokens = engine.popular(limit).await?;
            println!("{}", serde_json::to_string_pretty(&tokens)?);
        }
    }

    Ok(())
}
