use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Append logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Resolve a contract address into a market snapshot
    Resolve { address: String },
    /// Predict short-term price direction for a contract address
    Predict { address: String },
    /// Resolve tracked addresses concurrently (defaults to the
    /// configured watchlist)
    Watch { addresses: Vec<String> },
    /// List top tokens by market capitalization
    Popular {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}
