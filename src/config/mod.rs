use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub cache: CacheConfig,
    pub prediction: PredictionConfig,
    #[serde(default)]
    pub watchlist: WatchlistConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ApiConfig {
    pub coingecko_base_url: String,
    pub dexscreener_base_url: String,
    pub coingecko_api_key: Option<String>,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CacheConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PredictionConfig {
    /// Days of price history fed into the indicator engine.
    pub history_days: u32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct WatchlistConfig {
    pub addresses: Vec<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config = toml::from_str(&raw)?;
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                coingecko_base_url: "https://api.coingecko.com/api/v3".to_string(),
                dexscreener_base_url: "https://api.dexscreener.com/latest/dex".to_string(),
                coingecko_api_key: None,
                request_timeout_secs: 10,
            },
            cache: CacheConfig { ttl_secs: 60 },
            prediction: PredictionConfig { history_days: 1 },
            watchlist: WatchlistConfig::default(),
        }
    }
}
