use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized market view of a token, regardless of which provider
/// resolved it. A new resolution always produces a new snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenSnapshot {
    /// Provider-native identifier: a CoinGecko coin id for primary
    /// resolutions, the base token address for DexScreener ones.
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: f64,
    pub price_change_24h: f64,
    pub market_cap: f64,
    pub volume_24h: f64,
    pub image: String,
    pub contract_address: Option<String>,
    /// Chart linkage, present only on DexScreener resolutions.
    pub pair_address: Option<String>,
    pub chain: Option<String>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Epoch milliseconds, matching the provider chart arrays.
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Whether a series was observed from a provider or fabricated by the
/// synthetic fallback. Carried through to the prediction output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesSource {
    Observed,
    Synthetic,
}

/// Candles in ascending timestamp order, no duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceSeries {
    pub candles: Vec<Candle>,
    pub source: SeriesSource,
}

impl PriceSeries {
    pub fn empty() -> Self {
        Self {
            candles: Vec::new(),
            source: SeriesSource::Synthetic,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.candles.iter().map(|c| c.volume).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.close)
    }
}

/// Platforms the primary provider can look a contract address up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Ethereum,
    PolygonPos,
    BinanceSmartChain,
    Solana,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Ethereum => "ethereum",
            Platform::PolygonPos => "polygon-pos",
            Platform::BinanceSmartChain => "binance-smart-chain",
            Platform::Solana => "solana",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
