use crate::config::Config;
use crate::models::{Candle, PriceSeries, SeriesSource, TokenSnapshot};
use chrono::Utc;

// Helper to create a default test config
pub fn create_test_config() -> Config {
    let mut config = Config::default();
    config.api.coingecko_base_url = "http://localhost:0".to_string();
    config.api.dexscreener_base_url = "http://localhost:0".to_string();
    config.api.request_timeout_secs = 1;
    config
}

pub fn make_snapshot(id: &str, address: &str, price: f64) -> TokenSnapshot {
    TokenSnapshot {
        id: id.to_string(),
        symbol: id.to_uppercase(),
        name: id.to_string(),
        price,
        price_change_24h: 2.5,
        market_cap: 1_000_000.0,
        volume_24h: 50_000.0,
        image: String::new(),
        contract_address: Some(address.to_string()),
        pair_address: None,
        chain: None,
        last_updated: Utc::now(),
    }
}

/// Builds a synthetic-tagged series with hourly candles, one per
/// close, every volume set to `volume`.
pub fn series_from_closes(closes: &[f64], volume: f64) -> PriceSeries {
    let candles = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: 1_700_000_000_000 + (i as i64) * 3_600_000,
                open,
                high: open.max(close) * 1.01,
                low: open.min(close) * 0.99,
                close,
                volume,
            }
        })
        .collect();

    PriceSeries {
        candles,
        source: SeriesSource::Synthetic,
    }
}
