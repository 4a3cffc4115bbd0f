use crate::api::TokenProvider;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{Candle, Platform, TokenSnapshot};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const PROVIDER_NAME: &str = "coingecko";

/// Margins used to widen a trade price into a plausible candle when the
/// chart endpoint supplies no OHLC data.
const SYNTH_HIGH_MARGIN: f64 = 1.02;
const SYNTH_LOW_MARGIN: f64 = 0.98;

#[derive(Debug, Deserialize)]
struct ContractCoin {
    id: String,
    symbol: String,
    name: String,
    market_data: ContractMarketData,
    image: Option<CoinImage>,
}

#[derive(Debug, Deserialize, Default)]
struct ContractMarketData {
    current_price: UsdValue,
    price_change_percentage_24h: Option<f64>,
    market_cap: UsdValue,
    total_volume: UsdValue,
}

#[derive(Debug, Deserialize, Default)]
struct UsdValue {
    usd: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CoinImage {
    small: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MarketChart {
    prices: Vec<(f64, f64)>,
    total_volumes: Vec<(f64, f64)>,
}

#[derive(Debug, Deserialize)]
struct MarketRow {
    id: String,
    symbol: String,
    name: String,
    current_price: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    market_cap: Option<f64>,
    total_volume: Option<f64>,
    image: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl CoinGeckoClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.coingecko_base_url.clone(),
            api_key: config.coingecko_api_key.clone(),
        }
    }

    async fn make_request<T: for<'de> Deserialize<'de>>(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        let mut request = self.client.get(&url).query(params);
        if let Some(key) = &self.api_key {
            request = request.header("X-CG-Pro-API-Key", key);
        }

        let response = request.send().await?;
        match response.status() {
            status if status.is_success() => match response.json::<T>().await {
                Ok(payload) => Ok(payload),
                Err(e) => {
                    error!("Failed to parse CoinGecko response from {}: {}", endpoint, e);
                    Err(Error::MalformedResponse(e.to_string()))
                }
            },
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!(
                "CoinGecko has no data for {}",
                endpoint
            ))),
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited(
                "CoinGecko API rate limit exceeded".to_string(),
            )),
            status => Err(Error::Provider(format!(
                "CoinGecko request failed with status: {}",
                status
            ))),
        }
    }

    /// Charted price history for a coin id, hourly below one day and
    /// daily above. The endpoint returns trade prices only, so OHLC is
    /// completed from neighbouring closes.
    pub async fn get_market_chart(&self, coin_id: &str, days: u32) -> Result<Vec<Candle>> {
        let interval = if days <= 1 { "hourly" } else { "daily" };
        let days_param = days.to_string();
        let chart: MarketChart = self
            .make_request(
                &format!("coins/{}/market_chart", coin_id),
                &[
                    ("vs_currency", "usd"),
                    ("days", &days_param),
                    ("interval", interval),
                ],
            )
            .await?;

        info!(
            "Fetched {} chart points for {} over {} days",
            chart.prices.len(),
            coin_id,
            days
        );
        Ok(candles_from_chart(&chart.prices, &chart.total_volumes))
    }

    /// Top tokens by market capitalization.
    pub async fn get_top_tokens(&self, per_page: u32, page: u32) -> Result<Vec<TokenSnapshot>> {
        let per_page_param = per_page.to_string();
        let page_param = page.to_string();
        let rows: Vec<MarketRow> = self
            .make_request(
                "coins/markets",
                &[
                    ("vs_currency", "usd"),
                    ("order", "market_cap_desc"),
                    ("per_page", &per_page_param),
                    ("page", &page_param),
                    ("price_change_percentage", "24h"),
                ],
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| TokenSnapshot {
                id: row.id,
                symbol: row.symbol.to_uppercase(),
                name: row.name,
                price: row.current_price.unwrap_or_default(),
                price_change_24h: row.price_change_percentage_24h.unwrap_or_default(),
                market_cap: row.market_cap.unwrap_or_default(),
                volume_24h: row.total_volume.unwrap_or_default(),
                image: row.image.unwrap_or_default(),
                contract_address: None,
                pair_address: None,
                chain: None,
                last_updated: Utc::now(),
            })
            .collect())
    }
}

#[async_trait]
impl TokenProvider for CoinGeckoClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn try_resolve(
        &self,
        address: &str,
        platform: Option<Platform>,
    ) -> Result<TokenSnapshot> {
        let platform = platform.ok_or_else(|| {
            Error::Provider("CoinGecko contract lookups require a platform".to_string())
        })?;

        let coin: ContractCoin = self
            .make_request(
                &format!("coins/{}/contract/{}", platform.as_str(), address),
                &[],
            )
            .await?;

        info!("CoinGecko resolved {} on {} as {}", address, platform, coin.id);
        Ok(TokenSnapshot {
            id: coin.id,
            symbol: coin.symbol.to_uppercase(),
            name: coin.name,
            price: coin.market_data.current_price.usd.unwrap_or_default(),
            price_change_24h: coin
                .market_data
                .price_change_percentage_24h
                .unwrap_or_default(),
            market_cap: coin.market_data.market_cap.usd.unwrap_or_default(),
            volume_24h: coin.market_data.total_volume.usd.unwrap_or_default(),
            image: coin.image.and_then(|i| i.small).unwrap_or_default(),
            contract_address: Some(address.to_string()),
            pair_address: None,
            chain: None,
            last_updated: Utc::now(),
        })
    }
}

/// Builds candles from the parallel `prices`/`total_volumes` arrays.
/// Open is the prior close (first candle opens at its own close); the
/// high/low margins are widened to contain the open so the candle
/// invariant holds across large inter-sample gaps.
pub(crate) fn candles_from_chart(prices: &[(f64, f64)], volumes: &[(f64, f64)]) -> Vec<Candle> {
    let mut candles = Vec::with_capacity(prices.len());
    let mut prev_close = match prices.first() {
        Some(&(_, first)) => first,
        None => return candles,
    };

    for (i, &(ts, close)) in prices.iter().enumerate() {
        let volume = volumes.get(i).map(|&(_, v)| v).unwrap_or_default();
        let open = prev_close;
        candles.push(Candle {
            timestamp: ts as i64,
            open,
            high: (close * SYNTH_HIGH_MARGIN).max(open),
            low: (close * SYNTH_LOW_MARGIN).min(open),
            close,
            volume,
        });
        prev_close = close;
    }
    candles
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candles_from_chart_completes_ohlc() {
        let prices = vec![(1_000.0, 10.0), (2_000.0, 11.0), (3_000.0, 9.0)];
        let volumes = vec![(1_000.0, 100.0), (2_000.0, 120.0), (3_000.0, 90.0)];
        let candles = candles_from_chart(&prices, &volumes);

        assert_eq!(candles.len(), 3);
        // First candle opens at its own close.
        assert_eq!(candles[0].open, 10.0);
        assert_eq!(candles[1].open, 10.0);
        assert_eq!(candles[2].open, 11.0);
        assert_eq!(candles[1].volume, 120.0);
        for candle in &candles {
            assert!(candle.high >= candle.open.max(candle.close));
            assert!(candle.low <= candle.open.min(candle.close));
        }
    }

    #[test]
    fn test_candles_from_chart_widens_band_to_prior_close() {
        // The drop from 10.0 to 5.0 exceeds the 2% margin: the open
        // must still sit inside the candle.
        let prices = vec![(1_000.0, 10.0), (2_000.0, 5.0)];
        let volumes = vec![(1_000.0, 1.0), (2_000.0, 1.0)];
        let candles = candles_from_chart(&prices, &volumes);

        assert_eq!(candles[1].open, 10.0);
        assert_eq!(candles[1].high, 10.0);
        assert!(candles[1].low <= 5.0);
    }

    #[test]
    fn test_candles_from_chart_empty_input() {
        assert!(candles_from_chart(&[], &[]).is_empty());
    }

    #[test]
    fn test_candles_from_chart_missing_volume_defaults_to_zero() {
        let prices = vec![(1_000.0, 10.0), (2_000.0, 11.0)];
        let volumes = vec![(1_000.0, 100.0)];
        let candles = candles_from_chart(&prices, &volumes);
        assert_eq!(candles[1].volume, 0.0);
    }
}
