use crate::api::TokenProvider;
use crate::config::ApiConfig;
use crate::error::{Error, Result};
use crate::models::{Platform, TokenSnapshot};
use async_trait::async_trait;
use chrono::Utc;
use log::{error, info};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

const PROVIDER_NAME: &str = "dexscreener";
const PLACEHOLDER_IMAGE: &str = "/placeholder-coin.svg";

#[derive(Debug, Deserialize)]
struct TokenPairsResponse {
    pairs: Option<Vec<PairDto>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PairDto {
    base_token: BaseTokenDto,
    /// DexScreener serializes the USD price as a decimal string.
    price_usd: Option<String>,
    price_change: Option<PriceChangeDto>,
    market_cap: Option<f64>,
    volume: Option<VolumeDto>,
    liquidity: Option<LiquidityDto>,
    pair_address: Option<String>,
    chain_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct BaseTokenDto {
    address: String,
    symbol: String,
    name: String,
    image: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PriceChangeDto {
    h24: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct VolumeDto {
    h24: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
struct LiquidityDto {
    usd: Option<f64>,
}

impl PairDto {
    fn liquidity_usd(&self) -> f64 {
        self.liquidity
            .as_ref()
            .and_then(|l| l.usd)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone)]
pub struct DexScreenerClient {
    client: Client,
    base_url: String,
}

impl DexScreenerClient {
    pub fn new(config: &ApiConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(config.request_timeout_secs))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: config.dexscreener_base_url.clone(),
        }
    }

    async fn get_token_pairs(&self, address: &str) -> Result<Vec<PairDto>> {
        let url = format!("{}/tokens/{}", self.base_url, address);
        let response = self.client.get(&url).send().await?;

        match response.status() {
            status if status.is_success() => {
                match response.json::<TokenPairsResponse>().await {
                    Ok(payload) => Ok(payload.pairs.unwrap_or_default()),
                    Err(e) => {
                        error!("Failed to parse DexScreener response for {}: {}", address, e);
                        Err(Error::MalformedResponse(e.to_string()))
                    }
                }
            }
            StatusCode::NOT_FOUND => Err(Error::NotFound(format!(
                "DexScreener has no pairs for {}",
                address
            ))),
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimited(
                "DexScreener API rate limit exceeded".to_string(),
            )),
            status => Err(Error::Provider(format!(
                "DexScreener request failed with status: {}",
                status
            ))),
        }
    }
}

#[async_trait]
impl TokenProvider for DexScreenerClient {
    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }

    async fn try_resolve(
        &self,
        address: &str,
        _platform: Option<Platform>,
    ) -> Result<TokenSnapshot> {
        let pairs = self.get_token_pairs(address).await?;
        let pair = best_pair(pairs).ok_or_else(|| {
            Error::NotFound(format!("Token {} not found on DexScreener", address))
        })?;

        info!(
            "DexScreener resolved {} via pair {} (liquidity ${:.0})",
            address,
            pair.pair_address.as_deref().unwrap_or("?"),
            pair.liquidity_usd()
        );

        Ok(TokenSnapshot {
            id: pair.base_token.address.clone(),
            symbol: pair.base_token.symbol.to_uppercase(),
            name: pair.base_token.name.clone(),
            price: pair
                .price_usd
                .as_deref()
                .and_then(|p| p.parse::<f64>().ok())
                .unwrap_or_default(),
            price_change_24h: pair
                .price_change
                .as_ref()
                .and_then(|c| c.h24)
                .unwrap_or_default(),
            market_cap: pair.market_cap.unwrap_or_default(),
            volume_24h: pair.volume.as_ref().and_then(|v| v.h24).unwrap_or_default(),
            image: pair
                .base_token
                .image
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            contract_address: Some(address.to_string()),
            pair_address: pair.pair_address.clone(),
            chain: pair.chain_id.clone(),
            last_updated: Utc::now(),
        })
    }
}

/// Picks the pair with the highest USD liquidity; ties keep the first
/// occurrence.
fn best_pair(pairs: Vec<PairDto>) -> Option<PairDto> {
    pairs.into_iter().fold(None, |best, candidate| match best {
        None => Some(candidate),
        Some(current) => {
            if candidate.liquidity_usd() > current.liquidity_usd() {
                Some(candidate)
            } else {
                Some(current)
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(symbol: &str, liquidity: Option<f64>) -> PairDto {
        PairDto {
            base_token: BaseTokenDto {
                address: "0xabc".to_string(),
                symbol: symbol.to_string(),
                name: symbol.to_string(),
                image: None,
            },
            price_usd: Some("1.25".to_string()),
            price_change: Some(PriceChangeDto { h24: Some(-3.2) }),
            market_cap: Some(1_000_000.0),
            volume: Some(VolumeDto { h24: Some(50_000.0) }),
            liquidity: liquidity.map(|usd| LiquidityDto { usd: Some(usd) }),
            pair_address: Some(format!("pair-{}", symbol)),
            chain_id: Some("ethereum".to_string()),
        }
    }

    #[test]
    fn test_best_pair_picks_highest_liquidity() {
        let selected = best_pair(vec![
            pair("A", Some(10.0)),
            pair("B", Some(500.0)),
            pair("C", Some(40.0)),
        ])
        .unwrap();
        assert_eq!(selected.base_token.symbol, "B");
    }

    #[test]
    fn test_best_pair_tie_keeps_first_occurrence() {
        let selected = best_pair(vec![
            pair("FIRST", Some(100.0)),
            pair("SECOND", Some(100.0)),
        ])
        .unwrap();
        assert_eq!(selected.base_token.symbol, "FIRST");
    }

    #[test]
    fn test_best_pair_missing_liquidity_counts_as_zero() {
        let selected = best_pair(vec![pair("A", None), pair("B", Some(1.0))]).unwrap();
        assert_eq!(selected.base_token.symbol, "B");
    }

    #[test]
    fn test_best_pair_empty_is_none() {
        assert!(best_pair(Vec::new()).is_none());
    }
}
