use crate::analysis::indicators::Indicators;
use crate::analysis::prediction::{self, Confidence, Prediction};
use crate::api::{CoinGeckoClient, DexScreenerClient};
use crate::config::Config;
use crate::error::Result;
use crate::history::HistoryBuilder;
use crate::models::{PriceSeries, SeriesSource, TokenSnapshot};
use crate::resolver::TokenResolver;
use crate::utils::cache::Cache;
use log::{info, warn};
use std::sync::Arc;
use std::time::Duration;

/// Process-wide entry point owning the resolver/cache pair and the
/// history pipeline. Constructed explicitly from configuration; there
/// is no implicit global instance.
pub struct TokenEngine {
    resolver: Arc<TokenResolver>,
    history: HistoryBuilder,
    coingecko: Arc<CoinGeckoClient>,
    history_days: u32,
}

impl TokenEngine {
    pub fn new(config: &Config) -> Self {
        let coingecko = Arc::new(CoinGeckoClient::new(&config.api));
        let dexscreener = Arc::new(DexScreenerClient::new(&config.api));
        let cache = Cache::new(Duration::from_secs(config.cache.ttl_secs));

        let resolver = Arc::new(TokenResolver::new(
            coingecko.clone(),
            dexscreener.clone(),
            cache,
        ));
        let history = HistoryBuilder::new(resolver.clone(), coingecko.clone(), dexscreener);

        Self {
            resolver,
            history,
            coingecko,
            history_days: config.prediction.history_days,
        }
    }

    pub async fn resolve(&self, address: &str) -> Result<TokenSnapshot> {
        self.resolver.resolve(address).await
    }

    pub async fn resolve_many(&self, addresses: &[String]) -> Vec<Result<TokenSnapshot>> {
        self.resolver.resolve_many(addresses).await
    }

    /// Chains history acquisition, indicator computation and scoring.
    /// Never errors: any internal failure degrades to the fixed
    /// neutral low-confidence result.
    pub async fn predict(&self, address: &str) -> Prediction {
        let snapshot = match self.resolver.resolve(address).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!("Prediction degraded, resolution failed for {}: {}", address, err);
                return prediction::insufficient_data();
            }
        };

        let series = self.history.history(address, self.history_days).await;
        info!(
            "Scoring {} from {} candles ({:?})",
            snapshot.symbol,
            series.len(),
            series.source
        );
        predict_from_series(&series, snapshot.price)
    }

    /// Top tokens by market capitalization from the primary provider.
    pub async fn popular(&self, limit: u32) -> Result<Vec<TokenSnapshot>> {
        self.coingecko.get_top_tokens(limit, 1).await
    }
}

/// The network-free tail of the prediction pipeline. A synthetic
/// series keeps its numeric score and direction, but the confidence
/// tier is knocked down one step and the provenance is flagged.
pub(crate) fn predict_from_series(series: &PriceSeries, current_price: f64) -> Prediction {
    let synthetic = series.source == SeriesSource::Synthetic;

    let indicators = match Indicators::compute(series) {
        Ok(indicators) => indicators,
        Err(err) => {
            info!("Prediction degraded: {}", err);
            let mut prediction = prediction::insufficient_data();
            prediction.synthetic = synthetic;
            return prediction;
        }
    };

    let mut prediction = prediction::score(&indicators, current_price);
    if synthetic {
        prediction.synthetic = true;
        prediction.confidence = match prediction.confidence {
            Confidence::High => Confidence::Medium,
            _ => Confidence::Low,
        };
        prediction
            .reasoning
            .push("Synthesized price history - confidence reduced".to_string());
    }
    prediction
}
