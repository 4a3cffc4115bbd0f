use crate::api::{CoinGeckoClient, TokenProvider};
use crate::models::{Candle, PriceSeries, SeriesSource, TokenSnapshot};
use crate::resolver::TokenResolver;
use chrono::Utc;
use log::{info, warn};
use rand::Rng;
use std::sync::Arc;

/// Real charts shorter than this are discarded in favour of the
/// synthetic fallback so the indicator windows stay meaningful.
pub const MIN_REAL_CANDLES: usize = 50;

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;

/// Acquires a price series for an address: real provider history when
/// the token is known to the primary provider, a synthesized series
/// anchored on the secondary's best pair otherwise. Never fails; an
/// empty series signals that no source was usable.
pub struct HistoryBuilder {
    resolver: Arc<TokenResolver>,
    coingecko: Arc<CoinGeckoClient>,
    secondary: Arc<dyn TokenProvider>,
}

impl HistoryBuilder {
    pub fn new(
        resolver: Arc<TokenResolver>,
        coingecko: Arc<CoinGeckoClient>,
        secondary: Arc<dyn TokenProvider>,
    ) -> Self {
        Self {
            resolver,
            coingecko,
            secondary,
        }
    }

    pub async fn history(&self, address: &str, days: u32) -> PriceSeries {
        let snapshot = match self.resolver.resolve(address).await {
            Ok(snapshot) => Some(snapshot),
            Err(err) => {
                warn!("History resolution failed for {}: {}", address, err);
                None
            }
        };

        // A primary-origin snapshot carries a coin id the charting
        // endpoint understands.
        if let Some(snap) = snapshot.as_ref().filter(|s| s.pair_address.is_none()) {
            match self.coingecko.get_market_chart(&snap.id, days).await {
                Ok(candles) if candles.len() >= MIN_REAL_CANDLES => {
                    return PriceSeries {
                        candles,
                        source: SeriesSource::Observed,
                    };
                }
                Ok(candles) => {
                    info!(
                        "Chart for {} too short ({} candles), synthesizing instead",
                        snap.id,
                        candles.len()
                    );
                }
                Err(err) => {
                    warn!("Chart fetch failed for {}: {}", snap.id, err);
                }
            }
        }

        let anchor = match snapshot {
            Some(snap) if snap.pair_address.is_some() => Some(snap),
            _ => match self.secondary.try_resolve(address, None).await {
                Ok(snap) => Some(snap),
                Err(err) => {
                    warn!(
                        "{} anchor lookup failed for {}: {}",
                        self.secondary.name(),
                        address,
                        err
                    );
                    None
                }
            },
        };

        match anchor {
            Some(snap) if snap.price > 0.0 => {
                info!(
                    "Synthesizing {}-day history for {} anchored at ${}",
                    days, address, snap.price
                );
                let candles = synthesize_series(&snap, days, Utc::now().timestamp_millis(), &mut rand::thread_rng());
                PriceSeries {
                    candles,
                    source: SeriesSource::Synthetic,
                }
            }
            _ => {
                warn!("No usable history source for {}", address);
                PriceSeries::empty()
            }
        }
    }
}

/// Walks backward from the anchor price, perturbing each step by a
/// trend component (stronger further in the past, fading toward the
/// present) plus noise in a 2-8% band, clamped to 0.1x-10x of the
/// running price. Volume is drawn as 30-100% of the pair's 24h volume.
/// The result is returned oldest-first with the final close at the
/// anchor price.
pub fn synthesize_series(
    anchor: &TokenSnapshot,
    days: u32,
    now_ms: i64,
    rng: &mut impl Rng,
) -> Vec<Candle> {
    let (points_per_day, step_ms) = if days <= 1 { (24, HOUR_MS) } else { (1, DAY_MS) };
    let count = ((days as usize) * points_per_day).max(MIN_REAL_CANDLES);

    let direction = if anchor.price_change_24h >= 0.0 { 1.0 } else { -1.0 };
    let strength = (anchor.price_change_24h.abs() / 100.0).max(0.1);

    let mut candles = Vec::with_capacity(count);
    let mut price = anchor.price;

    for i in 0..count {
        let close = price;
        let volatility = rng.gen_range(0.02..0.08);
        // Steps nearer the present carry less of the 24h trend.
        let fade = (i + 1) as f64 / count as f64;
        let drift = direction * strength * volatility * fade;
        let noise = (rng.gen::<f64>() - 0.5) * 2.0 * volatility;
        let open = (close * (1.0 - drift + noise)).clamp(close * 0.1, close * 10.0);

        let high = close.max(open) * (1.0 + rng.gen::<f64>() * 0.02);
        let low = close.min(open) * (1.0 - rng.gen::<f64>() * 0.02);
        let volume = anchor.volume_24h * rng.gen_range(0.3..1.0);

        candles.push(Candle {
            timestamp: now_ms - (i as i64) * step_ms,
            open,
            high,
            low,
            close,
            volume,
        });
        price = open;
    }

    candles.reverse();
    candles
}
