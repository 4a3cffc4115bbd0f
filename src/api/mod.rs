use crate::error::Result;
use crate::models::{Platform, TokenSnapshot};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub mod coingecko;
pub mod dexscreener;

pub use coingecko::CoinGeckoClient;
pub use dexscreener::DexScreenerClient;

/// A single upstream market-data source. The resolver iterates
/// providers instead of hard-coding per-provider control flow.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait TokenProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// One resolution attempt, no retries. Platform-scoped providers
    /// receive `Some(platform)`; platform-less ones are called with
    /// `None` and must ignore it.
    async fn try_resolve(
        &self,
        address: &str,
        platform: Option<Platform>,
    ) -> Result<TokenSnapshot>;
}
