use crate::api::TokenProvider;
use crate::error::{Error, Result};
use crate::models::TokenSnapshot;
use crate::utils::cache::Cache;
use crate::validation::detect_platforms;
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;

/// Resolves contract addresses into market snapshots by walking the
/// primary provider across candidate platforms, then falling back to
/// the secondary provider once. The cache is injected so callers own
/// its lifetime and tests get fresh state.
pub struct TokenResolver {
    primary: Arc<dyn TokenProvider>,
    secondary: Arc<dyn TokenProvider>,
    cache: Cache<TokenSnapshot>,
}

impl TokenResolver {
    pub fn new(
        primary: Arc<dyn TokenProvider>,
        secondary: Arc<dyn TokenProvider>,
        cache: Cache<TokenSnapshot>,
    ) -> Self {
        Self {
            primary,
            secondary,
            cache,
        }
    }

    pub async fn resolve(&self, address: &str) -> Result<TokenSnapshot> {
        let platforms = detect_platforms(address)?;
        let mut last_error: Option<Error> = None;

        for platform in platforms {
            let key = format!("{}-{}", address, platform);
            if let Some(snapshot) = self.cache.get(&key).await {
                debug!("Cache hit for {}", key);
                return Ok(snapshot);
            }

            match self.primary.try_resolve(address, Some(platform)).await {
                Ok(snapshot) => {
                    self.cache.insert(key, snapshot.clone()).await;
                    return Ok(snapshot);
                }
                Err(Error::NotFound(msg)) => {
                    debug!(
                        "{} has no {} on {}, trying next platform",
                        self.primary.name(),
                        address,
                        platform
                    );
                    last_error = Some(Error::NotFound(msg));
                }
                Err(err) => {
                    // A non-404 failure must not be masked by cycling
                    // the remaining platforms.
                    warn!(
                        "{} failed for {} on {}: {}",
                        self.primary.name(),
                        address,
                        platform,
                        err
                    );
                    last_error = Some(err);
                    break;
                }
            }
        }

        info!(
            "Falling back to {} for {}",
            self.secondary.name(),
            address
        );
        let key = format!("{}-{}", self.secondary.name(), address);
        if let Some(snapshot) = self.cache.get(&key).await {
            debug!("Cache hit for {}", key);
            return Ok(snapshot);
        }

        match self.secondary.try_resolve(address, None).await {
            Ok(snapshot) => {
                self.cache.insert(key, snapshot.clone()).await;
                Ok(snapshot)
            }
            Err(err) => {
                warn!(
                    "{} fallback failed for {}: {}",
                    self.secondary.name(),
                    address,
                    err
                );
                // The primary's last error carries the most specific
                // kind (not-found / rate-limited / network / other);
                // the secondary's only matters when the primary never
                // produced one.
                Err(last_error.unwrap_or(err))
            }
        }
    }

    /// Resolves all addresses concurrently. Output order matches input
    /// order; one failure does not affect sibling resolutions.
    pub async fn resolve_many(&self, addresses: &[String]) -> Vec<Result<TokenSnapshot>> {
        join_all(addresses.iter().map(|address| self.resolve(address))).await
    }
}
