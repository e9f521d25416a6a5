//! Read-through cache for resolving short codes
//!
//! Only found mappings are cached. Expiry is checked by the caller on every lookup, a cached
//! mapping is never trusted to still be active.
//!
//! Removed short codes are remembered for as long as a cached mapping could live. A lookup
//! that read the storage before a delete committed may insert afterwards; the insert then
//! sees the marker and takes itself out again.

use std::time::Duration;

use moka::future::Cache;

use crate::mappings::UrlMapping;

/// In-memory cache of mappings by short code
#[derive(Clone, Debug)]
pub struct MappingCache {
    cache: Cache<String, UrlMapping>,
    removed: Cache<String, ()>,
}

impl MappingCache {
    /// Create a cache holding at most `max_capacity` mappings, each for at most `ttl`
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        let removed = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache, removed }
    }

    pub async fn get(&self, short_code: &str) -> Option<UrlMapping> {
        let mapping = self.cache.get(short_code).await;

        if mapping.is_some() {
            tracing::trace!("Cache hit for: {short_code}");
        }

        mapping
    }

    /// Cache a mapping read from the storage
    ///
    /// Must be called after the storage read, never before
    pub async fn insert(&self, mapping: UrlMapping) {
        let short_code = mapping.short_code.clone();

        self.cache.insert(short_code.clone(), mapping).await;

        // a remove may have run between the storage read and the insert
        if self.removed.contains_key(&short_code) {
            tracing::debug!("Not caching removed short code: {short_code}");

            self.cache.invalidate(&short_code).await;
        }
    }

    /// Forget a short code whose mapping was deleted from the storage
    ///
    /// Must be called after the storage delete committed
    pub async fn remove(&self, short_code: &str) {
        self.removed.insert(short_code.to_string(), ()).await;
        self.cache.invalidate(short_code).await;
    }
}

impl Default for MappingCache {
    fn default() -> Self {
        Self::new(10_000, Duration::from_secs(60))
    }
}
