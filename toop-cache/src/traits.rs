//! Fetcher traits and cache statistics.

use async_trait::async_trait;
use toop_core::UpstreamError;

pub use toop_core::Keyed;

/// Bulk source for a reference data list.
///
/// This trait abstracts over the actual upstream service, allowing the cache
/// to be driven by an HTTP client in production and a static list in tests.
#[async_trait]
pub trait ListFetcher<R>: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<R>, UpstreamError>;
}

/// Single-key source for on-demand lookups. `Ok(None)` means the upstream
/// service answered but has no record for the key.
#[async_trait]
pub trait RecordFetcher<K, V>: Send + Sync
where
    K: Sync,
{
    async fn fetch_one(&self, key: &K) -> Result<Option<V>, UpstreamError>;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
    /// Number of evictions due to capacity.
    pub evictions: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
