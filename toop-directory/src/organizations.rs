use std::sync::Arc;

use toop_cache::{BoundedRecencyCache, CacheStats, RecordFetcher};
use toop_core::Organization;

/// Capacity-bounded memo of registry lookups, keyed by organization number.
///
/// Upstream failures are logged and answered with `None`; they are never
/// cached, so the next lookup for the same number tries again.
pub struct OrganizationCache {
    cache: BoundedRecencyCache<String, Organization>,
    fetcher: Arc<dyn RecordFetcher<String, Organization>>,
}

impl OrganizationCache {
    pub fn new(fetcher: Arc<dyn RecordFetcher<String, Organization>>, capacity: usize) -> Self {
        Self {
            cache: BoundedRecencyCache::new("organizations", capacity),
            fetcher,
        }
    }

    pub async fn get(&self, organization_number: &str) -> Option<Organization> {
        let fetcher = &self.fetcher;
        let result = self
            .cache
            .get_or_fetch(organization_number.to_string(), |key| async move {
                fetcher.fetch_one(&key).await
            })
            .await;

        match result {
            Ok(organization) => organization,
            Err(error) => {
                tracing::error!(organization_number, %error, "organization lookup failed");
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub async fn stats(&self) -> CacheStats {
        self.cache.stats().await
    }
}

impl std::fmt::Debug for OrganizationCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrganizationCache")
            .field("cache", &self.cache)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use toop_core::{request_failed, UpstreamError};

    struct Registry {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RecordFetcher<String, Organization> for Registry {
        async fn fetch_one(&self, key: &String) -> Result<Option<Organization>, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match key.as_str() {
                "974760673" => Ok(Some(Organization::new("974760673", "Brreg"))),
                "500000000" => Err(request_failed("registry", 500, "boom")),
                _ => Ok(None),
            }
        }
    }

    #[tokio::test]
    async fn test_caches_found_organizations_only() {
        let registry = Arc::new(Registry {
            calls: AtomicUsize::new(0),
        });
        let cache = OrganizationCache::new(registry.clone(), 10);

        assert!(cache.get("974760673").await.is_some());
        assert!(cache.get("974760673").await.is_some());
        assert!(cache.get("123456789").await.is_none());
        assert!(cache.get("500000000").await.is_none());
        assert!(cache.get("500000000").await.is_none());

        assert_eq!(cache.len(), 1);
        assert_eq!(registry.calls.load(Ordering::SeqCst), 4);
        assert_eq!(cache.stats().await.hits, 1);
    }
}
