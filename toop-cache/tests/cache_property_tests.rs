//! Property tests for the cache invariants.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use proptest::prelude::*;
use toop_cache::{BoundedRecencyCache, Keyed, ListFetcher, RefreshCoalescingCache};
use toop_core::UpstreamError;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(4)
        .enable_time()
        .build()
        .expect("runtime")
}

proptest! {
    /// Size never exceeds capacity, and every eviction removes the entry with
    /// the oldest access among those present, checked against a reference model.
    #[test]
    fn prop_recency_eviction_matches_model(
        capacity in 1usize..8,
        keys in prop::collection::vec(0u8..16, 1..64),
    ) {
        let rt = runtime();
        rt.block_on(async {
            let cache = BoundedRecencyCache::new("prop", capacity);
            let mut model: HashMap<u8, u64> = HashMap::new();
            let mut clock = 0u64;

            for key in keys {
                clock += 1;
                cache
                    .get_or_fetch(key, |k| async move { Ok::<_, Infallible>(Some(k)) })
                    .await
                    .unwrap();

                model.insert(key, clock);
                while model.len() > capacity {
                    let oldest = *model.iter().min_by_key(|(_, t)| **t).map(|(k, _)| k).unwrap();
                    model.remove(&oldest);
                }

                prop_assert!(cache.len() <= capacity);
                for k in model.keys() {
                    prop_assert!(cache.contains(k).await);
                }
                prop_assert_eq!(cache.len(), model.len());
            }
            Ok(())
        })?;
    }

    /// Any burst of concurrent refresh attempts inside one TTL window fetches once.
    #[test]
    fn prop_concurrent_refreshes_fetch_at_most_once(callers in 1usize..48) {
        let rt = runtime();
        rt.block_on(async {
            let fetcher = Arc::new(SlowFetcher { calls: AtomicUsize::new(0) });
            let cache = Arc::new(RefreshCoalescingCache::new(
                "prop",
                fetcher.clone(),
                Duration::from_secs(12 * 60 * 60),
            ));

            let handles: Vec<_> = (0..callers)
                .map(|_| {
                    let cache = cache.clone();
                    tokio::spawn(async move { cache.maybe_refresh(false).await })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap();
            }

            prop_assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
            prop_assert_eq!(cache.snapshot().len(), 1);
            Ok(())
        })?;
    }
}

#[derive(Clone)]
struct Entry(&'static str);

impl Keyed for Entry {
    fn cache_key(&self) -> String {
        self.0.to_string()
    }
}

struct SlowFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl ListFetcher<Entry> for SlowFetcher {
    async fn fetch_all(&self) -> Result<Vec<Entry>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(20)).await;
        Ok(vec![Entry("NO")])
    }
}
