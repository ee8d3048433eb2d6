//! Fixed-capacity key/value cache with least-recently-accessed eviction.
//!
//! A single async mutex guards the whole map and is held across the upstream
//! fetch, so lookups for different keys are serialized. The entry count is
//! mirrored in an atomic so `len` never waits on an in-flight fetch.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::Mutex;

use crate::traits::CacheStats;

struct RecencyEntry<V> {
    value: V,
    last_accessed: u64,
}

struct RecencyState<K, V> {
    entries: HashMap<K, RecencyEntry<V>>,
    /// Logical clock; strictly increasing so no two accesses tie.
    tick: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K: Eq + Hash + Clone, V> RecencyState<K, V> {
    fn next_tick(&mut self) -> u64 {
        self.tick += 1;
        self.tick
    }

    fn evict_over(&mut self, capacity: usize) -> Vec<K> {
        let mut evicted = Vec::new();
        while self.entries.len() > capacity {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_accessed)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    self.entries.remove(&key);
                    self.evictions += 1;
                    evicted.push(key);
                }
                None => break,
            }
        }
        evicted
    }
}

pub struct BoundedRecencyCache<K, V> {
    name: &'static str,
    capacity: usize,
    state: Mutex<RecencyState<K, V>>,
    /// Written only while `state` is locked.
    size: AtomicUsize,
}

impl<K, V> BoundedRecencyCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send,
    V: Clone + Send,
{
    pub fn new(name: &'static str, capacity: usize) -> Self {
        Self {
            name,
            capacity,
            state: Mutex::new(RecencyState {
                entries: HashMap::with_capacity(capacity.min(1024)),
                tick: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            size: AtomicUsize::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Return the cached value for `key`, or fetch, insert and return it.
    ///
    /// A hit refreshes the entry's access time. `Ok(None)` and errors from
    /// `fetch` are passed through and nothing is cached for them. After an
    /// insert, entries with the oldest access time are evicted until the
    /// cache is back within capacity.
    pub async fn get_or_fetch<F, Fut, E>(&self, key: K, fetch: F) -> Result<Option<V>, E>
    where
        F: FnOnce(K) -> Fut,
        Fut: Future<Output = Result<Option<V>, E>>,
    {
        let mut state = self.state.lock().await;

        let tick = state.next_tick();
        if let Some(entry) = state.entries.get_mut(&key) {
            entry.last_accessed = tick;
            let value = entry.value.clone();
            state.hits += 1;
            return Ok(Some(value));
        }
        state.misses += 1;

        let fetched = fetch(key.clone()).await?;
        let Some(value) = fetched else {
            tracing::debug!(cache = self.name, ?key, "no record upstream, nothing cached");
            return Ok(None);
        };

        let tick = state.next_tick();
        state.entries.insert(
            key.clone(),
            RecencyEntry {
                value: value.clone(),
                last_accessed: tick,
            },
        );
        for evicted in state.evict_over(self.capacity) {
            tracing::debug!(cache = self.name, key = ?evicted, "evicted least recently accessed entry");
        }
        self.size.store(state.entries.len(), Ordering::Release);

        Ok(Some(value))
    }

    /// Cached value without touching its access time.
    pub async fn peek(&self, key: &K) -> Option<V> {
        self.state
            .lock()
            .await
            .entries
            .get(key)
            .map(|entry| entry.value.clone())
    }

    pub async fn contains(&self, key: &K) -> bool {
        self.state.lock().await.entries.contains_key(key)
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        let mut state = self.state.lock().await;
        let removed = state.entries.remove(key).is_some();
        self.size.store(state.entries.len(), Ordering::Release);
        removed
    }

    pub async fn clear(&self) {
        let mut state = self.state.lock().await;
        state.entries.clear();
        self.size.store(0, Ordering::Release);
    }

    /// Number of cached entries. Does not take the lock.
    pub fn len(&self) -> usize {
        self.size.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub async fn stats(&self) -> CacheStats {
        let state = self.state.lock().await;
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entry_count: state.entries.len() as u64,
            evictions: state.evictions,
        }
    }
}

impl<K, V> std::fmt::Debug for BoundedRecencyCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug + Send,
    V: Clone + Send,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundedRecencyCache")
            .field("name", &self.name)
            .field("capacity", &self.capacity)
            .field("len", &self.len())
            .finish()
    }
}
