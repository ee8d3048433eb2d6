//! Time-boxed, refresh-coalescing cache for bulk reference data.
//!
//! Readers never wait on a refresh they did not start. The caller that wins
//! the single-flight flag fetches the full list and swaps in a new snapshot;
//! everyone else keeps reading the previous one until the swap happens.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::Instant;
use toop_core::Timestamp;

use crate::traits::{Keyed, ListFetcher};

// ============================================================================
// SNAPSHOT
// ============================================================================

/// One complete result of a bulk fetch, indexed by record key.
///
/// When several records share a key, the first one in fetch order owns the
/// index slot. All records stay visible through [`Snapshot::records`].
#[derive(Debug)]
pub struct Snapshot<R> {
    records: Vec<R>,
    index: HashMap<String, usize>,
    fetched_at: Option<Timestamp>,
}

impl<R: Keyed> Snapshot<R> {
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            fetched_at: None,
        }
    }

    fn build(records: Vec<R>, fetched_at: Timestamp) -> Self {
        let mut index = HashMap::with_capacity(records.len());
        for (position, record) in records.iter().enumerate() {
            index.entry(record.cache_key()).or_insert(position);
        }
        Self {
            records,
            index,
            fetched_at: Some(fetched_at),
        }
    }

    pub fn get(&self, key: &str) -> Option<&R> {
        self.index.get(key).map(|&position| &self.records[position])
    }

    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When the fetch that produced this snapshot completed.
    pub fn fetched_at(&self) -> Option<Timestamp> {
        self.fetched_at
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// What a call to [`RefreshCoalescingCache::maybe_refresh`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The snapshot is inside its TTL window; nothing was fetched.
    Fresh,
    /// Another caller holds the refresh flag; nothing was fetched.
    Coalesced,
    /// A new snapshot with this many records replaced the old one.
    Refreshed { records: usize },
    /// The fetch failed. The previous snapshot is still served.
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshStats {
    pub refreshes: u64,
    pub failures: u64,
    pub coalesced: u64,
}

pub struct RefreshCoalescingCache<R> {
    name: &'static str,
    fetcher: Arc<dyn ListFetcher<R>>,
    ttl: Duration,
    snapshot: RwLock<Arc<Snapshot<R>>>,
    last_refresh: Mutex<Option<Instant>>,
    refreshing: AtomicBool,
    refreshes: AtomicU64,
    failures: AtomicU64,
    coalesced: AtomicU64,
}

impl<R> RefreshCoalescingCache<R>
where
    R: Keyed + Clone + Send + Sync + 'static,
{
    /// Create an empty cache. The first `get` or `maybe_refresh` fetches.
    pub fn new(name: &'static str, fetcher: Arc<dyn ListFetcher<R>>, ttl: Duration) -> Self {
        Self {
            name,
            fetcher,
            ttl,
            snapshot: RwLock::new(Arc::new(Snapshot::empty())),
            last_refresh: Mutex::new(None),
            refreshing: AtomicBool::new(false),
            refreshes: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Refresh if stale, then return every record of the current snapshot.
    pub async fn get(&self) -> Vec<R> {
        self.maybe_refresh(false).await;
        self.snapshot().records().to_vec()
    }

    /// The current snapshot. Never triggers a refresh.
    pub fn snapshot(&self) -> Arc<Snapshot<R>> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Look up a record by key in the current snapshot. Never triggers a refresh.
    pub fn lookup_by_key(&self, key: &str) -> Option<R> {
        self.snapshot().get(key).cloned()
    }

    /// Refresh the snapshot if it is stale (or `force` is set) and no other
    /// refresh is in flight.
    ///
    /// The refresh timestamp advances when the fetch completes whether it
    /// succeeded or not, so a failing upstream is retried once per TTL window
    /// instead of on every call.
    pub async fn maybe_refresh(&self, force: bool) -> RefreshOutcome {
        if !force && self.is_fresh() {
            return RefreshOutcome::Fresh;
        }

        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            self.coalesced.fetch_add(1, Ordering::Relaxed);
            tracing::debug!(cache = self.name, "refresh already in flight");
            return RefreshOutcome::Coalesced;
        }

        // A refresh may have finished between the freshness check and the CAS.
        if !force && self.is_fresh() {
            self.refreshing.store(false, Ordering::Release);
            return RefreshOutcome::Fresh;
        }

        let _guard = RefreshGuard {
            refreshing: &self.refreshing,
            last_refresh: &self.last_refresh,
        };

        match self.fetcher.fetch_all().await {
            Ok(records) => {
                let count = records.len();
                let snapshot = Arc::new(Snapshot::build(records, toop_core::now()));
                *self
                    .snapshot
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = snapshot;
                self.refreshes.fetch_add(1, Ordering::Relaxed);
                tracing::info!(cache = self.name, records = count, "reference data refreshed");
                RefreshOutcome::Refreshed { records: count }
            }
            Err(error) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                tracing::error!(
                    cache = self.name,
                    %error,
                    "reference data refresh failed, keeping previous snapshot"
                );
                RefreshOutcome::Failed
            }
        }
    }

    /// True while the last refresh attempt is younger than the TTL.
    pub fn is_fresh(&self) -> bool {
        self.last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .map(|at| at.elapsed() < self.ttl)
            .unwrap_or(false)
    }

    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// When the last refresh attempt (successful or not) completed.
    pub fn last_refreshed(&self) -> Option<Instant> {
        *self
            .last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    pub fn stats(&self) -> RefreshStats {
        RefreshStats {
            refreshes: self.refreshes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
        }
    }
}

impl<R> std::fmt::Debug for RefreshCoalescingCache<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoalescingCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("refreshing", &self.refreshing.load(Ordering::Relaxed))
            .finish()
    }
}

/// Stamps the refresh time and releases the single-flight flag, in that
/// order, however the refresh ends (success, failure or cancellation).
struct RefreshGuard<'a> {
    refreshing: &'a AtomicBool,
    last_refresh: &'a Mutex<Option<Instant>>,
}

impl Drop for RefreshGuard<'_> {
    fn drop(&mut self) {
        *self
            .last_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        self.refreshing.store(false, Ordering::Release);
    }
}

// ============================================================================
// TESTS
// ============================================================================
