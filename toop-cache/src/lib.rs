//! TOOP Cache - Reference Data and Per-Key Caches
//!
//! Two caching disciplines keep the gateway responsive without hammering
//! upstream services:
//!
//! - [`RefreshCoalescingCache`] holds a bulk-fetched list that changes slowly.
//!   The whole snapshot is replaced atomically at most once per TTL window,
//!   and concurrent refresh attempts collapse into a single upstream fetch.
//! - [`BoundedRecencyCache`] memoizes single-key lookups under a hard capacity,
//!   evicting the least recently accessed entry on overflow.
//!
//! Neither cache stores failures. A failed bulk refresh keeps the previous
//! snapshot; a failed key lookup caches nothing.

pub mod recency;
pub mod refresh;
pub mod traits;

pub use recency::BoundedRecencyCache;
pub use refresh::{RefreshCoalescingCache, RefreshOutcome, RefreshStats, Snapshot};
pub use traits::{CacheStats, Keyed, ListFetcher, RecordFetcher};
