//! Pending request table.
//!
//! Bridges "send a message tagged with a correlation id" and "a reply tagged
//! with that id shows up later, on some other task" into a single awaitable
//! call with a deadline.
//!
//! Each registered id owns a oneshot channel. `complete` removes the entry
//! and sends on the channel while holding the table lock; `wait` races the
//! receiver against the deadline and, on expiry, removes the entry under the
//! same lock. Whichever side removes the entry decides the outcome:
//!
//! - `complete` removed it: the reply is already in the channel, so a waiter
//!   whose deadline fired at the same moment still picks it up.
//! - `wait` removed it: a later `complete` finds nothing and is a no-op.
//!
//! The entry is gone from the table once `wait` returns, and also when the
//! waiting future is dropped before finishing.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use toop_core::{CorrelationError, CorrelationId};

/// What the waiter observed. Exactly one per registered id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome<T> {
    Completed(T),
    TimedOut,
}

struct PendingEntry<T> {
    sender: oneshot::Sender<T>,
    registered_at: Instant,
}

/// Held by the caller between `register` and `wait`.
#[derive(Debug)]
pub struct PendingHandle<T> {
    id: CorrelationId,
    receiver: oneshot::Receiver<T>,
}

impl<T> PendingHandle<T> {
    pub fn id(&self) -> &CorrelationId {
        &self.id
    }
}

pub struct PendingRequestTable<T> {
    entries: Mutex<HashMap<CorrelationId, PendingEntry<T>>>,
}

impl<T: Send> Default for PendingRequestTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send> PendingRequestTable<T> {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<CorrelationId, PendingEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start tracking `id`. Fails if the id is already outstanding.
    pub fn register(&self, id: CorrelationId) -> Result<PendingHandle<T>, CorrelationError> {
        let mut entries = self.lock();
        if entries.contains_key(&id) {
            return Err(CorrelationError::DuplicateId {
                id: id.to_string(),
            });
        }

        let (sender, receiver) = oneshot::channel();
        entries.insert(
            id.clone(),
            PendingEntry {
                sender,
                registered_at: Instant::now(),
            },
        );
        tracing::debug!(%id, pending = entries.len(), "registered pending request");
        Ok(PendingHandle { id, receiver })
    }

    /// Wait for the reply to `handle`, giving up after `timeout`.
    pub async fn wait(&self, handle: PendingHandle<T>, timeout: Duration) -> WaitOutcome<T> {
        let PendingHandle { id, mut receiver } = handle;
        let mut cleanup = RemoveOnDrop {
            table: self,
            id: &id,
            armed: true,
        };

        let outcome = match tokio::time::timeout(timeout, &mut receiver).await {
            Ok(Ok(reply)) => WaitOutcome::Completed(reply),
            Ok(Err(_)) => {
                // Sender dropped without a value: the entry was discarded.
                tracing::warn!(%id, "pending request discarded while waiting");
                WaitOutcome::TimedOut
            }
            Err(_) => {
                if self.lock().remove(&id).is_some() {
                    tracing::info!(%id, ?timeout, "request timed out");
                    WaitOutcome::TimedOut
                } else {
                    // `complete` won the race and already sent under the lock.
                    match receiver.try_recv() {
                        Ok(reply) => WaitOutcome::Completed(reply),
                        Err(_) => WaitOutcome::TimedOut,
                    }
                }
            }
        };

        cleanup.armed = false;
        outcome
    }

    /// Deliver `reply` to the waiter for `id`.
    ///
    /// Returns `false` when no request with that id is pending (it already
    /// timed out, was already completed, or never existed). That case is
    /// logged and otherwise ignored.
    pub fn complete(&self, id: &CorrelationId, reply: T) -> bool {
        let mut entries = self.lock();
        let Some(entry) = entries.remove(id) else {
            tracing::info!(%id, "pending request already removed");
            return false;
        };

        let waited = entry.registered_at.elapsed();
        let delivered = entry.sender.send(reply).is_ok();
        drop(entries);

        if delivered {
            tracing::debug!(%id, ?waited, "pending request completed");
        } else {
            tracing::info!(%id, "waiter gone before reply was delivered");
        }
        delivered
    }

    /// Stop tracking `id` without delivering anything.
    pub fn discard(&self, id: &CorrelationId) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn contains(&self, id: &CorrelationId) -> bool {
        self.lock().contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<T> std::fmt::Debug for PendingRequestTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pending = self
            .entries
            .lock()
            .map(|entries| entries.len())
            .unwrap_or_default();
        f.debug_struct("PendingRequestTable")
            .field("pending", &pending)
            .finish()
    }
}

struct RemoveOnDrop<'a, T: Send> {
    table: &'a PendingRequestTable<T>,
    id: &'a CorrelationId,
    armed: bool,
}

impl<T: Send> Drop for RemoveOnDrop<'_, T> {
    fn drop(&mut self) {
        if self.armed && self.table.discard(self.id) {
            tracing::debug!(id = %self.id, "waiter dropped, pending request removed");
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_reply_from_another_task_completes_wait() {
        let table = Arc::new(PendingRequestTable::<String>::new());
        let handle = table.register(CorrelationId::new("R1")).unwrap();

        let completer = table.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            assert!(completer.complete(&CorrelationId::new("R1"), "P".to_string()));
        });

        let started = std::time::Instant::now();
        let outcome = table.wait(handle, Duration::from_secs(5)).await;
        assert_eq!(outcome, WaitOutcome::Completed("P".to_string()));
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(table.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_removes_entry() {
        let table = PendingRequestTable::<String>::new();
        let handle = table.register(CorrelationId::new("R2")).unwrap();

        let started = Instant::now();
        let outcome = table.wait(handle, Duration::from_millis(100)).await;
        assert_eq!(outcome, WaitOutcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(100));
        assert!(table.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_complete_is_noop() {
        let table = PendingRequestTable::<String>::new();
        let handle = table.register(CorrelationId::new("R3")).unwrap();
        let _other = table.register(CorrelationId::new("R4")).unwrap();

        assert_eq!(
            table.wait(handle, Duration::from_millis(50)).await,
            WaitOutcome::TimedOut
        );
        assert!(!table.complete(&CorrelationId::new("R3"), "late".to_string()));
        assert!(table.contains(&CorrelationId::new("R4")));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_complete_unknown_id_is_noop() {
        let table = PendingRequestTable::<String>::new();
        let _handle = table.register(CorrelationId::new("known")).unwrap();
        assert!(!table.complete(&CorrelationId::new("unknown"), "x".to_string()));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_duplicate_registration_rejected() {
        let table = PendingRequestTable::<String>::new();
        let _handle = table.register(CorrelationId::new("R1")).unwrap();
        let err = table.register(CorrelationId::new("R1")).unwrap_err();
        assert_eq!(
            err,
            CorrelationError::DuplicateId {
                id: "R1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_complete_before_wait_is_kept() {
        let table = PendingRequestTable::<u32>::new();
        let handle = table.register(CorrelationId::new("early")).unwrap();
        assert!(table.complete(&CorrelationId::new("early"), 7));
        assert_eq!(
            table.wait(handle, Duration::from_millis(10)).await,
            WaitOutcome::Completed(7)
        );
    }

    #[tokio::test]
    async fn test_complete_with_zero_timeout_still_delivers() {
        // Deadline already elapsed when the waiter checks; the reply sent
        // under the lock must still win.
        let table = PendingRequestTable::<u32>::new();
        let handle = table.register(CorrelationId::new("race")).unwrap();
        assert!(table.complete(&CorrelationId::new("race"), 1));
        assert_eq!(
            table.wait(handle, Duration::ZERO).await,
            WaitOutcome::Completed(1)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_waiter_removes_entry() {
        let table = PendingRequestTable::<u32>::new();
        let handle = table.register(CorrelationId::new("gone")).unwrap();

        let wait = table.wait(handle, Duration::from_secs(60));
        let _ = tokio::time::timeout(Duration::from_millis(5), wait).await;

        assert!(table.is_empty());
        assert!(!table.complete(&CorrelationId::new("gone"), 1));
    }

    #[tokio::test]
    async fn test_discard_wakes_waiter() {
        let table = PendingRequestTable::<u32>::new();
        let handle = table.register(CorrelationId::new("d")).unwrap();
        assert!(table.discard(&CorrelationId::new("d")));
        assert_eq!(
            table.wait(handle, Duration::from_secs(5)).await,
            WaitOutcome::TimedOut
        );
    }
}
