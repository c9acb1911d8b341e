//! Collection subscription tracking and the single readiness flag.
//!
//! One subscription is opened per collection when the service starts.
//! Each subscription reports once it has delivered its first snapshot;
//! when every collection has reported, a single `ready` flag flips. A
//! fixed timeout flips the flag regardless, so readiness never hangs on
//! a collection that fails to report.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;

use super::{Document, Snapshot, Store};

/// Tracks per-collection first-snapshot delivery and exposes the
/// aggregate readiness flag consumed by `/health/ready`.
#[derive(Clone)]
pub struct SyncManager {
    inner: Arc<SyncInner>,
}

struct SyncInner {
    pending: Mutex<BTreeSet<&'static str>>,
    ready_tx: watch::Sender<bool>,
}

impl SyncManager {
    /// Creates a tracker waiting on the given collections and arms the
    /// readiness timeout.
    #[must_use]
    pub fn new(collections: &[&'static str], timeout: Duration) -> Self {
        let (ready_tx, _) = watch::channel(collections.is_empty());
        let manager = Self {
            inner: Arc::new(SyncInner {
                pending: Mutex::new(collections.iter().copied().collect()),
                ready_tx,
            }),
        };

        let fallback = manager.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            fallback.force_ready();
        });

        manager
    }

    /// Opens one subscription per store collection and starts tracking.
    #[must_use]
    pub fn start(store: &Store, timeout: Duration) -> Self {
        let manager = Self::new(super::COLLECTION_NAMES, timeout);
        manager.track(store.users().watch());
        manager.track(store.itineraries().watch());
        manager.track(store.customers().watch());
        manager.track(store.bookings().watch());
        manager.track(store.custom_roles().watch());
        manager.track(store.api_credentials().watch());
        manager
    }

    /// Spawns a task that marks the collection once its subscription has
    /// delivered a first snapshot.
    pub fn track<T: Document>(&self, rx: watch::Receiver<Snapshot<T>>) {
        let manager = self.clone();
        tokio::spawn(async move {
            // A watch subscription always carries its current snapshot;
            // observing it is the first delivery.
            let _first = rx.borrow().clone();
            manager.mark_synced(T::COLLECTION);
        });
    }

    /// Records that a collection delivered its first snapshot.
    pub fn mark_synced(&self, collection: &str) {
        let mut pending = self
            .inner
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        pending.remove(collection);
        if pending.is_empty() {
            drop(pending);
            let _ = self.inner.ready_tx.send(true);
        }
    }

    fn force_ready(&self) {
        if !*self.inner.ready_tx.borrow() {
            let pending = self
                .inner
                .pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            tracing::warn!(
                pending = ?*pending,
                "sync readiness timeout elapsed before all collections reported"
            );
            drop(pending);
            let _ = self.inner.ready_tx.send(true);
        }
    }

    /// Whether every collection has reported (or the timeout elapsed).
    #[must_use]
    pub fn is_ready(&self) -> bool {
        *self.inner.ready_tx.borrow()
    }

    /// Subscribes to the readiness flag.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.inner.ready_tx.subscribe()
    }

    /// Waits until the readiness flag flips.
    pub async fn await_ready(&self) {
        let mut rx = self.subscribe();
        // wait_for only errors when the sender is dropped, and the
        // manager holds the sender for its whole lifetime.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn ready_flips_once_every_collection_reports() {
        let manager = SyncManager::new(&["users", "bookings"], Duration::from_secs(60));
        assert!(!manager.is_ready());

        manager.mark_synced("users");
        assert!(!manager.is_ready());

        manager.mark_synced("bookings");
        assert!(manager.is_ready());
    }

    #[tokio::test]
    async fn duplicate_reports_do_not_flip_early() {
        let manager = SyncManager::new(&["users", "bookings"], Duration::from_secs(60));
        manager.mark_synced("users");
        manager.mark_synced("users");
        assert!(!manager.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_forces_readiness() {
        let manager = SyncManager::new(&["users", "bookings"], Duration::from_secs(10));
        manager.mark_synced("users");
        assert!(!manager.is_ready());

        tokio::time::advance(Duration::from_secs(11)).await;
        manager.await_ready().await;
        assert!(manager.is_ready());
    }

    #[tokio::test]
    async fn tracked_store_reaches_readiness() {
        let store = Store::new();
        let manager = SyncManager::start(&store, Duration::from_secs(60));
        manager.await_ready().await;
        assert!(manager.is_ready());
    }
}
