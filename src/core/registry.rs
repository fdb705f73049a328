//! # Recoverable registry - keyed store of supervised components.
//!
//! Maps a recoverable's id to its shared handle plus a small per-entry
//! [`Tracker`] (last observed state, in-flight recovery flag).
//!
//! ## Architecture
//! ```text
//! register / deregister / get / list ──┐
//!                                      ├──► RwLock<HashMap<id, Entry>>
//! HealthChecker::scan() ── snapshot() ─┘          Entry { recoverable, tracker }
//! ```
//!
//! ## Rules
//! - At most one entry per id; a second insert for the same id is rejected and the first kept
//! - Every access, including the scan snapshot, goes through the lock
//! - The lock is never held across a call into a recoverable (`status`/`recover`)
//! - Tracker state lives outside the lock (atomics) so probes never take the write lock

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use tokio::sync::RwLock;

use crate::error::ManagerError;
use crate::recoverables::RecoverableRef;
use crate::state::HealthState;

/// Per-registration observation state.
#[derive(Debug, Default)]
pub(crate) struct Tracker {
    last: AtomicU8,
    in_flight: AtomicBool,
}

impl Tracker {
    /// Records an observed state; returns `true` if it differs from the previous one.
    pub(crate) fn observe(&self, state: HealthState) -> bool {
        self.last.swap(state.code(), Ordering::AcqRel) != state.code()
    }

    /// Last reported state; `Recovering` while a recovery attempt is in flight.
    pub(crate) fn current(&self) -> Option<HealthState> {
        if self.in_flight.load(Ordering::Acquire) {
            return Some(HealthState::Recovering);
        }
        HealthState::from_code(self.last.load(Ordering::Acquire))
    }

    /// Claims the recovery slot; `None` if a recovery is already in flight.
    ///
    /// The last reported state is left alone, so a component that keeps
    /// failing does not look like it changed state on every attempt.
    pub(crate) fn begin_recovery(&self) -> Option<RecoveryGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        Some(RecoveryGuard { tracker: self })
    }
}

/// Releases the in-flight flag on drop (also when the recovery future is cancelled).
pub(crate) struct RecoveryGuard<'a> {
    tracker: &'a Tracker,
}

impl Drop for RecoveryGuard<'_> {
    fn drop(&mut self) {
        self.tracker.in_flight.store(false, Ordering::Release);
    }
}

/// Registered recoverable with its tracker.
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) recoverable: RecoverableRef,
    pub(crate) tracker: Arc<Tracker>,
}

/// Lock-guarded store of registered recoverables.
#[derive(Default)]
pub(crate) struct Registry {
    entries: RwLock<HashMap<String, Entry>>,
}

impl Registry {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Adds `recoverable` under its id unless the id is taken.
    pub(crate) async fn insert(&self, recoverable: RecoverableRef) -> Result<(), ManagerError> {
        let id = recoverable.id().to_string();
        let mut entries = self.entries.write().await;
        if entries.contains_key(&id) {
            return Err(ManagerError::DuplicateRegistration { id });
        }
        entries.insert(
            id,
            Entry {
                recoverable,
                tracker: Arc::new(Tracker::default()),
            },
        );
        Ok(())
    }

    /// Removes and returns the recoverable registered under `id`.
    pub(crate) async fn remove(&self, id: &str) -> Result<RecoverableRef, ManagerError> {
        self.entries
            .write()
            .await
            .remove(id)
            .map(|entry| entry.recoverable)
            .ok_or_else(|| unknown(id))
    }

    /// Returns the exact registered handle for `id`.
    pub(crate) async fn get(&self, id: &str) -> Result<RecoverableRef, ManagerError> {
        self.entries
            .read()
            .await
            .get(id)
            .map(|entry| Arc::clone(&entry.recoverable))
            .ok_or_else(|| unknown(id))
    }

    /// Last observed state of `id`.
    pub(crate) async fn state_of(&self, id: &str) -> Result<Option<HealthState>, ManagerError> {
        self.entries
            .read()
            .await
            .get(id)
            .map(|entry| entry.tracker.current())
            .ok_or_else(|| unknown(id))
    }

    /// All registered handles, unspecified order.
    pub(crate) async fn list(&self) -> Vec<RecoverableRef> {
        self.entries
            .read()
            .await
            .values()
            .map(|entry| Arc::clone(&entry.recoverable))
            .collect()
    }

    /// Consistent copy of all entries for one scan.
    pub(crate) async fn snapshot(&self) -> Vec<Entry> {
        self.entries.read().await.values().cloned().collect()
    }

    pub(crate) async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub(crate) async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

fn unknown(id: &str) -> ManagerError {
    ManagerError::UnknownIdentifier { id: id.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recoverables::Recoverable;
    use async_trait::async_trait;

    struct Fixed(&'static str);

    #[async_trait]
    impl Recoverable for Fixed {
        fn id(&self) -> &str {
            self.0
        }
        async fn status(&self) -> HealthState {
            HealthState::Healthy
        }
        async fn recover(&self) -> bool {
            true
        }
    }

    #[tokio::test]
    async fn duplicate_insert_keeps_first() {
        let registry = Registry::new();
        let first: RecoverableRef = Arc::new(Fixed("a"));
        let second: RecoverableRef = Arc::new(Fixed("a"));

        registry.insert(first.clone()).await.unwrap();
        let err = registry.insert(second).await.unwrap_err();

        assert_eq!(err, ManagerError::DuplicateRegistration { id: "a".into() });
        assert_eq!(registry.len().await, 1);
        assert!(Arc::ptr_eq(&registry.get("a").await.unwrap(), &first));
    }

    #[tokio::test]
    async fn remove_unknown_is_an_error_and_leaves_registry_alone() {
        let registry = Registry::new();
        registry.insert(Arc::new(Fixed("a"))).await.unwrap();

        let err = registry.remove("b").await.err().expect("b is not registered");
        assert_eq!(err.as_label(), "unknown_identifier");
        assert_eq!(registry.len().await, 1);

        registry.remove("a").await.unwrap();
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn snapshot_is_detached_from_later_changes() {
        let registry = Registry::new();
        registry.insert(Arc::new(Fixed("a"))).await.unwrap();
        let snap = registry.snapshot().await;

        registry.insert(Arc::new(Fixed("b"))).await.unwrap();
        assert_eq!(snap.len(), 1);
        assert_eq!(registry.list().await.len(), 2);
    }

    #[test]
    fn tracker_reports_changes_and_recovering() {
        let tracker = Tracker::default();
        assert_eq!(tracker.current(), None);
        assert!(tracker.observe(HealthState::Failed));
        assert!(!tracker.observe(HealthState::Failed));

        let guard = tracker.begin_recovery().expect("slot is free");
        assert_eq!(tracker.current(), Some(HealthState::Recovering));
        assert!(tracker.begin_recovery().is_none());

        drop(guard);
        assert_eq!(tracker.current(), Some(HealthState::Failed));
        assert!(!tracker.observe(HealthState::Failed));
        assert!(tracker.observe(HealthState::Healthy));
        assert_eq!(tracker.current(), Some(HealthState::Healthy));
    }
}
