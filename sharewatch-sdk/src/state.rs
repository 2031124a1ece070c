//! Snapshot store: the single owned state of a coordinator.

use std::sync::Arc;

use parking_lot::RwLock;
use sharewatch_types::{Failure, Snapshot, UnitTable};

/// Holds exactly one generation of data.
///
/// Readers clone the current `Arc<Snapshot>` and keep a consistent view for
/// as long as they hold it. The refresh cycle is the only writer; every
/// commit swaps the whole snapshot under the write lock, so the table and
/// the success/error pair always change together.
///
/// Once closed, commits are refused. The closed flag is checked under the
/// same lock as the swap, so nothing is written after `close` returns.
#[derive(Debug)]
pub struct SnapshotStore {
    inner: RwLock<StoreState>,
}

#[derive(Debug)]
struct StoreState {
    current: Arc<Snapshot>,
    closed: bool,
}

impl SnapshotStore {
    /// Create a store holding an empty snapshot.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(StoreState {
                current: Arc::new(Snapshot::empty()),
                closed: false,
            }),
        }
    }

    /// The current snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.read().current)
    }

    /// Whether the store has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.read().closed
    }

    /// Refuse all further commits. Returns `false` if already closed.
    pub fn close(&self) -> bool {
        let mut state = self.inner.write();
        !std::mem::replace(&mut state.closed, true)
    }

    /// Replace the table after a successful cycle.
    ///
    /// Returns the new snapshot, or `None` if the store is closed.
    pub fn commit_success(&self, table: UnitTable, now_ms: u64) -> Option<Arc<Snapshot>> {
        self.commit(|previous| previous.succeeded(table, now_ms))
    }

    /// Record a failed cycle, keeping the previous table.
    ///
    /// Returns the new snapshot, or `None` if the store is closed.
    pub fn commit_failure(&self, failure: Failure, now_ms: u64) -> Option<Arc<Snapshot>> {
        self.commit(|previous| previous.failed(failure, now_ms))
    }

    fn commit(&self, next: impl FnOnce(&Snapshot) -> Snapshot) -> Option<Arc<Snapshot>> {
        let mut state = self.inner.write();
        if state.closed {
            return None;
        }
        let snapshot = Arc::new(next(&state.current));
        state.current = Arc::clone(&snapshot);
        Some(snapshot)
    }
}

impl Default for SnapshotStore {
    fn default() -> Self {
        Self::new()
    }
}
