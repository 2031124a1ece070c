//! Read-only handle onto a coordinator's snapshot.

use std::sync::Arc;

use sharewatch_types::{Failure, Snapshot, UnitId, UnitRecord, UnitTable};

use crate::state::SnapshotStore;

/// A handle for reading the latest snapshot.
///
/// This is the interface dependent consumers (one per tracked unit,
/// typically) hold on to. Readers never mutate the store. Obtain one by
/// calling `Coordinator::reader()`.
///
/// # Example
///
/// ```rust
/// use sharewatch_sdk::SnapshotStore;
/// use sharewatch_sdk::SnapshotReader;
/// use std::sync::Arc;
///
/// let reader = SnapshotReader::new(Arc::new(SnapshotStore::new()));
///
/// // Nothing fetched yet
/// assert!(reader.data().is_empty());
/// assert!(!reader.last_success());
/// assert!(!reader.is_available(7));
/// ```
#[derive(Clone)]
pub struct SnapshotReader {
    store: Arc<SnapshotStore>,
}

impl SnapshotReader {
    /// Create a reader over a store.
    pub fn new(store: Arc<SnapshotStore>) -> Self {
        Self { store }
    }

    /// The current snapshot.
    ///
    /// Hold on to the returned `Arc` to read several fields consistently.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.current()
    }

    /// The current unit table.
    pub fn data(&self) -> Arc<UnitTable> {
        Arc::clone(&self.store.current().table)
    }

    /// The record of one unit.
    pub fn get(&self, unit_id: UnitId) -> Option<UnitRecord> {
        self.store.current().get(unit_id).cloned()
    }

    /// Identifiers of all units in the current table.
    pub fn unit_ids(&self) -> Vec<UnitId> {
        self.store.current().table.keys().copied().collect()
    }

    /// Whether the most recent cycle succeeded.
    pub fn last_success(&self) -> bool {
        self.store.current().last_success
    }

    /// The failure of the most recent cycle, if it failed.
    pub fn last_error(&self) -> Option<Failure> {
        self.store.current().last_error.clone()
    }

    /// Whether a unit should be shown as available.
    ///
    /// False while the share is failing, even though the last good table is
    /// still retained.
    pub fn is_available(&self, unit_id: UnitId) -> bool {
        self.store.current().is_available(unit_id)
    }
}

impl std::fmt::Debug for SnapshotReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let snapshot = self.store.current();
        f.debug_struct("SnapshotReader")
            .field("units", &snapshot.len())
            .field("last_success", &snapshot.last_success)
            .finish()
    }
}
