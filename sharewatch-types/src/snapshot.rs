//! Snapshot - the coordinator's best-known view of all shared units.

use std::sync::Arc;

use crate::{Failure, UnitId, UnitRecord, UnitTable};

/// The unit table plus the outcome of the most recent poll cycle.
///
/// A snapshot is immutable. Each completed cycle produces a new one from
/// the previous:
///
/// - [`Snapshot::succeeded`] replaces the whole table and clears the error.
/// - [`Snapshot::failed`] keeps the *same* table (pointer-equal `Arc`) and
///   records the failure.
///
/// This keeps the table and the `last_success`/`last_error` pair consistent
/// for anyone holding a snapshot.
///
/// # Example
///
/// ```rust
/// use sharewatch_types::{Failure, FailureKind, Snapshot, UnitRecord, UnitTable};
///
/// let mut table = UnitTable::new();
/// table.insert(1, UnitRecord::new(1));
///
/// let ok = Snapshot::empty().succeeded(table, 1_000);
/// let failed = ok.failed(Failure::new(FailureKind::RateLimited, "429"), 2_000);
///
/// assert!(!failed.last_success);
/// assert_eq!(failed.len(), 1); // previous table retained
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Snapshot {
    /// Units keyed by identifier.
    pub table: Arc<UnitTable>,

    /// Whether the most recent cycle completed without error.
    pub last_success: bool,

    /// Reason for the most recent failure, when `last_success` is false.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub last_error: Option<Failure>,

    /// Number of completed cycles, successful or not.
    pub cycles: u64,

    /// Unix timestamp in milliseconds when the last cycle completed.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub updated_at_ms: Option<u64>,

    /// Unix timestamp in milliseconds of the last successful cycle.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub last_success_at_ms: Option<u64>,
}

impl Snapshot {
    /// The snapshot a coordinator starts with: no units, no cycle run yet.
    pub fn empty() -> Self {
        Self {
            table: Arc::new(UnitTable::new()),
            last_success: false,
            last_error: None,
            cycles: 0,
            updated_at_ms: None,
            last_success_at_ms: None,
        }
    }

    /// The snapshot following a successful cycle.
    pub fn succeeded(&self, table: UnitTable, now_ms: u64) -> Self {
        Self {
            table: Arc::new(table),
            last_success: true,
            last_error: None,
            cycles: self.cycles + 1,
            updated_at_ms: Some(now_ms),
            last_success_at_ms: Some(now_ms),
        }
    }

    /// The snapshot following a failed cycle. The table is shared, not copied.
    pub fn failed(&self, failure: Failure, now_ms: u64) -> Self {
        Self {
            table: Arc::clone(&self.table),
            last_success: false,
            last_error: Some(failure),
            cycles: self.cycles + 1,
            updated_at_ms: Some(now_ms),
            last_success_at_ms: self.last_success_at_ms,
        }
    }

    /// Whether at least one cycle has completed.
    pub fn has_completed_cycle(&self) -> bool {
        self.cycles > 0
    }

    /// Check if the table is empty (no units).
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Number of units in the table.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Get the record for a unit.
    pub fn get(&self, unit_id: UnitId) -> Option<&UnitRecord> {
        self.table.get(&unit_id)
    }

    /// Iterate over all units.
    pub fn iter(&self) -> impl Iterator<Item = (&UnitId, &UnitRecord)> {
        self.table.iter()
    }

    /// Whether a unit should be shown as available: the last cycle succeeded
    /// and the unit is still shared.
    pub fn is_available(&self, unit_id: UnitId) -> bool {
        self.last_success && self.table.contains_key(&unit_id)
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Get current timestamp in milliseconds since Unix epoch.
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
