//! # sharewatch-types
//!
//! Core types for shared vehicle-location snapshots. This crate defines the
//! stable internal representation that the poller produces and that every
//! reader of a coordinator consumes, independent of the heterogeneous wire
//! shape of the remote location-sharing API.
//!
//! ## Design Goals
//!
//! - **No required dependencies**: Core types work without any serialization framework
//! - **Optional serialization**: Enable the `serde` feature to export snapshots as JSON
//! - **Absent means absent**: Missing telemetry is `None`, never a zeroed default
//! - **Cheap sharing**: Snapshots hold their unit table behind an `Arc`, so a
//!   failed cycle can carry the previous table forward without copying it
//!
//! ## Features
//!
//! - `serde`: JSON/etc. serialization via serde
//!
//! ## Example
//!
//! ```rust
//! use sharewatch_types::{Snapshot, UnitRecord, UnitTable};
//!
//! let mut table = UnitTable::new();
//! table.insert(
//!     7,
//!     UnitRecord::builder(7)
//!         .name("Van")
//!         .position(52.5, 13.4)
//!         .speed(42.3)
//!         .in_trip(true)
//!         .build(),
//! );
//!
//! let snapshot = Snapshot::empty().succeeded(table, 1_700_000_000_000);
//! assert!(snapshot.last_success);
//! assert_eq!(snapshot.len(), 1);
//! ```

mod failure;
mod record;
mod snapshot;

pub use failure::*;
pub use record::*;
pub use snapshot::*;
