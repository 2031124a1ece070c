//! # sharewatch-sdk
//!
//! Polling coordinator for a shared vehicle-location feed.
//!
//! One [`Coordinator`] polls one share on a fixed interval and keeps the
//! last-known-good unit table in a [`SnapshotStore`]. Any number of
//! dependent consumers read it through a [`SnapshotReader`] without ever
//! triggering their own network activity.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sharewatch_adapter::{SharePoller, ShareTarget, DEFAULT_BASE_ENDPOINT};
//! use sharewatch_sdk::{Coordinator, Output};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = ShareTarget::resolve(Some("AbC123"), None, DEFAULT_BASE_ENDPOINT)?;
//!
//!     let coordinator = Coordinator::builder()
//!         .target(&target)
//!         .poller(SharePoller::builder().build()?)
//!         .output(Output::file("units.json"))
//!         .interval(Duration::from_secs(60))
//!         .build()?;
//!
//!     // The first cycle is awaited before anything depends on the data
//!     coordinator.first_refresh().await?;
//!
//!     // Periodic refresh in the background
//!     let handle = coordinator.start();
//!
//!     // ... consumers read via coordinator.reader() ...
//!
//!     handle.teardown().await;
//!     Ok(())
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **Last-known-good**: a failed cycle never clears the table
//! - **Atomic swaps**: readers see a whole generation or the previous one
//! - **No overlap**: a trigger during an in-flight cycle is ignored
//! - **Clean teardown**: nothing is stored once teardown has begun

mod coordinator;
mod error;
mod handle;
mod output;
mod state;

pub use coordinator::{
    Coordinator, CoordinatorBuilder, CycleOutcome, RefreshHandle, DEFAULT_INTERVAL,
};
pub use error::CoordinatorError;
pub use handle::SnapshotReader;
pub use output::Output;
pub use state::SnapshotStore;

// Re-export types for convenience
pub use sharewatch_types::{Failure, FailureKind, Snapshot, UnitId, UnitRecord, UnitTable};
