//! # sharewatch-adapter
//!
//! Talks to a shared vehicle-location API and turns its responses into a
//! [`UnitTable`].
//!
//! The crate has three parts:
//!
//! - **Poller** ([`SharePoller`]): one HTTP GET with a bounded timeout; the
//!   status line is classified before the body is touched, and the body is
//!   parsed as JSON regardless of the declared content type.
//! - **Normalizer** ([`normalize`], [`Normalizer`]): validates the response
//!   shape and maps each per-unit object by its `unit_id`, looking attributes
//!   up through ordered lists of candidate field names.
//! - **Target** ([`ShareTarget`]): derives the request URL once from a share
//!   code and/or a share URL.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use sharewatch_adapter::{normalize, SharePoller, ShareTarget, DEFAULT_BASE_ENDPOINT};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let target = ShareTarget::resolve(Some("AbC123"), None, DEFAULT_BASE_ENDPOINT)?;
//!     let poller = SharePoller::builder().build()?;
//!
//!     let payload = poller.poll(target.request_url(), Duration::from_secs(10)).await?;
//!     let table = normalize(&payload)?;
//!
//!     println!("{} units shared", table.len());
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod normalize;
pub mod poller;
pub mod target;

pub use error::PollError;
pub use normalize::{normalize, parse_trip_flag, parse_trip_token, MissingData, Normalizer};
pub use poller::{classify_status, Fetcher, SharePoller, SharePollerBuilder, DEFAULT_TIMEOUT};
pub use target::{ShareTarget, TargetError, DEFAULT_BASE_ENDPOINT, SHARED_CODE_PARAM};

// Re-export types for convenience
pub use sharewatch_types::{Failure, FailureKind, UnitId, UnitRecord, UnitTable};
