//! # sharewatch
//!
//! Command-line host for a shared vehicle-location feed.
//!
//! The polling itself lives in the member crates; this crate wires them to
//! the outside world:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          sharewatch                          │
//! │  ┌──────────┐   ┌─────────┐   ┌─────────────┐   ┌─────────┐  │
//! │  │ settings │──▶│  setup  │──▶│ Coordinator │──▶│ render  │  │
//! │  │ (config) │   │ (retry) │   │    (sdk)    │   │(console)│  │
//! │  └──────────┘   └─────────┘   └──────┬──────┘   └─────────┘  │
//! │                                      │                       │
//! │                                      ▼                       │
//! │                  SharePoller + Normalizer (adapter)          │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]**: layered configuration and range validation
//! - **[`setup`]**: the awaited first refresh and its retry policy
//! - **[`render`]**: [`UnitView`] presentation (speed unit, rounding,
//!   name fallback, availability)
//! - **[`diagnostics`]**: a redacted dump of settings and the last table
//! - **[`logging`]**: tracing subscriber setup
//!
//! ## Usage
//!
//! ```bash
//! # Follow a share, one line per unit per cycle
//! sharewatch --shared-code AbC123 watch
//!
//! # Single cycle as JSON
//! sharewatch --share-url "https://…/info?shared_code=AbC123" once
//! ```
//!
//! ### As a library
//!
//! ```
//! use sharewatch::{Presenter, Settings};
//! use sharewatch_sdk::{SnapshotReader, SnapshotStore};
//! use std::sync::Arc;
//!
//! let settings = Settings::default();
//! let presenter = Presenter::from_settings(&settings);
//! let reader = SnapshotReader::new(Arc::new(SnapshotStore::new()));
//!
//! // Nothing fetched yet: the unit is shown by its fallback name.
//! let view = presenter.view(&reader.snapshot(), 7);
//! assert_eq!(view.to_string(), "Unit 7 [7]: unavailable");
//! ```
//!
//! ### Awaiting the first refresh
//!
//! ```no_run
//! use sharewatch::{await_first_refresh, RetryPolicy, Settings};
//! use sharewatch_adapter::SharePoller;
//! use sharewatch_sdk::Coordinator;
//!
//! # tokio_test::block_on(async {
//! let settings = Settings {
//!     shared_code: Some("AbC123".to_string()),
//!     ..Settings::default()
//! };
//! let coordinator = Coordinator::builder()
//!     .target(&settings.target().unwrap())
//!     .poller(SharePoller::builder().build().unwrap())
//!     .build()
//!     .unwrap();
//!
//! let snapshot = await_first_refresh(&coordinator, RetryPolicy::fail_fast()).await;
//! # });
//! ```

pub mod diagnostics;
pub mod logging;
pub mod render;
pub mod settings;
pub mod setup;

// Re-export main types for convenience
pub use diagnostics::{redact_url, Diagnostics};
pub use logging::init_logging;
pub use render::{Presenter, UnitView};
pub use settings::{Overrides, Settings, SettingsError, SpeedUnit};
pub use setup::{await_first_refresh, RetryPolicy};
