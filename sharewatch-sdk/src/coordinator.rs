//! The refresh coordinator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use sharewatch_adapter::{
    Fetcher, Normalizer, PollError, SharePoller, ShareTarget, DEFAULT_TIMEOUT,
};
use sharewatch_types::{current_timestamp_ms, Failure, Snapshot, UnitTable};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::CoordinatorError;
use crate::handle::SnapshotReader;
use crate::output::Output;
use crate::state::SnapshotStore;

/// Default refresh interval.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);

/// What a trigger of [`Coordinator::refresh`] led to.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    /// The table was replaced.
    Updated(Arc<Snapshot>),
    /// The cycle failed; the previous table was kept.
    Failed {
        snapshot: Arc<Snapshot>,
        failure: Failure,
    },
    /// Another cycle was in flight; this trigger was ignored.
    Coalesced,
    /// Teardown began before the result could be stored.
    Discarded,
}

impl CycleOutcome {
    /// Whether the cycle replaced the table.
    pub fn is_success(&self) -> bool {
        matches!(self, CycleOutcome::Updated(_))
    }

    /// The snapshot the cycle produced, if it completed.
    pub fn snapshot(&self) -> Option<&Arc<Snapshot>> {
        match self {
            CycleOutcome::Updated(snapshot) | CycleOutcome::Failed { snapshot, .. } => {
                Some(snapshot)
            }
            CycleOutcome::Coalesced | CycleOutcome::Discarded => None,
        }
    }

    /// The failure, if the cycle failed.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            CycleOutcome::Failed { failure, .. } => Some(failure),
            _ => None,
        }
    }
}

/// Polls one share endpoint and keeps a last-known-good snapshot.
///
/// A coordinator owns one [`SnapshotStore`] and is its only writer. Each
/// cycle fetches, normalizes and then either replaces the whole table or
/// records a classified failure while keeping the previous table. Cycles
/// never overlap: a trigger that arrives while one is in flight is ignored.
///
/// Cloning a coordinator yields another handle to the same state.
///
/// # Example
///
/// ```rust,no_run
/// use sharewatch_adapter::{SharePoller, ShareTarget, DEFAULT_BASE_ENDPOINT};
/// use sharewatch_sdk::Coordinator;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let target = ShareTarget::resolve(Some("AbC123"), None, DEFAULT_BASE_ENDPOINT)?;
///
///     let coordinator = Coordinator::builder()
///         .target(&target)
///         .poller(SharePoller::builder().build()?)
///         .interval(Duration::from_secs(60))
///         .build()?;
///
///     // First cycle is awaited; failure means "not ready yet".
///     coordinator.first_refresh().await?;
///
///     let reader = coordinator.reader();
///     let handle = coordinator.start();
///
///     for unit_id in reader.unit_ids() {
///         println!("{} available: {}", unit_id, reader.is_available(unit_id));
///     }
///
///     handle.teardown().await;
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Coordinator {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    name: String,
    request_url: String,
    fetcher: Arc<dyn Fetcher>,
    normalizer: Normalizer,
    timeout: Duration,
    interval: Duration,
    store: Arc<SnapshotStore>,
    outputs: Vec<Output>,
    updates: watch::Sender<Arc<Snapshot>>,
    in_flight: AtomicBool,
}

impl Coordinator {
    /// Create a builder for configuring the coordinator.
    pub fn builder() -> CoordinatorBuilder {
        CoordinatorBuilder::new()
    }

    /// Coordinator name, used in logs.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The URL every cycle requests.
    pub fn request_url(&self) -> &str {
        &self.inner.request_url
    }

    /// The refresh interval.
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.store.current()
    }

    /// A read-only handle for dependent consumers.
    pub fn reader(&self) -> SnapshotReader {
        SnapshotReader::new(Arc::clone(&self.inner.store))
    }

    /// Subscribe to completed cycles.
    ///
    /// The receiver is marked changed after every completed cycle, successful
    /// or not.
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.inner.updates.subscribe()
    }

    /// Whether a cycle is currently in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    /// Whether teardown has begun.
    pub fn is_shut_down(&self) -> bool {
        self.inner.store.is_closed()
    }

    /// Begin teardown: no cycle result is stored after this returns.
    ///
    /// A cycle already in flight runs to completion but its result is
    /// discarded. Stop a running timer with [`RefreshHandle::teardown`].
    pub fn shutdown(&self) {
        if self.inner.store.close() {
            debug!(coordinator = %self.inner.name, "coordinator shut down");
        }
    }

    /// Run one cycle now.
    pub async fn refresh(&self) -> CycleOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.inner.in_flight) else {
            debug!(coordinator = %self.inner.name, "refresh already in flight, trigger ignored");
            return CycleOutcome::Coalesced;
        };

        if self.is_shut_down() {
            return CycleOutcome::Discarded;
        }

        debug!(coordinator = %self.inner.name, "refresh cycle started");
        let previous = self.inner.store.current();
        let result = self.fetch_table().await;
        let now = current_timestamp_ms();

        let outcome = match result {
            Ok(table) => {
                let units = table.len();
                match self.inner.store.commit_success(table, now) {
                    Some(snapshot) => {
                        if !previous.last_success || previous.len() != units {
                            info!(coordinator = %self.inner.name, units, "share data updated");
                        }
                        CycleOutcome::Updated(snapshot)
                    }
                    None => CycleOutcome::Discarded,
                }
            }
            Err(err) => {
                let failure = err.into_failure();
                warn!(
                    coordinator = %self.inner.name,
                    code = %failure.code(),
                    "refresh failed: {}",
                    failure.message
                );
                match self.inner.store.commit_failure(failure.clone(), now) {
                    Some(snapshot) => CycleOutcome::Failed { snapshot, failure },
                    None => CycleOutcome::Discarded,
                }
            }
        };

        match outcome.snapshot() {
            Some(snapshot) => self.notify(snapshot).await,
            None => debug!(
                coordinator = %self.inner.name,
                "coordinator shut down, cycle result discarded"
            ),
        }

        outcome
    }

    /// Run the first cycle, awaited by the setup routine.
    ///
    /// A failed first cycle is reported as [`CoordinatorError::NotReady`],
    /// which is retryable; the caller decides whether to abort or retry.
    pub async fn first_refresh(&self) -> Result<Arc<Snapshot>, CoordinatorError> {
        match self.refresh().await {
            CycleOutcome::Updated(snapshot) => Ok(snapshot),
            CycleOutcome::Failed { failure, .. } => Err(CoordinatorError::NotReady(failure)),
            CycleOutcome::Coalesced => Err(CoordinatorError::Busy),
            CycleOutcome::Discarded => Err(CoordinatorError::ShutDown),
        }
    }

    /// Start the interval timer.
    ///
    /// This spawns a tokio task that triggers a cycle every interval,
    /// starting one interval from now (the first cycle belongs to the setup
    /// routine). Ticks missed while a cycle runs are skipped, not queued.
    ///
    /// Returns a handle that can be used to stop the timer.
    pub fn start(&self) -> RefreshHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let coordinator = self.clone();
        let period = self.inner.interval;

        let task = tokio::spawn(async move {
            let mut timer = tokio::time::interval_at(Instant::now() + period, period);
            timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        // Stopping cancels a cycle in flight.
                        tokio::select! {
                            _ = coordinator.refresh() => {}
                            _ = stop_rx.changed() => break,
                        }
                    }
                    _ = stop_rx.changed() => break,
                }

                if coordinator.is_shut_down() {
                    break;
                }
            }

            debug!(coordinator = %coordinator.inner.name, "refresh timer stopped");
        });

        RefreshHandle {
            stop_tx,
            task,
            store: Arc::clone(&self.inner.store),
        }
    }

    async fn fetch_table(&self) -> Result<UnitTable, PollError> {
        let inner = &self.inner;
        let fetch = inner.fetcher.fetch(&inner.request_url, inner.timeout);

        let payload = match tokio::time::timeout(inner.timeout, fetch).await {
            Ok(result) => result?,
            Err(_) => return Err(PollError::Timeout),
        };

        inner.normalizer.normalize(&payload)
    }

    async fn notify(&self, snapshot: &Arc<Snapshot>) {
        self.inner.updates.send_replace(Arc::clone(snapshot));

        for output in &self.inner.outputs {
            if let Err(e) = output.emit(snapshot).await {
                warn!(coordinator = %self.inner.name, "failed to emit snapshot: {}", e);
            }
        }
    }
}

/// Builder for configuring a Coordinator.
#[derive(Debug, Default)]
pub struct CoordinatorBuilder {
    name: Option<String>,
    request_url: Option<String>,
    fetcher: Option<Arc<dyn Fetcher>>,
    normalizer: Normalizer,
    timeout: Option<Duration>,
    interval: Option<Duration>,
    outputs: Vec<Output>,
}

impl CoordinatorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the name used in logs (default: "sharewatch").
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the request URL.
    pub fn request_url(mut self, url: impl Into<String>) -> Self {
        self.request_url = Some(url.into());
        self
    }

    /// Take the request URL and name from a resolved share target.
    pub fn target(mut self, target: &ShareTarget) -> Self {
        self.request_url = Some(target.request_url().to_string());
        if self.name.is_none() {
            self.name = Some(match target.shared_code() {
                Some(code) => format!("sharewatch-{}", code),
                None => "sharewatch".to_string(),
            });
        }
        self
    }

    /// Set the fetcher. It is shared, never owned exclusively.
    pub fn fetcher(mut self, fetcher: Arc<dyn Fetcher>) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Use an HTTP poller as the fetcher.
    pub fn poller(self, poller: SharePoller) -> Self {
        self.fetcher(Arc::new(poller))
    }

    /// Set the normalizer policy.
    pub fn normalizer(mut self, normalizer: Normalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Set the per-cycle timeout (default: 10 seconds). Must be non-zero.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the refresh interval (default: 60 seconds). Must be non-zero.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Add an output notified after every completed cycle.
    pub fn output(mut self, output: Output) -> Self {
        self.outputs.push(output);
        self
    }

    /// Build the coordinator.
    pub fn build(self) -> Result<Coordinator, CoordinatorError> {
        let request_url = self
            .request_url
            .ok_or(CoordinatorError::Incomplete("request URL"))?;
        let fetcher = self.fetcher.ok_or(CoordinatorError::Incomplete("fetcher"))?;
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        if timeout.is_zero() {
            return Err(CoordinatorError::ZeroDuration("timeout"));
        }
        let interval = self.interval.unwrap_or(DEFAULT_INTERVAL);
        if interval.is_zero() {
            return Err(CoordinatorError::ZeroDuration("interval"));
        }
        let store = Arc::new(SnapshotStore::new());
        let (updates, _) = watch::channel(store.current());

        Ok(Coordinator {
            inner: Arc::new(Inner {
                name: self.name.unwrap_or_else(|| "sharewatch".to_string()),
                request_url,
                fetcher,
                normalizer: self.normalizer,
                timeout,
                interval,
                store,
                outputs: self.outputs,
                updates,
                in_flight: AtomicBool::new(false),
            }),
        })
    }
}

/// Handle for controlling the refresh timer.
///
/// Dropping this handle also stops the timer.
#[derive(Debug)]
pub struct RefreshHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
    store: Arc<SnapshotStore>,
}

impl RefreshHandle {
    /// Stop the timer. The coordinator stays usable for manual refreshes.
    pub fn stop(self) {
        let _ = self.stop_tx.send(true);
    }

    /// Tear the coordinator down: refuse further writes, stop the timer and
    /// wait for its task to finish.
    pub async fn teardown(self) {
        self.store.close();
        let _ = self.stop_tx.send(true);
        let _ = self.task.await;
    }

    /// Whether the timer task has finished.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

/// Marks a cycle in flight; clears the flag when dropped.
struct InFlightGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}
