// Sync controller - Fetch lifecycle, polling and the consumer snapshot
use crate::application::telemetry_repository::TelemetryRepository;
use crate::domain::fetch_state::{FetchPhase, FetchSnapshot};
use crate::domain::query::TrackingQuery;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncOptions {
    /// Fixed refresh interval. `None` disables polling.
    pub poll_interval: Option<Duration>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RefetchOutcome {
    /// The fetch ran and its result was applied.
    Applied,
    /// Another fetch was in flight, or the controller is unmounted.
    Suppressed,
    /// The result arrived after unmount and was dropped.
    Discarded,
}

struct Shared {
    repository: Arc<dyn TelemetryRepository>,
    query: TrackingQuery,
    state: watch::Sender<FetchSnapshot>,
    in_flight: AtomicBool,
    mounted: AtomicBool,
}

impl Shared {
    async fn fetch(&self) -> RefetchOutcome {
        if !self.mounted.load(Ordering::Acquire) {
            return RefetchOutcome::Suppressed;
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            tracing::debug!("fetch already in flight, skipping");
            return RefetchOutcome::Suppressed;
        }

        self.state.send_modify(FetchSnapshot::begin_fetch);
        let result = self.query.run(self.repository.as_ref()).await;

        if !self.mounted.load(Ordering::Acquire) {
            tracing::debug!("controller unmounted, discarding fetch result");
            self.in_flight.store(false, Ordering::Release);
            return RefetchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                tracing::info!(
                    records = page.records.len(),
                    total = page.total_count,
                    "tracking data refreshed"
                );
                self.state.send_modify(|s| s.apply_page(page, Utc::now()));
            }
            Err(err) => {
                tracing::error!(error = %err, kind = ?err.kind(), "tracking fetch failed");
                self.state
                    .send_modify(|s| s.apply_error(err.to_string(), err.kind()));
            }
        }
        self.in_flight.store(false, Ordering::Release);
        RefetchOutcome::Applied
    }
}

/// Owns one [`FetchSnapshot`]. Manual refetch and poll ticks share a single
/// in-flight guard, so at most one request is outstanding per controller.
pub struct SyncController {
    shared: Arc<Shared>,
    poller: Option<JoinHandle<()>>,
}

impl SyncController {
    /// Enters `Loading`, issues the first fetch and starts polling when an
    /// interval is configured. Must be called inside a tokio runtime.
    pub fn mount(
        repository: Arc<dyn TelemetryRepository>,
        query: TrackingQuery,
        options: SyncOptions,
    ) -> Self {
        let mut initial = FetchSnapshot::default();
        initial.begin_fetch();
        let (state, _) = watch::channel(initial);

        let shared = Arc::new(Shared {
            repository,
            query,
            state,
            in_flight: AtomicBool::new(false),
            mounted: AtomicBool::new(true),
        });

        let first = shared.clone();
        tokio::spawn(async move {
            first.fetch().await;
        });

        let poller = options
            .poll_interval
            .map(|interval| tokio::spawn(poll(shared.clone(), interval)));

        Self { shared, poller }
    }

    pub fn snapshot(&self) -> FetchSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<FetchSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn phase(&self) -> FetchPhase {
        self.shared.state.borrow().phase
    }

    pub fn is_mounted(&self) -> bool {
        self.shared.mounted.load(Ordering::Acquire)
    }

    /// Runs a fetch now unless one is already in flight. The fetch runs in its
    /// own task, so dropping this future does not cancel it.
    pub async fn refetch(&self) -> RefetchOutcome {
        let shared = self.shared.clone();
        tokio::spawn(async move { shared.fetch().await })
            .await
            .unwrap_or(RefetchOutcome::Discarded)
    }

    /// Waits until no fetch is in flight and returns the resulting snapshot.
    /// Does not resolve if the controller is unmounted mid-fetch.
    pub async fn settled(&self) -> FetchSnapshot {
        let mut rx = self.subscribe();
        let settled = rx.wait_for(|s| !s.loading).await.map(|s| s.clone());
        settled.unwrap_or_else(|_| self.snapshot())
    }

    /// Stops polling. An in-flight fetch is left to finish but its result is
    /// not applied.
    pub fn unmount(&mut self) {
        if self.shared.mounted.swap(false, Ordering::AcqRel) {
            tracing::debug!("unmounting sync controller");
        }
        if let Some(poller) = self.poller.take() {
            poller.abort();
        }
    }
}

impl Drop for SyncController {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn poll(shared: Arc<Shared>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately; mount already issued that fetch.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        if !shared.mounted.load(Ordering::Acquire) {
            break;
        }
        if shared.in_flight.load(Ordering::Acquire) {
            tracing::debug!("poll tick skipped, fetch in flight");
            continue;
        }
        let tick = shared.clone();
        tokio::spawn(async move {
            tick.fetch().await;
        });
    }
}
