//! Periodic statistics refresh.
//!
//! # Design
//! - The first refresh happens one full period after start.
//! - A failed tick leaves displayed values untouched and never changes the
//!   schedule.
//! - Stopping waits for an in-flight refresh to resolve; requests are never
//!   cancelled.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use estate_admin_models::{Endpoint, StatsSnapshot, stat_element_id};
use estate_admin_telemetry::{Metrics, OUTCOME_FAILURE, OUTCOME_SUCCESS};
use tokio::runtime::Handle;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{CoreError, CoreResult};
use crate::gateway::{ActionRequest, ActionResult, RequestGateway};
use crate::ports::StatSink;

/// One display element showing a statistic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatElement {
    /// Element identifier, matched by `-{key}` suffix.
    pub id: String,
    /// Text currently shown.
    pub text: String,
}

/// In-memory set of statistic display elements.
#[derive(Debug, Default)]
pub struct StatBoard {
    elements: Mutex<Vec<StatElement>>,
}

impl StatBoard {
    /// Board with the given element identifiers, all blank.
    #[must_use]
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let elements = ids
            .into_iter()
            .map(|id| StatElement {
                id: id.into(),
                text: String::new(),
            })
            .collect();
        Self {
            elements: Mutex::new(elements),
        }
    }

    /// Board with one `stat-{key}` element per key.
    #[must_use]
    pub fn for_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(keys.into_iter().map(stat_element_id))
    }

    fn lock(&self) -> MutexGuard<'_, Vec<StatElement>> {
        self.elements.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Text of the element with exactly this identifier.
    #[must_use]
    pub fn text(&self, id: &str) -> Option<String> {
        self.lock()
            .iter()
            .find(|element| element.id == id)
            .map(|element| element.text.clone())
    }

    /// Snapshot of all elements in insertion order.
    #[must_use]
    pub fn elements(&self) -> Vec<StatElement> {
        self.lock().clone()
    }
}

impl StatSink for StatBoard {
    fn apply(&self, snapshot: &StatsSnapshot) -> usize {
        let mut elements = self.lock();
        let mut changed = 0;
        for (key, text) in snapshot.display_pairs() {
            let suffix = format!("-{key}");
            let target = elements
                .iter_mut()
                .find(|element| element.id.ends_with(&suffix) || element.id == key);
            if let Some(element) = target {
                element.text = text;
                changed += 1;
            } else {
                debug!(key, "no display element for statistic");
            }
        }
        changed
    }
}

/// Future source of pushed statistics. Nothing implements it yet; polling is
/// the only delivery path.
#[async_trait]
pub trait PushChannel: Send + Sync {
    /// Wait for the next pushed snapshot; `None` when the channel closes.
    async fn next_snapshot(&self) -> Option<StatsSnapshot>;
}

/// Issues the statistics request on a fixed period.
#[derive(Clone)]
pub struct PollingScheduler {
    gateway: RequestGateway,
    sink: Arc<dyn StatSink>,
    interval: Duration,
    metrics: Option<Metrics>,
}

impl PollingScheduler {
    /// Scheduler refreshing `sink` every `interval`.
    #[must_use]
    pub fn new(gateway: RequestGateway, sink: Arc<dyn StatSink>, interval: Duration) -> Self {
        Self {
            gateway,
            sink,
            interval,
            metrics: None,
        }
    }

    /// Count ticks in `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Period between refreshes.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Run one refresh now.
    pub async fn refresh(&self) -> ActionResult {
        let result = self.gateway.send(ActionRequest::new(Endpoint::Stats)).await;
        let outcome = if let Some(body) = result.body() {
            let snapshot = StatsSnapshot::from_body(body);
            let changed = self.sink.apply(&snapshot);
            debug!(changed, "statistics refreshed");
            OUTCOME_SUCCESS
        } else {
            OUTCOME_FAILURE
        };
        if let Some(metrics) = &self.metrics {
            metrics.inc_stat_poll(outcome);
        }
        result
    }

    /// Start ticking on the current runtime.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRuntime`] outside a tokio runtime.
    pub fn start(self) -> CoreResult<PollingHandle> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        let stop = Arc::new(Notify::new());
        let stop_signal = Arc::clone(&stop);
        let period = self.interval;
        info!(period_secs = period.as_secs_f64(), "statistics polling started");

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = stop_signal.notified() => break,
                    _ = ticker.tick() => {
                        let _ = self.refresh().await;
                    }
                }
            }
            info!("statistics polling stopped");
        });

        Ok(PollingHandle { stop, task })
    }
}

/// Control handle for a running scheduler. Dropping it leaves the task
/// running.
#[derive(Debug)]
pub struct PollingHandle {
    stop: Arc<Notify>,
    task: JoinHandle<()>,
}

impl PollingHandle {
    /// Ask the scheduler to stop after any in-flight refresh.
    pub fn stop(&self) {
        self.stop.notify_one();
    }

    /// Stop and wait for the task to exit.
    pub async fn shutdown(self) {
        self.stop();
        if let Err(err) = self.task.await {
            debug!(error = %err, "polling task ended abnormally");
        }
    }
}
