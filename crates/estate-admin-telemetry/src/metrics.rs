//! Prometheus-backed counters for the admin console.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Counts outcomes only; no latency histograms are kept client-side.

use std::sync::Arc;

use anyhow::{Context, Result};
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};
use serde::Serialize;

/// Outcome label for resolved successes.
pub const OUTCOME_SUCCESS: &str = "success";
/// Outcome label for resolved failures.
pub const OUTCOME_FAILURE: &str = "failure";

const OUTCOME_LABELS: [&str; 2] = [OUTCOME_SUCCESS, OUTCOME_FAILURE];
const SEVERITY_LABELS: [&str; 4] = ["info", "success", "warning", "error"];

/// Prometheus-backed metrics registry shared by the console components.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    requests_total: IntCounterVec,
    notifications_total: IntCounterVec,
    stat_polls_total: IntCounterVec,
}

/// Totals summed across label values, for status output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    /// Requests that resolved as success.
    pub requests_succeeded: u64,
    /// Requests that resolved as failure.
    pub requests_failed: u64,
    /// Notifications emitted, any severity.
    pub notifications: u64,
    /// Statistics polls, any outcome.
    pub stat_polls: u64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be
    /// registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounterVec::new(
            Opts::new(
                "estate_admin_requests_total",
                "Admin API requests by outcome",
            ),
            &["outcome"],
        )?;
        let notifications_total = IntCounterVec::new(
            Opts::new(
                "estate_admin_notifications_total",
                "Notifications emitted by severity",
            ),
            &["severity"],
        )?;
        let stat_polls_total = IntCounterVec::new(
            Opts::new(
                "estate_admin_stat_polls_total",
                "Scheduled statistics refreshes by outcome",
            ),
            &["outcome"],
        )?;

        registry.register(Box::new(requests_total.clone()))?;
        registry.register(Box::new(notifications_total.clone()))?;
        registry.register(Box::new(stat_polls_total.clone()))?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                requests_total,
                notifications_total,
                stat_polls_total,
            }),
        })
    }

    /// Count one resolved request.
    pub fn inc_request(&self, outcome: &str) {
        self.inner.requests_total.with_label_values(&[outcome]).inc();
    }

    /// Count one emitted notification.
    pub fn inc_notification(&self, severity: &str) {
        self.inner
            .notifications_total
            .with_label_values(&[severity])
            .inc();
    }

    /// Count one statistics poll.
    pub fn inc_stat_poll(&self, outcome: &str) {
        self.inner
            .stat_polls_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Render the registry in the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if the metrics cannot be encoded or if the encoded
    /// buffer is not valid UTF-8.
    pub fn render(&self) -> Result<String> {
        let encoder = TextEncoder::new();
        let metric_families = self.inner.registry.gather();
        let mut buffer = Vec::new();
        encoder
            .encode(&metric_families, &mut buffer)
            .context("failed to encode Prometheus metrics")?;
        String::from_utf8(buffer).context("metrics output was not valid UTF-8")
    }

    /// Take a point-in-time snapshot of the counters.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = |outcome: &str| {
            self.inner
                .requests_total
                .with_label_values(&[outcome])
                .get()
        };
        let notifications: u64 = SEVERITY_LABELS
            .iter()
            .map(|severity| {
                self.inner
                    .notifications_total
                    .with_label_values(&[*severity])
                    .get()
            })
            .sum();
        let stat_polls: u64 = OUTCOME_LABELS
            .iter()
            .map(|outcome| {
                self.inner
                    .stat_polls_total
                    .with_label_values(&[*outcome])
                    .get()
            })
            .sum();
        MetricsSnapshot {
            requests_succeeded: requests(OUTCOME_SUCCESS),
            requests_failed: requests(OUTCOME_FAILURE),
            notifications,
            stat_polls,
        }
    }
}
