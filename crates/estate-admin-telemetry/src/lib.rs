#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
//! Telemetry primitives shared across the estate admin workspace.
//!
//! Centralises logging setup and the Prometheus counters the console keeps
//! about dispatched requests, emitted notifications, and statistics polls.

mod init;
mod metrics;

pub use init::{LogFormat, LoggingConfig, build_sha, init_logging, log_format_from_str};
pub use metrics::{Metrics, MetricsSnapshot, OUTCOME_FAILURE, OUTCOME_SUCCESS};
