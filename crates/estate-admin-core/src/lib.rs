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
#![allow(clippy::redundant_pub_crate)]

//! Action-dispatch and notification pipeline for the estate admin dashboard.
//!
//! Layout:
//! - `config.rs`: immutable configuration and the anti-forgery token
//! - `gateway.rs`: authenticated HTTP dispatch and response interpretation
//! - `notify.rs`: transient notification queue
//! - `selection.rs`: bulk row selection state
//! - `actions.rs`: moderation actions and their follow-ups
//! - `polling.rs`: periodic statistics refresh and display elements
//! - `orchestrator.rs`: one-shot wiring and the unhandled-failure fallback
//! - `validation.rs`, `export.rs`: local form checks and delimited export

pub mod actions;
pub mod config;
pub mod error;
pub mod export;
pub mod gateway;
pub mod notify;
pub mod orchestrator;
pub mod polling;
pub mod ports;
pub mod selection;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

pub use actions::{AbortReason, ActionOutcome, AdminActions, premium_label};
pub use config::{AdminConfig, AuthToken};
pub use error::{CoreError, CoreResult};
pub use export::export_delimited;
pub use gateway::{ActionRequest, ActionResult, Expectation, FailureKind, RequestGateway};
pub use notify::{Notification, NotificationId, NotificationQueue, NotificationSurface, Severity};
pub use orchestrator::{AdminRuntime, Orchestrator, PresentationPorts, UNHANDLED_ERROR_MESSAGE};
pub use polling::{PollingHandle, PollingScheduler, PushChannel, StatBoard, StatElement};
pub use ports::{Interaction, StatSink, ViewPort};
pub use selection::{SelectionSummary, SelectionTracker, SharedSelection};
pub use validation::{FieldMark, FormField, FormValidator, ValidationReport};
