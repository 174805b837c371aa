//! One-shot wiring of the console pipeline.
//!
//! # Design
//! - `initialize` builds everything at most once per orchestrator; later calls
//!   hand back the existing runtime.
//! - The panic fallback is process-wide and installed at most once.
//! - A panic raised while rendering is reported from a fresh task, and a panic
//!   raised while reporting is only logged.

use std::cell::Cell;
use std::fmt::Display;
use std::panic;
use std::sync::Arc;

use estate_admin_telemetry::Metrics;
use once_cell::sync::OnceCell;
use tracing::{error, info, warn};

use crate::actions::AdminActions;
use crate::config::AdminConfig;
use crate::error::CoreResult;
use crate::gateway::RequestGateway;
use crate::notify::{NotificationQueue, NotificationSurface, Severity, in_surface_call};
use crate::polling::{PollingHandle, PollingScheduler};
use crate::ports::{Interaction, StatSink, ViewPort};
use crate::selection::SharedSelection;
use crate::validation::FormValidator;

/// Message shown for failures that escaped every handler.
pub const UNHANDLED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please reload the page.";

static FALLBACK_HOOK: OnceCell<()> = OnceCell::new();

thread_local! {
    static REPORTING: Cell<bool> = const { Cell::new(false) };
}

struct ReportingGuard;

impl ReportingGuard {
    fn enter() -> Self {
        REPORTING.with(|flag| flag.set(true));
        Self
    }
}

impl Drop for ReportingGuard {
    fn drop(&mut self) {
        REPORTING.with(|flag| flag.set(false));
    }
}

/// Rendering and interaction ports supplied by the front end.
#[derive(Clone)]
pub struct PresentationPorts {
    /// Notification renderer.
    pub surface: Arc<dyn NotificationSurface>,
    /// View follow-ups.
    pub view: Arc<dyn ViewPort>,
    /// Prompts and confirmations.
    pub interaction: Arc<dyn Interaction>,
    /// Statistic display elements.
    pub stats: Arc<dyn StatSink>,
}

/// Everything wired by [`Orchestrator::initialize`].
pub struct AdminRuntime {
    config: Arc<AdminConfig>,
    notifications: NotificationQueue,
    gateway: RequestGateway,
    actions: AdminActions,
    selection: SharedSelection,
    validator: FormValidator,
    polling: PollingHandle,
    metrics: Option<Metrics>,
}

impl AdminRuntime {
    /// Configuration the runtime was built from.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Notification queue.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Shared request gateway.
    #[must_use]
    pub const fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    /// Action handlers.
    #[must_use]
    pub const fn actions(&self) -> &AdminActions {
        &self.actions
    }

    /// Bulk selection tracker.
    #[must_use]
    pub const fn selection(&self) -> &SharedSelection {
        &self.selection
    }

    /// Form-submit validation reporting onto the notification queue.
    #[must_use]
    pub const fn validator(&self) -> &FormValidator {
        &self.validator
    }

    /// Running statistics scheduler.
    #[must_use]
    pub const fn polling(&self) -> &PollingHandle {
        &self.polling
    }

    /// Metrics registry, when one was supplied.
    #[must_use]
    pub const fn metrics(&self) -> Option<&Metrics> {
        self.metrics.as_ref()
    }

    /// Log an error that escaped every handler and tell the user.
    pub fn report_unhandled(&self, err: &dyn Display) {
        report(&self.notifications, err);
    }
}

fn report(notifications: &NotificationQueue, err: &dyn Display) {
    error!(error = %err, "unhandled failure");
    notifications.notify(UNHANDLED_ERROR_MESSAGE, Severity::Error);
}

fn report_panic(queue: &NotificationQueue, info: &dyn Display) {
    if REPORTING.with(Cell::get) {
        error!(error = %info, "panic while reporting an unhandled failure");
        return;
    }
    if in_surface_call() {
        let detail = info.to_string();
        let deferred = queue.clone();
        queue.spawn(async move {
            let _reporting = ReportingGuard::enter();
            report(&deferred, &detail);
        });
        return;
    }
    let _reporting = ReportingGuard::enter();
    report(queue, info);
}

fn install_fallback_hook(notifications: &NotificationQueue) {
    let mut installed = false;
    FALLBACK_HOOK.get_or_init(|| {
        let queue = notifications.clone();
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            report_panic(&queue, info);
            previous(info);
        }));
        installed = true;
    });
    if installed {
        info!("panic fallback installed");
    } else {
        warn!("panic fallback already installed; keeping the existing hook");
    }
}

/// Builds the console runtime exactly once.
#[derive(Default)]
pub struct Orchestrator {
    runtime: OnceCell<Arc<AdminRuntime>>,
}

impl Orchestrator {
    /// Orchestrator with nothing initialized.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wire the pipeline and start polling. A second call returns the
    /// runtime built by the first.
    ///
    /// # Errors
    ///
    /// Returns an error when the gateway cannot be built or no tokio runtime
    /// is available.
    pub fn initialize(
        &self,
        config: AdminConfig,
        ports: PresentationPorts,
        metrics: Option<Metrics>,
    ) -> CoreResult<Arc<AdminRuntime>> {
        if let Some(existing) = self.runtime.get() {
            warn!("console already initialized; ignoring repeated initialization");
            return Ok(Arc::clone(existing));
        }
        self.runtime
            .get_or_try_init(|| build(config, ports, metrics).map(Arc::new))
            .map(Arc::clone)
    }

    /// Runtime built by a previous [`Orchestrator::initialize`].
    #[must_use]
    pub fn runtime(&self) -> Option<Arc<AdminRuntime>> {
        self.runtime.get().cloned()
    }
}

fn build(
    config: AdminConfig,
    ports: PresentationPorts,
    metrics: Option<Metrics>,
) -> CoreResult<AdminRuntime> {
    let config = Arc::new(config);
    let notifications = match &metrics {
        Some(metrics) => NotificationQueue::with_metrics(
            ports.surface,
            config.notification_duration(),
            metrics.clone(),
        )?,
        None => NotificationQueue::new(ports.surface, config.notification_duration())?,
    };

    let mut gateway = RequestGateway::new(Arc::clone(&config), notifications.clone())?;
    if let Some(metrics) = &metrics {
        gateway = gateway.with_metrics(metrics.clone());
    }

    let selection = SharedSelection::default();
    let actions = AdminActions::new(
        gateway.clone(),
        ports.view,
        ports.interaction,
        selection.clone(),
    );
    let validator = FormValidator::new(notifications.clone());

    let mut scheduler = PollingScheduler::new(gateway.clone(), ports.stats, config.poll_interval());
    if let Some(metrics) = &metrics {
        scheduler = scheduler.with_metrics(metrics.clone());
    }
    let polling = scheduler.start()?;

    if config.fallback_hook() {
        install_fallback_hook(&notifications);
    }

    info!(
        api_base = %config.api_base(),
        token_present = !config.auth_token().is_empty(),
        "console initialized"
    );
    Ok(AdminRuntime {
        config,
        notifications,
        gateway,
        actions,
        selection,
        validator,
        polling,
        metrics,
    })
}
