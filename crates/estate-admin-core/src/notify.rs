//! Transient notification queue.
//!
//! # Design
//! - The rendering container is mounted lazily, once, on first use.
//! - Each notification owns its expiry timer; dismissing it aborts the timer so
//!   removal happens exactly once.
//! - No cap and no coalescing: every call produces one visible unit, appended
//!   after the units already shown.
//! - The surface is never called with the list lock held. A surface that panics
//!   leaves the queue usable, and [`in_surface_call`] lets a panic hook see that
//!   the failure came from rendering.

use std::cell::Cell;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use estate_admin_telemetry::Metrics;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::AbortHandle;
use tracing::debug;

use crate::error::{CoreError, CoreResult};

/// Severity classification for a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Neutral information.
    Info,
    /// Completed operation.
    Success,
    /// Something needs attention but nothing failed.
    Warning,
    /// Failed operation.
    Error,
}

impl Severity {
    /// Lower-case name used for styling and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Monotonic notification identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NotificationId(pub u64);

/// One transient feedback unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Identifier used for dismissal.
    pub id: NotificationId,
    /// Text shown to the user.
    pub message: String,
    /// Severity classification.
    pub severity: Severity,
    /// Time the unit stays visible unless dismissed earlier.
    #[serde(skip)]
    pub duration: Duration,
}

thread_local! {
    static SURFACE_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Marks the current thread as inside a surface call until dropped.
struct SurfaceCall;

impl SurfaceCall {
    fn enter() -> Self {
        SURFACE_DEPTH.with(|depth| depth.set(depth.get().saturating_add(1)));
        Self
    }
}

impl Drop for SurfaceCall {
    fn drop(&mut self) {
        SURFACE_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

/// Whether the current thread is running a [`NotificationSurface`] method.
#[must_use]
pub fn in_surface_call() -> bool {
    SURFACE_DEPTH.with(|depth| depth.get() > 0)
}

/// Rendering port for notifications.
///
/// Calls arrive after the queue has released its own lock, possibly from
/// several threads.
pub trait NotificationSurface: Send + Sync {
    /// Create the container that hosts notifications. Called at most once.
    fn mount(&self);
    /// Render a new unit after all currently visible ones.
    fn show(&self, notification: &Notification);
    /// Remove a unit from the container.
    fn hide(&self, id: NotificationId);
}

struct Entry {
    notification: Notification,
    expiry: AbortHandle,
}

struct QueueShared {
    surface: Arc<dyn NotificationSurface>,
    mounted: OnceCell<()>,
    next_id: AtomicU64,
    visible: Mutex<Vec<Entry>>,
    default_duration: Duration,
    runtime: Handle,
    metrics: Option<Metrics>,
}

impl QueueShared {
    fn entries(&self) -> MutexGuard<'_, Vec<Entry>> {
        self.visible.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn remove(&self, id: NotificationId, reason: &'static str) -> bool {
        let mut entries = self.entries();
        let Some(index) = entries
            .iter()
            .position(|entry| entry.notification.id == id)
        else {
            return false;
        };
        let entry = entries.remove(index);
        drop(entries);
        entry.expiry.abort();
        let _call = SurfaceCall::enter();
        self.surface.hide(id);
        debug!(id = id.0, reason, "notification removed");
        true
    }
}

/// Queue of visible notifications with per-unit expiry.
#[derive(Clone)]
pub struct NotificationQueue {
    shared: Arc<QueueShared>,
}

impl NotificationQueue {
    /// Create a queue rendering onto `surface`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NoRuntime`] when called outside a tokio runtime,
    /// since expiry timers need one.
    pub fn new(
        surface: Arc<dyn NotificationSurface>,
        default_duration: Duration,
    ) -> CoreResult<Self> {
        Self::build(surface, default_duration, None)
    }

    /// Create a queue that also counts emitted notifications.
    ///
    /// # Errors
    ///
    /// Same as [`NotificationQueue::new`].
    pub fn with_metrics(
        surface: Arc<dyn NotificationSurface>,
        default_duration: Duration,
        metrics: Metrics,
    ) -> CoreResult<Self> {
        Self::build(surface, default_duration, Some(metrics))
    }

    fn build(
        surface: Arc<dyn NotificationSurface>,
        default_duration: Duration,
        metrics: Option<Metrics>,
    ) -> CoreResult<Self> {
        let runtime = Handle::try_current().map_err(|_| CoreError::NoRuntime)?;
        Ok(Self {
            shared: Arc::new(QueueShared {
                surface,
                mounted: OnceCell::new(),
                next_id: AtomicU64::new(1),
                visible: Mutex::new(Vec::new()),
                default_duration,
                runtime,
                metrics,
            }),
        })
    }

    /// Show a notification for the default duration.
    pub fn notify(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        self.notify_for(message, severity, self.shared.default_duration)
    }

    /// Show a notification for an explicit duration.
    pub fn notify_for(
        &self,
        message: impl Into<String>,
        severity: Severity,
        duration: Duration,
    ) -> NotificationId {
        let shared = &self.shared;
        shared.mounted.get_or_init(|| {
            let _call = SurfaceCall::enter();
            shared.surface.mount();
        });

        let id = NotificationId(shared.next_id.fetch_add(1, Ordering::Relaxed));
        let notification = Notification {
            id,
            message: message.into(),
            severity,
            duration,
        };

        let weak: Weak<QueueShared> = Arc::downgrade(shared);
        let expiry = shared.runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            if let Some(shared) = weak.upgrade() {
                shared.remove(id, "expired");
            }
        });
        shared.entries().push(Entry {
            notification: notification.clone(),
            expiry: expiry.abort_handle(),
        });
        if let Some(metrics) = &shared.metrics {
            metrics.inc_notification(severity.as_str());
        }

        debug!(
            id = id.0,
            severity = severity.as_str(),
            message = %notification.message,
            "notification shown"
        );
        let _call = SurfaceCall::enter();
        shared.surface.show(&notification);
        id
    }

    /// Dismiss a notification before it expires.
    ///
    /// Returns `false` when the unit is already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        self.shared.remove(id, "dismissed")
    }

    /// Snapshot of visible notifications in display order.
    #[must_use]
    pub fn visible(&self) -> Vec<Notification> {
        self.shared
            .entries()
            .iter()
            .map(|entry| entry.notification.clone())
            .collect()
    }

    /// Run `task` on the runtime the queue was created in.
    pub(crate) fn spawn<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        drop(self.shared.runtime.spawn(task));
    }
}
