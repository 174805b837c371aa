//! Recording doubles for the presentation ports.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use estate_admin_models::StatsSnapshot;

use crate::config::{AdminConfig, AuthToken};
use crate::gateway::RequestGateway;
use crate::notify::{Notification, NotificationId, NotificationQueue, NotificationSurface};
use crate::ports::{Interaction, StatSink, ViewPort};

/// Base URL on a port nothing listens on.
pub(crate) fn closed_base() -> String {
    "http://127.0.0.1:9/adminapi/".to_string()
}

/// Gateway plus its queue, rendering onto `surface`.
pub(crate) fn gateway_for(
    base: &str,
    surface: Arc<RecordingSurface>,
) -> (RequestGateway, NotificationQueue) {
    let config = AdminConfig::new(base, AuthToken::new("test-token")).expect("valid base");
    let queue = NotificationQueue::new(surface, Duration::from_secs(30)).expect("runtime");
    let gateway = RequestGateway::new(Arc::new(config), queue.clone()).expect("gateway");
    (gateway, queue)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum SurfaceEvent {
    Mounted,
    Shown(Notification),
    Hidden(NotificationId),
}

#[derive(Default)]
pub(crate) struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    pub(crate) fn events(&self) -> Vec<SurfaceEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: SurfaceEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl NotificationSurface for RecordingSurface {
    fn mount(&self) {
        self.push(SurfaceEvent::Mounted);
    }

    fn show(&self, notification: &Notification) {
        self.push(SurfaceEvent::Shown(notification.clone()));
    }

    fn hide(&self, id: NotificationId) {
        self.push(SurfaceEvent::Hidden(id));
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ViewEvent {
    Reloaded,
    Premium(u64, String),
}

#[derive(Default)]
pub(crate) struct RecordingView {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingView {
    pub(crate) fn events(&self) -> Vec<ViewEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ViewPort for RecordingView {
    fn reload_view(&self) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ViewEvent::Reloaded);
    }

    fn mark_premium(&self, property_id: u64, label: &str) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(ViewEvent::Premium(property_id, label.to_string()));
    }
}

/// Interaction that answers every prompt and confirmation the same way.
pub(crate) struct ScriptedInteraction {
    prompt_answer: Option<String>,
    confirm_answer: bool,
    prompts: Mutex<Vec<String>>,
    confirmations: Mutex<Vec<String>>,
}

impl Default for ScriptedInteraction {
    fn default() -> Self {
        Self::answering(None, true)
    }
}

impl ScriptedInteraction {
    pub(crate) fn answering(prompt_answer: Option<&str>, confirm_answer: bool) -> Self {
        Self {
            prompt_answer: prompt_answer.map(str::to_string),
            confirm_answer,
            prompts: Mutex::new(Vec::new()),
            confirmations: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn confirmations(&self) -> Vec<String> {
        self.confirmations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Interaction for ScriptedInteraction {
    fn prompt(&self, message: &str) -> Option<String> {
        self.prompts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        self.prompt_answer.clone()
    }

    fn confirm(&self, message: &str) -> bool {
        self.confirmations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_string());
        self.confirm_answer
    }
}

#[derive(Default)]
pub(crate) struct RecordingStats {
    applied: Mutex<Vec<StatsSnapshot>>,
}

impl RecordingStats {
    pub(crate) fn applied(&self) -> Vec<StatsSnapshot> {
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatSink for RecordingStats {
    fn apply(&self, snapshot: &StatsSnapshot) -> usize {
        self.applied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(snapshot.clone());
        snapshot.values.len()
    }
}
