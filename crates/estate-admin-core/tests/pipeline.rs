//! End-to-end wiring through the orchestrator against a mock admin API.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use estate_admin_core::{
    AbortReason, ActionOutcome, AdminConfig, AuthToken, Interaction, Notification,
    NotificationId, NotificationSurface, Orchestrator, PresentationPorts, Severity, StatBoard,
    ViewPort,
};
use httpmock::prelude::*;
use serde_json::json;

#[derive(Default)]
struct Surface {
    shown: Mutex<Vec<String>>,
}

impl NotificationSurface for Surface {
    fn mount(&self) {}

    fn show(&self, notification: &Notification) {
        self.shown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification.message.clone());
    }

    fn hide(&self, _id: NotificationId) {}
}

#[derive(Default)]
struct View {
    reloads: Mutex<usize>,
}

impl ViewPort for View {
    fn reload_view(&self) {
        *self.reloads.lock().unwrap_or_else(PoisonError::into_inner) += 1;
    }

    fn mark_premium(&self, _property_id: u64, _label: &str) {}
}

struct Decline;

impl Interaction for Decline {
    fn prompt(&self, _message: &str) -> Option<String> {
        None
    }

    fn confirm(&self, _message: &str) -> bool {
        false
    }
}

#[tokio::test]
async fn orchestrated_pipeline_dispatches_and_refreshes() -> anyhow::Result<()> {
    let server = MockServer::start_async().await;
    let approve = server.mock(|when, then| {
        when.method(POST)
            .path("/adminapi/property/approve/")
            .header("x-csrftoken", "page-token");
        then.status(200).json_body(json!({
            "success": true,
            "message": "Property \"Lakeside\" has been approved."
        }));
    });
    let stats = server.mock(|when, then| {
        when.method(GET)
            .path("/adminapi/stats/")
            .header("x-csrftoken", "page-token");
        then.status(200).json_body(json!({
            "success": true,
            "stats": {"total_users": 42, "pending_properties": 3}
        }));
    });

    let page = r#"<head><meta name="csrf-token" content="page-token"></head>"#;
    let config = AdminConfig::new(&server.url("/adminapi/"), AuthToken::from_document(page)?)?
        .with_poll_interval(Duration::from_secs(3600));
    let surface = Arc::new(Surface::default());
    let view = Arc::new(View::default());
    let board = Arc::new(StatBoard::for_keys(["total_users", "pending_properties"]));
    let ports = PresentationPorts {
        surface: surface.clone(),
        view: view.clone(),
        interaction: Arc::new(Decline),
        stats: board.clone(),
    };

    let runtime = Orchestrator::new().initialize(config, ports, None)?;

    let approved = runtime.actions().approve_property(11).await;
    assert!(approved.is_success());
    approve.assert();

    let banned = runtime.actions().ban_user(5).await;
    assert_eq!(banned, ActionOutcome::Aborted(AbortReason::Declined));

    let scheduler = estate_admin_core::PollingScheduler::new(
        runtime.gateway().clone(),
        board.clone(),
        runtime.config().poll_interval(),
    );
    let refreshed = scheduler.refresh().await;
    assert!(refreshed.is_success());
    stats.assert();
    assert_eq!(board.text("stat-total_users").as_deref(), Some("42"));
    assert_eq!(board.text("stat-pending_properties").as_deref(), Some("3"));

    assert_eq!(*view.reloads.lock().unwrap_or_else(PoisonError::into_inner), 1);
    let shown = surface
        .shown
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    assert_eq!(
        shown,
        vec![
            "Property \"Lakeside\" has been approved.".to_string(),
            "Operation completed successfully.".to_string(),
        ]
    );
    let severities = runtime
        .notifications()
        .visible()
        .iter()
        .map(|n| n.severity)
        .collect::<Vec<_>>();
    assert_eq!(severities, vec![Severity::Success, Severity::Success]);

    runtime.polling().stop();
    Ok(())
}
