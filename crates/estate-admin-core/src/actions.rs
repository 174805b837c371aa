//! Domain actions composed from the gateway and view follow-ups.
//!
//! # Design
//! - Confirmation and reason checks run before any request and emit nothing
//!   when they abort.
//! - Follow-ups (reload, relabel) run only on success; failures are already
//!   surfaced by the gateway notification.

use std::sync::Arc;

use estate_admin_models::{BulkPropertyAction, Endpoint, encode_ids, premium_flag};
use tracing::{info, warn};

use crate::gateway::{ActionRequest, ActionResult, RequestGateway};
use crate::notify::Severity;
use crate::ports::{Interaction, ViewPort};
use crate::selection::SharedSelection;

/// Premium control label when the property is premium.
pub const LABEL_REMOVE_PREMIUM: &str = "Remove Premium";
/// Premium control label when the property is not premium.
pub const LABEL_MAKE_PREMIUM: &str = "Make Premium";
/// Warning shown when a bulk action runs with nothing selected.
pub const EMPTY_SELECTION_MESSAGE: &str = "Please select at least one item.";

const REJECT_REASON_PROMPT: &str = "Please provide a reason for rejection:";
const BAN_CONFIRMATION: &str = "Are you sure you want to ban this user?";
const DELETE_CONFIRMATION: &str =
    "Are you sure you want to permanently delete this property? This cannot be undone.";

/// Why an action stopped before sending anything.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbortReason {
    /// Reason prompt was cancelled or left blank.
    MissingReason,
    /// Confirmation was declined.
    Declined,
    /// Bulk action with no selected rows.
    EmptySelection,
}

/// What happened to an action.
#[derive(Clone, Debug, PartialEq)]
pub enum ActionOutcome {
    /// A request was sent and resolved.
    Completed(ActionResult),
    /// Nothing was sent.
    Aborted(AbortReason),
}

impl ActionOutcome {
    /// Whether a request was sent and succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Completed(result) if result.is_success())
    }
}

/// Label for a premium control given the current flag.
#[must_use]
pub const fn premium_label(is_premium: bool) -> &'static str {
    if is_premium {
        LABEL_REMOVE_PREMIUM
    } else {
        LABEL_MAKE_PREMIUM
    }
}

/// Moderation actions for the admin dashboard.
#[derive(Clone)]
pub struct AdminActions {
    gateway: RequestGateway,
    view: Arc<dyn ViewPort>,
    interaction: Arc<dyn Interaction>,
    selection: SharedSelection,
}

impl AdminActions {
    /// Wire handlers onto a gateway, a view, and an interaction port.
    #[must_use]
    pub fn new(
        gateway: RequestGateway,
        view: Arc<dyn ViewPort>,
        interaction: Arc<dyn Interaction>,
        selection: SharedSelection,
    ) -> Self {
        Self {
            gateway,
            view,
            interaction,
            selection,
        }
    }

    /// Selection tracker the bulk actions read from.
    #[must_use]
    pub const fn selection(&self) -> &SharedSelection {
        &self.selection
    }

    /// Approve a pending property.
    pub async fn approve_property(&self, id: u64) -> ActionOutcome {
        self.reloading(ActionRequest::new(Endpoint::PropertyApprove).field("id", id))
            .await
    }

    /// Reject a property. Prompts for a reason when none is supplied.
    pub async fn reject_property(&self, id: u64, reason: Option<&str>) -> ActionOutcome {
        let supplied = reason
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);
        let reason = supplied.or_else(|| {
            self.interaction
                .prompt(REJECT_REASON_PROMPT)
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty())
        });
        let Some(reason) = reason else {
            info!(id, "rejection aborted without a reason");
            return ActionOutcome::Aborted(AbortReason::MissingReason);
        };

        self.reloading(
            ActionRequest::new(Endpoint::PropertyReject)
                .field("id", id)
                .field("reason", reason),
        )
        .await
    }

    /// Flip the premium flag and relabel the control from the returned flag.
    pub async fn toggle_premium(&self, id: u64) -> ActionOutcome {
        let result = self
            .gateway
            .send(ActionRequest::new(Endpoint::PropertyTogglePremium).field("id", id))
            .await;
        if let Some(body) = result.body() {
            match premium_flag(body) {
                Some(flag) => self.view.mark_premium(id, premium_label(flag)),
                None => warn!(id, "premium toggle response carried no flag"),
            }
        }
        ActionOutcome::Completed(result)
    }

    /// Permanently delete a property after confirmation.
    pub async fn delete_property(&self, id: u64) -> ActionOutcome {
        if !self.interaction.confirm(DELETE_CONFIRMATION) {
            return ActionOutcome::Aborted(AbortReason::Declined);
        }
        self.reloading(ActionRequest::new(Endpoint::PropertyDelete).field("id", id))
            .await
    }

    /// Ban a user after confirmation.
    pub async fn ban_user(&self, id: u64) -> ActionOutcome {
        if !self.interaction.confirm(BAN_CONFIRMATION) {
            info!(id, "ban declined");
            return ActionOutcome::Aborted(AbortReason::Declined);
        }
        self.reloading(ActionRequest::new(Endpoint::UserBan).field("id", id))
            .await
    }

    /// Reactivate a banned user.
    pub async fn unban_user(&self, id: u64) -> ActionOutcome {
        self.reloading(ActionRequest::new(Endpoint::UserUnban).field("id", id))
            .await
    }

    /// Mark a user as verified.
    pub async fn verify_user(&self, id: u64) -> ActionOutcome {
        self.reloading(ActionRequest::new(Endpoint::UserVerify).field("id", id))
            .await
    }

    /// Ban every selected user after confirmation.
    pub async fn bulk_ban_users(&self) -> ActionOutcome {
        let Some(ids) = self.selected_or_warn() else {
            return ActionOutcome::Aborted(AbortReason::EmptySelection);
        };
        let question = format!("Are you sure you want to ban {} selected users?", ids.len());
        if !self.interaction.confirm(&question) {
            return ActionOutcome::Aborted(AbortReason::Declined);
        }
        self.bulk(ActionRequest::new(Endpoint::UsersBulkBan).field("ids", encode_ids(&ids)))
            .await
    }

    /// Verify every selected user.
    pub async fn bulk_verify_users(&self) -> ActionOutcome {
        let Some(ids) = self.selected_or_warn() else {
            return ActionOutcome::Aborted(AbortReason::EmptySelection);
        };
        self.bulk(ActionRequest::new(Endpoint::UsersBulkVerify).field("ids", encode_ids(&ids)))
            .await
    }

    /// Apply one action to every selected property. Rejection asks first.
    pub async fn bulk_property_action(&self, action: BulkPropertyAction) -> ActionOutcome {
        let Some(ids) = self.selected_or_warn() else {
            return ActionOutcome::Aborted(AbortReason::EmptySelection);
        };
        if action == BulkPropertyAction::Reject {
            let question = format!(
                "Are you sure you want to reject {} selected properties?",
                ids.len()
            );
            if !self.interaction.confirm(&question) {
                return ActionOutcome::Aborted(AbortReason::Declined);
            }
        }
        self.bulk(
            ActionRequest::new(Endpoint::BulkPropertyActions)
                .field("action", action.as_str())
                .field("ids", encode_ids(&ids)),
        )
        .await
    }

    async fn reloading(&self, request: ActionRequest) -> ActionOutcome {
        let result = self.gateway.send(request).await;
        if result.is_success() {
            self.view.reload_view();
        }
        ActionOutcome::Completed(result)
    }

    async fn bulk(&self, request: ActionRequest) -> ActionOutcome {
        let outcome = self.reloading(request).await;
        if outcome.is_success() {
            self.selection.lock().clear();
        }
        outcome
    }

    fn selected_or_warn(&self) -> Option<Vec<u64>> {
        let ids = self.selection.selected_ids();
        if ids.is_empty() {
            self.gateway
                .notifications()
                .notify(EMPTY_SELECTION_MESSAGE, Severity::Warning);
            None
        } else {
            Some(ids)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::FailureKind;
    use crate::notify::NotificationQueue;
    use crate::selection::SelectionTracker;
    use crate::testing::{
        RecordingSurface, RecordingView, ScriptedInteraction, ViewEvent, closed_base, gateway_for,
    };
    use httpmock::prelude::*;
    use serde_json::json;

    struct Harness {
        actions: AdminActions,
        queue: NotificationQueue,
        view: Arc<RecordingView>,
        interaction: Arc<ScriptedInteraction>,
    }

    fn harness(base: &str, interaction: ScriptedInteraction, rows: &[u64]) -> Harness {
        let (gateway, queue) = gateway_for(base, Arc::new(RecordingSurface::default()));
        let view = Arc::new(RecordingView::default());
        let interaction = Arc::new(interaction);
        let selection = SharedSelection::new(SelectionTracker::new(rows.iter().copied()));
        let actions = AdminActions::new(gateway, view.clone(), interaction.clone(), selection);
        Harness {
            actions,
            queue,
            view,
            interaction,
        }
    }

    #[test]
    fn premium_labels_follow_flag() {
        assert_eq!(premium_label(true), "Remove Premium");
        assert_eq!(premium_label(false), "Make Premium");
    }

    #[tokio::test]
    async fn approve_reloads_on_success() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/adminapi/property/approve/")
                .body("id=12");
            then.status(200)
                .json_body(json!({"success": true, "message": "approved"}));
        });
        let h = harness(&server.url("/adminapi/"), ScriptedInteraction::default(), &[]);

        let outcome = h.actions.approve_property(12).await;

        mock.assert();
        assert!(outcome.is_success());
        assert_eq!(h.view.events(), vec![ViewEvent::Reloaded]);
        assert_eq!(h.queue.visible().len(), 1);
    }

    #[tokio::test]
    async fn failed_action_does_not_reload() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/adminapi/user/verify/");
            then.status(200)
                .json_body(json!({"success": false, "message": "already verified"}));
        });
        let h = harness(&server.url("/adminapi/"), ScriptedInteraction::default(), &[]);

        let outcome = h.actions.verify_user(3).await;

        mock.assert();
        assert_eq!(
            outcome,
            ActionOutcome::Completed(ActionResult::Failure {
                message: "already verified".into(),
                kind: FailureKind::Application,
            })
        );
        assert!(h.view.events().is_empty());
    }

    #[tokio::test]
    async fn reject_uses_prompted_reason() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/adminapi/property/reject/")
                .body("id=7&reason=duplicate+listing");
            then.status(200).json_body(json!({"success": true}));
        });
        let h = harness(
            &server.url("/adminapi/"),
            ScriptedInteraction::answering(Some("  duplicate listing "), true),
            &[],
        );

        let outcome = h.actions.reject_property(7, None).await;

        mock.assert();
        assert!(outcome.is_success());
        assert_eq!(h.interaction.prompts(), vec![REJECT_REASON_PROMPT.to_string()]);
    }

    #[tokio::test]
    async fn reject_with_supplied_reason_skips_prompt() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/adminapi/property/reject/")
                .body("id=2&reason=spam");
            then.status(200).json_body(json!({"success": true}));
        });
        let h = harness(&server.url("/adminapi/"), ScriptedInteraction::default(), &[]);

        let outcome = h.actions.reject_property(2, Some("spam")).await;

        mock.assert();
        assert!(outcome.is_success());
        assert!(h.interaction.prompts().is_empty());
    }

    #[tokio::test]
    async fn reject_aborts_on_blank_or_cancelled_reason() {
        for answer in [None, Some("   ")] {
            let h = harness(
                &closed_base(),
                ScriptedInteraction::answering(answer, true),
                &[],
            );
            let outcome = h.actions.reject_property(7, None).await;
            assert_eq!(outcome, ActionOutcome::Aborted(AbortReason::MissingReason));
            assert!(h.queue.visible().is_empty());
            assert!(h.view.events().is_empty());
        }
    }

    #[tokio::test]
    async fn declined_ban_sends_nothing() {
        let h = harness(
            &closed_base(),
            ScriptedInteraction::answering(None, false),
            &[],
        );
        let outcome = h.actions.ban_user(4).await;
        assert_eq!(outcome, ActionOutcome::Aborted(AbortReason::Declined));
        assert_eq!(h.interaction.confirmations(), vec![BAN_CONFIRMATION.to_string()]);
        assert!(h.queue.visible().is_empty());
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let h = harness(
            &closed_base(),
            ScriptedInteraction::answering(None, false),
            &[],
        );
        let outcome = h.actions.delete_property(4).await;
        assert_eq!(outcome, ActionOutcome::Aborted(AbortReason::Declined));
        assert!(h.queue.visible().is_empty());
    }

    #[tokio::test]
    async fn toggle_premium_relabels_without_reload() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/adminapi/property/toggle-premium/")
                .body("id=8");
            then.status(200).json_body(json!({
                "success": true,
                "is_premium": true,
                "message": "Property \"Loft\" added to premium listings."
            }));
        });
        let h = harness(&server.url("/adminapi/"), ScriptedInteraction::default(), &[]);

        let outcome = h.actions.toggle_premium(8).await;

        mock.assert();
        assert!(outcome.is_success());
        let relabels = h
            .view
            .events()
            .into_iter()
            .map(|event| match event {
                ViewEvent::Premium(id, label) => Some((id, label)),
                ViewEvent::Reloaded => None,
            })
            .collect::<Vec<_>>();
        assert_eq!(relabels, vec![Some((8, LABEL_REMOVE_PREMIUM.to_string()))]);
    }

    #[tokio::test]
    async fn bulk_with_empty_selection_warns_once() {
        let h = harness(&closed_base(), ScriptedInteraction::default(), &[1, 2]);
        let outcome = h.actions.bulk_verify_users().await;
        assert_eq!(outcome, ActionOutcome::Aborted(AbortReason::EmptySelection));
        let visible = h.queue.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].severity, Severity::Warning);
        assert_eq!(visible[0].message, EMPTY_SELECTION_MESSAGE);
    }

    #[tokio::test]
    async fn bulk_property_action_sends_selection_and_clears_it() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/adminapi/bulk/property-actions/")
                .body("action=approve&ids=%5B3%2C5%5D");
            then.status(200)
                .json_body(json!({"success": true, "message": "2 properties approved", "count": 2}));
        });
        let h = harness(
            &server.url("/adminapi/"),
            ScriptedInteraction::default(),
            &[3, 4, 5],
        );
        {
            let mut tracker = h.actions.selection().lock();
            tracker.toggle_row(5, true);
            tracker.toggle_row(3, true);
        }

        let outcome = h
            .actions
            .bulk_property_action(BulkPropertyAction::Approve)
            .await;

        mock.assert();
        assert!(outcome.is_success());
        assert!(h.actions.selection().selected_ids().is_empty());
        assert_eq!(h.view.events(), vec![ViewEvent::Reloaded]);
        assert!(h.interaction.confirmations().is_empty());
    }

    #[tokio::test]
    async fn bulk_reject_and_ban_ask_first() {
        let h = harness(
            &closed_base(),
            ScriptedInteraction::answering(None, false),
            &[1, 2],
        );
        h.actions.selection().lock().toggle_all(true);

        let reject = h
            .actions
            .bulk_property_action(BulkPropertyAction::Reject)
            .await;
        let ban = h.actions.bulk_ban_users().await;

        assert_eq!(reject, ActionOutcome::Aborted(AbortReason::Declined));
        assert_eq!(ban, ActionOutcome::Aborted(AbortReason::Declined));
        assert_eq!(h.interaction.confirmations().len(), 2);
        assert!(h.queue.visible().is_empty());
        assert_eq!(h.actions.selection().selected_ids(), vec![1, 2]);
    }
}
