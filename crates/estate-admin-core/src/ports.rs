//! Presentation ports driven by the action handlers and the scheduler.
//!
//! The pipeline never touches a concrete rendering technology; front ends
//! implement these traits.

use estate_admin_models::StatsSnapshot;

/// View-level follow-up effects of a successful action.
pub trait ViewPort: Send + Sync {
    /// Re-render the current view from the server.
    fn reload_view(&self);
    /// Relabel a property's premium control in place.
    fn mark_premium(&self, property_id: u64, label: &str);
}

/// Blocking user interaction.
pub trait Interaction: Send + Sync {
    /// Ask for free text. `None` means the user cancelled.
    fn prompt(&self, message: &str) -> Option<String>;
    /// Ask a yes/no question.
    fn confirm(&self, message: &str) -> bool;
}

/// Destination for refreshed statistics.
pub trait StatSink: Send + Sync {
    /// Apply a snapshot. Returns how many display elements changed.
    fn apply(&self, snapshot: &StatsSnapshot) -> usize;
}
