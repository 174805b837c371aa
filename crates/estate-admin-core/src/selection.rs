//! Bulk selection state for one tabular view.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

/// Selection set used for bulk row actions.
pub type SelectionSet = HashSet<u64>;

/// Result of recomputing the selection after a toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SelectionSummary {
    /// Number of checked rows.
    pub checked: usize,
    /// Whether bulk-action controls should be shown.
    pub controls_visible: bool,
}

/// Tracks which rendered rows are checked.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionTracker {
    rendered: Vec<u64>,
    selected: SelectionSet,
}

impl SelectionTracker {
    /// Tracker over the given rendered rows, nothing checked.
    #[must_use]
    pub fn new(rows: impl IntoIterator<Item = u64>) -> Self {
        Self {
            rendered: rows.into_iter().collect(),
            selected: SelectionSet::new(),
        }
    }

    /// Replace the rendered rows; the selection is emptied.
    pub fn reload(&mut self, rows: impl IntoIterator<Item = u64>) -> SelectionSummary {
        self.rendered = rows.into_iter().collect();
        self.selected.clear();
        self.summary()
    }

    /// Set every rendered row to `checked`.
    pub fn toggle_all(&mut self, checked: bool) -> SelectionSummary {
        if checked {
            self.selected.extend(self.rendered.iter().copied());
        } else {
            self.selected.clear();
        }
        self.summary()
    }

    /// Set one row. Identifiers that are not rendered are ignored.
    pub fn toggle_row(&mut self, id: u64, checked: bool) -> SelectionSummary {
        if !self.rendered.contains(&id) {
            debug!(id, "ignoring toggle for row that is not rendered");
        } else if checked {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
        self.summary()
    }

    /// Empty the selection without changing the rendered rows.
    pub fn clear(&mut self) -> SelectionSummary {
        self.selected.clear();
        self.summary()
    }

    /// Checked row count and control visibility.
    #[must_use]
    pub fn summary(&self) -> SelectionSummary {
        let checked = self.selected.len();
        SelectionSummary {
            checked,
            controls_visible: checked > 0,
        }
    }

    /// Whether a row is checked.
    #[must_use]
    pub fn is_selected(&self, id: u64) -> bool {
        self.selected.contains(&id)
    }

    /// Checked identifiers in rendered order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<u64> {
        self.rendered
            .iter()
            .copied()
            .filter(|id| self.selected.contains(id))
            .collect()
    }
}

/// Tracker shared between the view and the action handlers.
#[derive(Clone, Debug, Default)]
pub struct SharedSelection {
    inner: Arc<Mutex<SelectionTracker>>,
}

impl SharedSelection {
    /// Share an existing tracker.
    #[must_use]
    pub fn new(tracker: SelectionTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    /// Lock the tracker for reading or mutation.
    pub fn lock(&self) -> MutexGuard<'_, SelectionTracker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current checked identifiers in rendered order.
    #[must_use]
    pub fn selected_ids(&self) -> Vec<u64> {
        self.lock().selected_ids()
    }
}
