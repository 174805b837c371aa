//! Terminal implementations of the presentation ports.

use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use estate_admin_core::{
    Interaction, Notification, NotificationId, NotificationSurface, StatSink, ViewPort,
};
use estate_admin_models::StatsSnapshot;
use tracing::{debug, info};

use crate::output::{OutputFormat, render_notification, render_stats};

/// Writes notifications to stderr as they are shown.
pub(crate) struct TerminalSurface {
    format: OutputFormat,
}

impl TerminalSurface {
    pub(crate) const fn new(format: OutputFormat) -> Self {
        Self { format }
    }
}

impl NotificationSurface for TerminalSurface {
    fn mount(&self) {
        debug!("terminal notification surface ready");
    }

    fn show(&self, notification: &Notification) {
        eprintln!("{}", render_notification(notification, self.format));
    }

    fn hide(&self, id: NotificationId) {
        debug!(id = id.0, "notification expired");
    }
}

/// The terminal has no persistent view; reloads are logged and relabels
/// printed.
pub(crate) struct TerminalView;

impl ViewPort for TerminalView {
    fn reload_view(&self) {
        info!("view reload requested");
    }

    fn mark_premium(&self, property_id: u64, label: &str) {
        println!("property {property_id}: control now reads \"{label}\"");
    }
}

/// Prompts on stderr and reads answers from stdin.
pub(crate) struct StdinInteraction {
    assume_yes: bool,
}

impl StdinInteraction {
    pub(crate) const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

fn read_answer(message: &str) -> Option<String> {
    eprint!("{message} ");
    let _ = io::stderr().flush();
    let mut line = String::new();
    match io::stdin().lock().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
    }
}

pub(crate) fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

impl Interaction for StdinInteraction {
    fn prompt(&self, message: &str) -> Option<String> {
        read_answer(message)
    }

    fn confirm(&self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        read_answer(&format!("{message} [y/N]")).is_some_and(|answer| is_affirmative(&answer))
    }
}

/// Keeps the latest statistics and optionally prints each refresh.
pub(crate) struct TerminalStats {
    format: OutputFormat,
    live: AtomicBool,
    latest: Mutex<Option<StatsSnapshot>>,
}

impl TerminalStats {
    pub(crate) const fn new(format: OutputFormat) -> Self {
        Self {
            format,
            live: AtomicBool::new(false),
            latest: Mutex::new(None),
        }
    }

    /// Print every subsequent refresh as it arrives.
    pub(crate) fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::Relaxed);
    }

    pub(crate) fn latest(&self) -> Option<StatsSnapshot> {
        self.latest
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl StatSink for TerminalStats {
    fn apply(&self, snapshot: &StatsSnapshot) -> usize {
        *self.latest.lock().unwrap_or_else(PoisonError::into_inner) = Some(snapshot.clone());
        if self.live.load(Ordering::Relaxed) {
            match render_stats(snapshot, self.format) {
                Ok(text) => println!("{text}"),
                Err(err) => debug!(error = %err.display_message(), "statistics not rendered"),
            }
        }
        snapshot.values.len()
    }
}
