//! Output renderers and formatting helpers for CLI commands.

use anyhow::anyhow;
use clap::ValueEnum;
use estate_admin_core::Notification;
use estate_admin_models::{ChartData, StatsSnapshot};
use serde::Serialize;

use crate::client::{CliError, CliResult};

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub(crate) enum OutputFormat {
    Table,
    Json,
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

pub(crate) fn render_notification(notification: &Notification, format: OutputFormat) -> String {
    match format {
        OutputFormat::Json => serde_json::to_string(notification)
            .unwrap_or_else(|_| notification.message.clone()),
        OutputFormat::Table => format!(
            "[{}] {}",
            notification.severity.as_str(),
            notification.message
        ),
    }
}

pub(crate) fn render_stats(snapshot: &StatsSnapshot, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(&snapshot.values),
        OutputFormat::Table => {
            let width = snapshot
                .values
                .keys()
                .map(String::len)
                .max()
                .unwrap_or(0)
                .max("STAT".len());
            let mut lines = vec![format!("{:<width$} VALUE", "STAT")];
            lines.extend(
                snapshot
                    .display_pairs()
                    .map(|(key, value)| format!("{key:<width$} {value}")),
            );
            Ok(lines.join("\n"))
        }
    }
}

pub(crate) fn render_chart(chart: &ChartData, format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json(chart),
        OutputFormat::Table => {
            let mut lines = vec![format!("{:<6} {:>8}", "DAY", "VIEWS")];
            lines.extend(
                chart
                    .labels
                    .iter()
                    .zip(&chart.values)
                    .map(|(label, views)| format!("{label:<6} {views:>8}")),
            );
            Ok(lines.join("\n"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estate_admin_core::{NotificationId, Severity};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn stats_table_aligns_keys() -> CliResult<()> {
        let snapshot = StatsSnapshot::from_body(&json!({
            "stats": {"total_users": 42, "revenue": "NPR 1,000"}
        }));
        let text = render_stats(&snapshot, OutputFormat::Table)?;
        assert_eq!(
            text,
            "STAT        VALUE\nrevenue     NPR 1,000\ntotal_users 42"
        );
        Ok(())
    }

    #[test]
    fn chart_renders_both_formats() -> CliResult<()> {
        let chart = ChartData {
            labels: vec!["01/02".into(), "01/03".into()],
            values: vec![4, 12],
        };
        let table = render_chart(&chart, OutputFormat::Table)?;
        assert!(table.contains("01/03        12"));
        let json = render_chart(&chart, OutputFormat::Json)?;
        assert!(json.contains("\"labels\""));
        Ok(())
    }

    #[test]
    fn notifications_render_with_severity() {
        let notification = Notification {
            id: NotificationId(1),
            message: "User \"sam\" has been banned.".into(),
            severity: Severity::Success,
            duration: Duration::from_secs(5),
        };
        assert_eq!(
            render_notification(&notification, OutputFormat::Table),
            "[success] User \"sam\" has been banned."
        );
        assert!(render_notification(&notification, OutputFormat::Json).contains("\"severity\":\"success\""));
    }
}
