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
//! Shared HTTP DTOs for the estate admin API.
//!
//! These types describe the contract between the admin console and the
//! `adminapi` endpoints of the listing site. Response bodies are interpreted
//! loosely (the server answers with `{success, message?}` envelopes), so the
//! typed views here are extracted from a parsed [`serde_json::Value`] rather
//! than deserialised strictly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Header carrying the anti-forgery token on every request.
pub const HEADER_CSRF_TOKEN: &str = "X-CSRFToken";
/// Header carrying a per-request correlation identifier.
pub const HEADER_REQUEST_ID: &str = "x-request-id";
/// Default API base used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/adminapi/";
/// Prefix used for statistic display element identifiers.
pub const STAT_ELEMENT_PREFIX: &str = "stat-";

/// HTTP verbs used by the admin API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// Read-only request; payload travels as query parameters.
    Get,
    /// Mutating request; payload travels as a form body.
    Post,
}

impl HttpMethod {
    /// Upper-case verb for logging.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

/// Endpoints exposed under the admin API base path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Dashboard statistics snapshot.
    Stats,
    /// Thirty day page-view series for the dashboard chart.
    ChartData,
    /// Approve a pending property listing.
    PropertyApprove,
    /// Reject a property listing with a reason.
    PropertyReject,
    /// Flip the premium flag of a property.
    PropertyTogglePremium,
    /// Permanently delete a property.
    PropertyDelete,
    /// Deactivate a user account.
    UserBan,
    /// Reactivate a user account.
    UserUnban,
    /// Mark a user account as verified.
    UserVerify,
    /// Deactivate several user accounts.
    UsersBulkBan,
    /// Verify several user accounts.
    UsersBulkVerify,
    /// Apply one action to several properties.
    BulkPropertyActions,
}

impl Endpoint {
    /// Path suffix joined onto the configured API base.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Stats => "stats/",
            Self::ChartData => "chart-data/",
            Self::PropertyApprove => "property/approve/",
            Self::PropertyReject => "property/reject/",
            Self::PropertyTogglePremium => "property/toggle-premium/",
            Self::PropertyDelete => "property/delete/",
            Self::UserBan => "user/ban/",
            Self::UserUnban => "user/unban/",
            Self::UserVerify => "user/verify/",
            Self::UsersBulkBan => "users/bulk-ban/",
            Self::UsersBulkVerify => "users/bulk-verify/",
            Self::BulkPropertyActions => "bulk/property-actions/",
        }
    }

    /// Verb the server expects for the endpoint.
    #[must_use]
    pub const fn method(self) -> HttpMethod {
        match self {
            Self::Stats | Self::ChartData => HttpMethod::Get,
            _ => HttpMethod::Post,
        }
    }

    /// Stable label used in logs and metric series.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::ChartData => "chart_data",
            Self::PropertyApprove => "property_approve",
            Self::PropertyReject => "property_reject",
            Self::PropertyTogglePremium => "property_toggle_premium",
            Self::PropertyDelete => "property_delete",
            Self::UserBan => "user_ban",
            Self::UserUnban => "user_unban",
            Self::UserVerify => "user_verify",
            Self::UsersBulkBan => "users_bulk_ban",
            Self::UsersBulkVerify => "users_bulk_verify",
            Self::BulkPropertyActions => "bulk_property_actions",
        }
    }
}

/// Actions accepted by the bulk property endpoint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum BulkPropertyAction {
    /// Approve every selected property.
    Approve,
    /// Reject every selected property.
    Reject,
    /// Mark every selected property as verified.
    Verify,
    /// Mark every selected property as premium.
    MakePremium,
}

impl BulkPropertyAction {
    /// Form value understood by the server.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Verify => "verify",
            Self::MakePremium => "make_premium",
        }
    }
}

/// Encode a list of row identifiers the way bulk endpoints read them
/// (a JSON array inside a single form field).
#[must_use]
pub fn encode_ids(ids: &[u64]) -> String {
    let items = ids.iter().map(u64::to_string).collect::<Vec<_>>();
    format!("[{}]", items.join(","))
}

/// Read the `message` field of a response envelope, if it is a string.
#[must_use]
pub fn envelope_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Read the `is_premium` flag returned by the toggle-premium endpoint.
#[must_use]
pub fn premium_flag(body: &Value) -> Option<bool> {
    body.get("is_premium").and_then(Value::as_bool)
}

/// Statistic values keyed by stat name, in key order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Raw values keyed by statistic name.
    pub values: BTreeMap<String, Value>,
}

impl StatsSnapshot {
    /// Extract statistics from a response body.
    ///
    /// The server wraps values as `{success, stats: {...}}`; a bare mapping is
    /// also accepted, minus the envelope keys.
    #[must_use]
    pub fn from_body(body: &Value) -> Self {
        let values = if let Some(map) = body.get("stats").and_then(Value::as_object) {
            map.iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect()
        } else {
            body.as_object()
                .map(|map| {
                    map.iter()
                        .filter(|(key, _)| !matches!(key.as_str(), "success" | "message"))
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect()
                })
                .unwrap_or_default()
        };
        Self { values }
    }

    /// Plain-text rendering of one value (`42`, `"x"` becomes `x`).
    #[must_use]
    pub fn display_value(value: &Value) -> String {
        match value {
            Value::String(text) => text.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// Iterate `(key, display text)` pairs.
    pub fn display_pairs(&self) -> impl Iterator<Item = (&str, String)> {
        self.values
            .iter()
            .map(|(key, value)| (key.as_str(), Self::display_value(value)))
    }
}

/// Identifier of the display element that shows a statistic.
#[must_use]
pub fn stat_element_id(key: &str) -> String {
    format!("{STAT_ELEMENT_PREFIX}{key}")
}

/// Dashboard chart series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartData {
    /// Day labels (`MM/DD`).
    pub labels: Vec<String>,
    /// Page views per day.
    pub values: Vec<u64>,
}

impl ChartData {
    /// Extract the `chart_data` object from a response body.
    #[must_use]
    pub fn from_body(body: &Value) -> Option<Self> {
        body.get("chart_data")
            .and_then(|data| serde_json::from_value(data.clone()).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mutating_endpoints_use_post() {
        assert_eq!(Endpoint::Stats.method(), HttpMethod::Get);
        assert_eq!(Endpoint::ChartData.method(), HttpMethod::Get);
        assert_eq!(Endpoint::UserBan.method(), HttpMethod::Post);
        assert_eq!(
            Endpoint::PropertyTogglePremium.path(),
            "property/toggle-premium/"
        );
    }

    #[test]
    fn stats_snapshot_reads_wrapped_and_bare_bodies() {
        let wrapped = StatsSnapshot::from_body(&json!({
            "success": true,
            "stats": {"total_users": 42, "total_properties": 7}
        }));
        assert_eq!(wrapped.values.len(), 2);
        assert_eq!(wrapped.values.get("total_users"), Some(&json!(42)));

        let bare = StatsSnapshot::from_body(&json!({"total_users": 42, "success": true}));
        assert_eq!(bare.values.len(), 1);
        let pairs = bare.display_pairs().collect::<Vec<_>>();
        assert_eq!(pairs, vec![("total_users", "42".to_string())]);
    }

    #[test]
    fn display_value_strips_string_quotes() {
        assert_eq!(StatsSnapshot::display_value(&json!("NPR 10")), "NPR 10");
        assert_eq!(StatsSnapshot::display_value(&json!(1.5)), "1.5");
        assert_eq!(StatsSnapshot::display_value(&Value::Null), "");
    }

    #[test]
    fn bulk_ids_encode_as_json_array() {
        assert_eq!(encode_ids(&[3, 9, 12]), "[3,9,12]");
        assert_eq!(encode_ids(&[]), "[]");
        assert_eq!(BulkPropertyAction::MakePremium.as_str(), "make_premium");
    }

    #[test]
    fn envelope_helpers_extract_fields() {
        let body = json!({"success": true, "is_premium": true, "message": "done"});
        assert_eq!(envelope_message(&body).as_deref(), Some("done"));
        assert_eq!(premium_flag(&body), Some(true));
        assert_eq!(premium_flag(&json!({"success": true})), None);
    }

    #[test]
    fn chart_data_parses_series() {
        let body = json!({"success": true, "chart_data": {"labels": ["01/02"], "values": [4]}});
        let chart = ChartData::from_body(&body).expect("chart data");
        assert_eq!(chart.labels, vec!["01/02".to_string()]);
        assert_eq!(chart.values, vec![4]);
        assert!(ChartData::from_body(&json!({"success": true})).is_none());
    }
}
