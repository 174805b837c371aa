//! Request gateway: authenticated HTTP dispatch with uniform outcome handling.
//!
//! # Design
//! - Every response is interpreted as exactly one [`ActionResult`] before
//!   anything visible changes.
//! - Every completed request emits exactly one notification, whether or not
//!   the caller looks at the result.
//! - No retries, no deduplication; concurrent sends are independent.

use std::sync::Arc;

use estate_admin_models::{
    Endpoint, HEADER_CSRF_TOKEN, HEADER_REQUEST_ID, HttpMethod, envelope_message,
};
use estate_admin_telemetry::{Metrics, OUTCOME_FAILURE, OUTCOME_SUCCESS};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::config::AdminConfig;
use crate::error::{CoreError, CoreResult};
use crate::notify::{NotificationQueue, Severity};

/// Message shown when a failure carries no message of its own.
pub const FALLBACK_FAILURE_MESSAGE: &str = "An error occurred. Please try again.";
/// Message shown when a success carries no message of its own.
pub const FALLBACK_SUCCESS_MESSAGE: &str = "Operation completed successfully.";

/// How a 2xx body decides between success and failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Expectation {
    /// Body must carry a truthy `success` field.
    Acknowledgement,
    /// Any JSON body is a success unless it carries a falsy `success` field.
    Document,
}

/// One outbound operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionRequest {
    endpoint: Endpoint,
    payload: Vec<(String, String)>,
    expectation: Expectation,
}

impl ActionRequest {
    /// Request for `endpoint` with an empty payload. Read-only endpoints
    /// default to [`Expectation::Document`], mutating ones to
    /// [`Expectation::Acknowledgement`].
    #[must_use]
    pub const fn new(endpoint: Endpoint) -> Self {
        let expectation = match endpoint.method() {
            HttpMethod::Get => Expectation::Document,
            HttpMethod::Post => Expectation::Acknowledgement,
        };
        Self {
            endpoint,
            payload: Vec::new(),
            expectation,
        }
    }

    /// Append a payload field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.payload.push((name.into(), value.to_string()));
        self
    }

    /// Override the response expectation.
    #[must_use]
    pub const fn expecting(mut self, expectation: Expectation) -> Self {
        self.expectation = expectation;
        self
    }

    /// Target endpoint.
    #[must_use]
    pub const fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    /// Verb used on the wire.
    #[must_use]
    pub const fn method(&self) -> HttpMethod {
        self.endpoint.method()
    }

    /// Payload fields in insertion order.
    #[must_use]
    pub fn payload(&self) -> &[(String, String)] {
        &self.payload
    }

    /// Response expectation.
    #[must_use]
    pub const fn expectation(&self) -> Expectation {
        self.expectation
    }
}

/// Where a failure came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Network error, non-2xx status, or unreadable body.
    Transport,
    /// 2xx response whose body marks the operation unsuccessful.
    Application,
}

/// Resolved outcome of one [`ActionRequest`].
#[derive(Clone, Debug, PartialEq)]
pub enum ActionResult {
    /// The operation succeeded.
    Success {
        /// Message shown to the user.
        message: String,
        /// Parsed response body.
        body: Value,
    },
    /// The operation failed.
    Failure {
        /// Message shown to the user.
        message: String,
        /// Failure origin.
        kind: FailureKind,
    },
}

impl ActionResult {
    /// Whether the operation succeeded.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// User-facing message for either variant.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    /// Parsed body of a success.
    #[must_use]
    pub const fn body(&self) -> Option<&Value> {
        match self {
            Self::Success { body, .. } => Some(body),
            Self::Failure { .. } => None,
        }
    }

    /// Notification severity matching the outcome.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::Success { .. } => Severity::Success,
            Self::Failure { .. } => Severity::Error,
        }
    }

    fn transport_failure(message: Option<String>) -> Self {
        Self::Failure {
            message: message.unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string()),
            kind: FailureKind::Transport,
        }
    }
}

/// JSON truthiness: `false`, `null`, `0`, `""` are falsy; everything else,
/// including empty arrays and objects, is truthy.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Interpret a transport response.
///
/// `status_ok` is whether the HTTP status was 2xx; `bytes` is the raw body.
#[must_use]
pub fn interpret_response(status_ok: bool, bytes: &[u8], expectation: Expectation) -> ActionResult {
    let parsed = serde_json::from_slice::<Value>(bytes).ok();
    if !status_ok {
        return ActionResult::transport_failure(parsed.as_ref().and_then(envelope_message));
    }
    let Some(body) = parsed else {
        return ActionResult::transport_failure(None);
    };

    let succeeded = match expectation {
        Expectation::Acknowledgement => body.get("success").is_some_and(is_truthy),
        Expectation::Document => body.get("success").is_none_or(is_truthy),
    };
    let message = envelope_message(&body);
    if succeeded {
        ActionResult::Success {
            message: message.unwrap_or_else(|| FALLBACK_SUCCESS_MESSAGE.to_string()),
            body,
        }
    } else {
        ActionResult::Failure {
            message: message.unwrap_or_else(|| FALLBACK_FAILURE_MESSAGE.to_string()),
            kind: FailureKind::Application,
        }
    }
}

/// Authenticated dispatcher shared by action handlers and the scheduler.
#[derive(Clone)]
pub struct RequestGateway {
    client: Client,
    config: Arc<AdminConfig>,
    notifications: NotificationQueue,
    metrics: Option<Metrics>,
}

impl RequestGateway {
    /// Build a gateway whose client carries the auth token on every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not a valid header value or the HTTP
    /// client cannot be built.
    pub fn new(config: Arc<AdminConfig>, notifications: NotificationQueue) -> CoreResult<Self> {
        let mut default_headers = HeaderMap::new();
        let name = HeaderName::from_bytes(HEADER_CSRF_TOKEN.as_bytes())
            .map_err(|_| CoreError::InvalidTokenHeader)?;
        let token = HeaderValue::from_str(config.auth_token().as_str())
            .map_err(|_| CoreError::InvalidTokenHeader)?;
        default_headers.insert(name, token);

        let mut builder = Client::builder().default_headers(default_headers);
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|source| CoreError::ClientBuild { source })?;

        Ok(Self {
            client,
            config,
            notifications,
            metrics: None,
        })
    }

    /// Count resolved requests in `metrics`.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Configuration the gateway was built from.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.config
    }

    /// Queue receiving one notification per completed request.
    #[must_use]
    pub const fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    /// Send a request, emit its notification, and return the outcome.
    #[instrument(
        name = "gateway.send",
        skip_all,
        fields(endpoint = request.endpoint().label(), method = request.method().as_str())
    )]
    pub async fn send(&self, request: ActionRequest) -> ActionResult {
        let result = self.dispatch(&request).await;

        self.notifications
            .notify(result.message(), result.severity());

        match &result {
            ActionResult::Success { message, .. } => {
                info!(%message, "request succeeded");
            }
            ActionResult::Failure { message, kind } => {
                warn!(%message, kind = ?kind, "request failed");
            }
        }
        if let Some(metrics) = &self.metrics {
            let outcome = if result.is_success() {
                OUTCOME_SUCCESS
            } else {
                OUTCOME_FAILURE
            };
            metrics.inc_request(outcome);
        }
        result
    }

    async fn dispatch(&self, request: &ActionRequest) -> ActionResult {
        let url = match self.config.endpoint_url(request.endpoint()) {
            Ok(url) => url,
            Err(err) => {
                warn!(error = %err, "endpoint could not be resolved");
                return ActionResult::transport_failure(None);
            }
        };

        let builder = match request.method() {
            HttpMethod::Get => self.client.get(url).query(request.payload()),
            HttpMethod::Post => self.client.post(url).form(request.payload()),
        };
        let builder = builder.header(HEADER_REQUEST_ID, Uuid::new_v4().to_string());

        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "request could not be delivered");
                return ActionResult::transport_failure(None);
            }
        };

        let status_ok = response.status().is_success();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(error = %err, "response body could not be read");
                return ActionResult::transport_failure(None);
            }
        };
        interpret_response(status_ok, &bytes, request.expectation())
    }
}
