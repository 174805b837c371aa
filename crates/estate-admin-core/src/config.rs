//! Immutable configuration handed to every pipeline component.
//!
//! # Design
//! - Built once at startup and passed by reference; nothing reads ambient globals.
//! - The auth token degrades to an empty string when the page carries none.

use std::fmt;
use std::time::Duration;

use estate_admin_models::{DEFAULT_API_URL, Endpoint};
use regex::Regex;
use url::Url;

use crate::error::{CoreError, CoreResult};

/// Default period between statistics refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(300);
/// Default lifetime of a notification.
pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_millis(5000);
/// Name of the metadata tag carrying the anti-forgery token.
pub const TOKEN_META_NAME: &str = "csrf-token";

/// Anti-forgery credential attached to every request.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wrap a raw token value.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_string())
    }

    /// Token used when the page provides none.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Read the token from a page's `<meta name="csrf-token" content="...">`
    /// tag. A page without the tag yields the empty token.
    ///
    /// # Errors
    ///
    /// Returns an error only if the tag patterns fail to compile.
    pub fn from_document(html: &str) -> CoreResult<Self> {
        let tag = Regex::new(r"(?is)<meta\b[^>]*>")
            .map_err(|source| CoreError::TokenPattern { source })?;
        let name = Regex::new(&format!(
            r#"(?i)\bname\s*=\s*["']{TOKEN_META_NAME}["']"#
        ))
        .map_err(|source| CoreError::TokenPattern { source })?;
        let content = Regex::new(r#"(?i)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
            .map_err(|source| CoreError::TokenPattern { source })?;

        let token = tag
            .find_iter(html)
            .map(|found| found.as_str())
            .filter(|meta| name.is_match(meta))
            .find_map(|meta| {
                content
                    .captures(meta)
                    .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
                    .map(|value| value.as_str().to_string())
            });

        Ok(token.map_or_else(Self::empty, Self::new))
    }

    /// Raw token text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the page supplied no token.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            formatter.write_str("AuthToken(<empty>)")
        } else {
            formatter.write_str("AuthToken(<redacted>)")
        }
    }
}

/// Console configuration shared by the gateway, notification queue, and scheduler.
#[derive(Debug, Clone)]
pub struct AdminConfig {
    api_base: Url,
    auth_token: AuthToken,
    request_timeout: Option<Duration>,
    poll_interval: Duration,
    notification_duration: Duration,
    fallback_hook: bool,
}

impl AdminConfig {
    /// Build a configuration for the given API base.
    ///
    /// A missing trailing slash is added so endpoint suffixes join under the
    /// base instead of replacing its last segment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidBaseUrl`] when the base cannot be parsed.
    pub fn new(api_base: &str, auth_token: AuthToken) -> CoreResult<Self> {
        let trimmed = api_base.trim();
        let normalised = if trimmed.ends_with('/') {
            trimmed.to_string()
        } else {
            format!("{trimmed}/")
        };
        let api_base = normalised
            .parse::<Url>()
            .map_err(|source| CoreError::InvalidBaseUrl {
                value: api_base.to_string(),
                source,
            })?;
        Ok(Self {
            api_base,
            auth_token,
            request_timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            notification_duration: DEFAULT_NOTIFICATION_DURATION,
            fallback_hook: false,
        })
    }

    /// Configuration pointing at [`DEFAULT_API_URL`].
    ///
    /// # Errors
    ///
    /// Never fails in practice; the signature matches [`AdminConfig::new`].
    pub fn with_default_base(auth_token: AuthToken) -> CoreResult<Self> {
        Self::new(DEFAULT_API_URL, auth_token)
    }

    /// Cut requests off after `timeout`. Without this only the transport's
    /// own limits apply.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Override the statistics refresh period.
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the default notification lifetime.
    #[must_use]
    pub const fn with_notification_duration(mut self, duration: Duration) -> Self {
        self.notification_duration = duration;
        self
    }

    /// Install the process-wide panic fallback during initialization.
    #[must_use]
    pub const fn with_fallback_hook(mut self, enabled: bool) -> Self {
        self.fallback_hook = enabled;
        self
    }

    /// API base every endpoint is joined onto.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Token attached to every request.
    #[must_use]
    pub const fn auth_token(&self) -> &AuthToken {
        &self.auth_token
    }

    /// Explicit request timeout, if one was configured.
    #[must_use]
    pub const fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout
    }

    /// Statistics refresh period.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Default notification lifetime.
    #[must_use]
    pub const fn notification_duration(&self) -> Duration {
        self.notification_duration
    }

    /// Whether initialization installs the panic fallback.
    #[must_use]
    pub const fn fallback_hook(&self) -> bool {
        self.fallback_hook
    }

    /// Absolute URL of an endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::EndpointJoin`] if the path cannot be joined.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> CoreResult<Url> {
        self.api_base
            .join(endpoint.path())
            .map_err(|source| CoreError::EndpointJoin {
                path: endpoint.path(),
                source,
            })
    }
}
