//! Error types for pipeline construction.
//!
//! Remote action failures are values ([`crate::gateway::ActionResult`]), not
//! errors; this enum only covers wiring problems that prevent the pipeline
//! from being built.

use thiserror::Error;

/// Primary error type for the admin pipeline.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The configured API base could not be parsed.
    #[error("invalid API base URL")]
    InvalidBaseUrl {
        /// Raw value supplied by the caller.
        value: String,
        /// Parser error detail.
        source: url::ParseError,
    },
    /// An endpoint path could not be joined onto the API base.
    #[error("failed to resolve endpoint URL")]
    EndpointJoin {
        /// Endpoint path suffix.
        path: &'static str,
        /// Parser error detail.
        source: url::ParseError,
    },
    /// The auth token cannot be sent as an HTTP header value.
    #[error("auth token contains characters not allowed in a header")]
    InvalidTokenHeader,
    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    ClientBuild {
        /// Source client error.
        source: reqwest::Error,
    },
    /// A metadata pattern failed to compile.
    #[error("failed to compile metadata pattern")]
    TokenPattern {
        /// Source regex error.
        source: regex::Error,
    },
    /// Timers need an async runtime and none was running.
    #[error("no async runtime available for timers")]
    NoRuntime,
}

/// Convenience alias for pipeline results.
pub type CoreResult<T> = Result<T, CoreError>;
