//! Console wiring, error types, and exit-code classification for the CLI.

use std::fmt::{self, Display, Formatter};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use estate_admin_core::{
    AbortReason, ActionOutcome, ActionResult, AdminConfig, AdminRuntime, AuthToken, Orchestrator,
    PresentationPorts,
};
use estate_admin_telemetry::Metrics;
use tracing::debug;
use url::Url;

use crate::output::OutputFormat;
use crate::terminal::{StdinInteraction, TerminalStats, TerminalSurface, TerminalView};

/// CLI-level error type to distinguish validation from operational failures.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.display_message())
    }
}

impl std::error::Error for CliError {}

/// Resolved global options for one invocation.
pub(crate) struct ConsoleSettings {
    pub(crate) api_url: Url,
    pub(crate) token: AuthToken,
    pub(crate) timeout: Option<Duration>,
    pub(crate) poll_interval: Duration,
    pub(crate) assume_yes: bool,
    pub(crate) output: OutputFormat,
    pub(crate) fallback_hook: bool,
}

/// Wired console plus the terminal-side handles commands read from.
pub(crate) struct CliContext {
    pub(crate) runtime: Arc<AdminRuntime>,
    pub(crate) stats: Arc<TerminalStats>,
    pub(crate) output: OutputFormat,
}

/// Pick the token from the flag, else from a saved page, else empty.
pub(crate) fn resolve_token(flag: Option<&str>, page: Option<&Path>) -> CliResult<AuthToken> {
    if let Some(value) = flag.filter(|value| !value.trim().is_empty()) {
        return Ok(AuthToken::new(value));
    }
    let Some(path) = page else {
        debug!("no anti-forgery token supplied; sending an empty token");
        return Ok(AuthToken::empty());
    };
    let html = fs::read_to_string(path)
        .with_context(|| format!("failed to read token page {}", path.display()))
        .map_err(CliError::failure)?;
    AuthToken::from_document(&html).map_err(CliError::failure)
}

/// Build the console runtime with terminal presentation ports.
pub(crate) fn connect(settings: ConsoleSettings) -> CliResult<CliContext> {
    let mut config = AdminConfig::new(settings.api_url.as_str(), settings.token)
        .map_err(|err| CliError::validation(format!("{err}: {}", settings.api_url)))?
        .with_poll_interval(settings.poll_interval)
        .with_fallback_hook(settings.fallback_hook);
    if let Some(timeout) = settings.timeout {
        config = config.with_request_timeout(timeout);
    }

    let metrics = Metrics::new()
        .context("failed to register metrics")
        .map_err(CliError::failure)?;
    let stats = Arc::new(TerminalStats::new(settings.output));
    let ports = PresentationPorts {
        surface: Arc::new(TerminalSurface::new(settings.output)),
        view: Arc::new(TerminalView),
        interaction: Arc::new(StdinInteraction::new(settings.assume_yes)),
        stats: stats.clone(),
    };

    let runtime = Orchestrator::new()
        .initialize(config, ports, Some(metrics))
        .context("failed to initialize console")
        .map_err(CliError::failure)?;

    Ok(CliContext {
        runtime,
        stats,
        output: settings.output,
    })
}

/// Map an action outcome onto the exit-code classes.
pub(crate) fn outcome_to_result(outcome: ActionOutcome) -> CliResult<()> {
    match outcome {
        ActionOutcome::Completed(ActionResult::Success { .. }) => Ok(()),
        ActionOutcome::Completed(ActionResult::Failure { message, .. }) => {
            Err(CliError::failure(anyhow!(message)))
        }
        ActionOutcome::Aborted(reason) => Err(CliError::validation(abort_message(reason))),
    }
}

const fn abort_message(reason: AbortReason) -> &'static str {
    match reason {
        AbortReason::MissingReason => "aborted: a rejection reason is required",
        AbortReason::Declined => "aborted: confirmation declined",
        AbortReason::EmptySelection => "aborted: no rows selected",
    }
}

#[cfg(test)]
pub(crate) fn test_context(base: &str) -> CliContext {
    connect(ConsoleSettings {
        api_url: Url::parse(base).expect("valid base"),
        token: AuthToken::new("cli-token"),
        timeout: None,
        poll_interval: Duration::from_secs(3600),
        assume_yes: true,
        output: OutputFormat::Json,
        fallback_hook: false,
    })
    .expect("console context")
}
