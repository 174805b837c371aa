//! Argument parsing and command dispatch.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use estate_admin_models::{BulkPropertyAction, DEFAULT_API_URL};
use estate_admin_telemetry::{LoggingConfig, build_sha, init_logging, log_format_from_str};
use url::Url;

use crate::client::{CliError, CliResult, ConsoleSettings, connect, resolve_token};
use crate::commands::{actions, export, stats};
use crate::output::OutputFormat;

const DEFAULT_POLL_SECS: u64 = 300;
const DEFAULT_LOG_LEVEL: &str = "warn";

/// Parses CLI arguments, executes the requested command, and returns the
/// process exit code.
pub async fn run() -> i32 {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: DEFAULT_LOG_LEVEL,
        format: log_format_from_str(cli.log_format.as_deref()),
        build_sha: build_sha(),
    };
    if let Err(err) = init_logging(&logging) {
        eprintln!("warning: {err:#}");
    }

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    if let Command::Export(args) = &cli.command {
        return export::handle_export(args);
    }

    let token = resolve_token(cli.csrf_token.as_deref(), cli.token_page.as_deref())?;
    let poll_secs = match &cli.command {
        Command::Watch(args) => args.interval_secs,
        _ => DEFAULT_POLL_SECS,
    };
    if poll_secs == 0 {
        return Err(CliError::validation("polling interval must be positive"));
    }
    let settings = ConsoleSettings {
        api_url: cli.api_url,
        token,
        timeout: cli.timeout.map(Duration::from_secs),
        poll_interval: Duration::from_secs(poll_secs),
        assume_yes: cli.yes,
        output: cli.output,
        fallback_hook: true,
    };
    let ctx = connect(settings)?;

    let result = match cli.command {
        Command::Property(command) => actions::handle_property(&ctx, command).await,
        Command::User(command) => actions::handle_user(&ctx, command).await,
        Command::Users(command) => actions::handle_users(&ctx, command).await,
        Command::Properties(command) => actions::handle_properties(&ctx, command).await,
        Command::Stats => stats::handle_stats(&ctx).await,
        Command::Chart => stats::handle_chart(&ctx).await,
        Command::Watch(args) => stats::handle_watch(&ctx, args).await,
        Command::Export(_) => Ok(()),
    };
    ctx.runtime.polling().stop();
    result
}

fn parse_url(value: &str) -> Result<Url, String> {
    Url::parse(value).map_err(|err| format!("invalid URL '{value}': {err}"))
}

#[derive(Parser)]
#[command(
    name = "estate-admin",
    about = "Terminal console for the estate admin API"
)]
pub(crate) struct Cli {
    #[arg(
        long,
        global = true,
        env = "ESTATE_ADMIN_API_URL",
        value_parser = parse_url,
        default_value = DEFAULT_API_URL
    )]
    pub(crate) api_url: Url,
    #[arg(long, global = true, env = "ESTATE_ADMIN_CSRF_TOKEN")]
    pub(crate) csrf_token: Option<String>,
    #[arg(
        long,
        global = true,
        help = "Read the anti-forgery token from a saved admin page"
    )]
    pub(crate) token_page: Option<PathBuf>,
    #[arg(
        long,
        global = true,
        env = "ESTATE_ADMIN_HTTP_TIMEOUT_SECS",
        help = "Abort requests after this many seconds; unset leaves the transport default"
    )]
    pub(crate) timeout: Option<u64>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Table,
        help = "Select output format for commands that render structured data"
    )]
    pub(crate) output: OutputFormat,
    #[arg(long, global = true, env = "ESTATE_ADMIN_LOG_FORMAT")]
    pub(crate) log_format: Option<String>,
    #[arg(
        long,
        short = 'y',
        global = true,
        help = "Answer yes to every confirmation"
    )]
    pub(crate) yes: bool,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    #[command(subcommand)]
    Property(PropertyCommand),
    #[command(subcommand)]
    User(UserCommand),
    #[command(subcommand)]
    Users(UsersCommand),
    #[command(subcommand)]
    Properties(PropertiesCommand),
    Stats,
    Chart,
    Watch(WatchArgs),
    Export(ExportArgs),
}

#[derive(Subcommand)]
pub(crate) enum PropertyCommand {
    Approve(IdArgs),
    Reject(RejectArgs),
    Premium(IdArgs),
    Delete(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    Ban(IdArgs),
    Unban(IdArgs),
    Verify(IdArgs),
}

#[derive(Subcommand)]
pub(crate) enum UsersCommand {
    BulkBan(IdsArgs),
    BulkVerify(IdsArgs),
}

#[derive(Subcommand)]
pub(crate) enum PropertiesCommand {
    Bulk(BulkArgs),
}

#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct IdArgs {
    pub(crate) id: u64,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct RejectArgs {
    pub(crate) id: u64,
    #[arg(long, help = "Rejection reason; prompted for when omitted")]
    pub(crate) reason: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub(crate) struct IdsArgs {
    #[arg(long, value_delimiter = ',', help = "Comma-separated row identifiers")]
    pub(crate) ids: Vec<u64>,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct BulkArgs {
    #[arg(long, value_enum)]
    pub(crate) action: BulkActionArg,
    #[command(flatten)]
    pub(crate) selection: IdsArgs,
}

#[derive(Copy, Clone, Debug, ValueEnum, PartialEq, Eq)]
pub(crate) enum BulkActionArg {
    Approve,
    Reject,
    Verify,
    MakePremium,
}

impl From<BulkActionArg> for BulkPropertyAction {
    fn from(value: BulkActionArg) -> Self {
        match value {
            BulkActionArg::Approve => Self::Approve,
            BulkActionArg::Reject => Self::Reject,
            BulkActionArg::Verify => Self::Verify,
            BulkActionArg::MakePremium => Self::MakePremium,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub(crate) struct WatchArgs {
    #[arg(
        long,
        env = "ESTATE_ADMIN_POLL_SECS",
        default_value_t = DEFAULT_POLL_SECS,
        help = "Seconds between statistics refreshes"
    )]
    pub(crate) interval_secs: u64,
    #[arg(long, help = "Stop after this many seconds instead of waiting for Ctrl-C")]
    pub(crate) duration_secs: Option<u64>,
    #[arg(long, help = "Print Prometheus counters on exit")]
    pub(crate) print_metrics: bool,
}

#[derive(Args, Debug, Clone)]
pub(crate) struct ExportArgs {
    #[arg(help = "JSON table: an array of objects or {headers, rows}")]
    pub(crate) input: PathBuf,
    #[arg(long, help = "Write CSV here instead of stdout")]
    pub(crate) out: Option<PathBuf>,
}
