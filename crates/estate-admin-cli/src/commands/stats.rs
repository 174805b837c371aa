use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use estate_admin_core::{ActionRequest, PollingScheduler, StatSink};
use estate_admin_models::{ChartData, Endpoint};
use tracing::info;

use crate::cli::WatchArgs;
use crate::client::{CliContext, CliError, CliResult};
use crate::output::{render_chart, render_stats};

fn scheduler(ctx: &CliContext) -> PollingScheduler {
    let sink: Arc<dyn StatSink> = ctx.stats.clone();
    let mut scheduler = PollingScheduler::new(
        ctx.runtime.gateway().clone(),
        sink,
        ctx.runtime.config().poll_interval(),
    );
    if let Some(metrics) = ctx.runtime.metrics() {
        scheduler = scheduler.with_metrics(metrics.clone());
    }
    scheduler
}

pub(crate) async fn handle_stats(ctx: &CliContext) -> CliResult<()> {
    let result = scheduler(ctx).refresh().await;
    if !result.is_success() {
        return Err(CliError::failure(anyhow!(result.message().to_string())));
    }
    let snapshot = ctx.stats.latest().unwrap_or_default();
    println!("{}", render_stats(&snapshot, ctx.output)?);
    Ok(())
}

pub(crate) async fn handle_chart(ctx: &CliContext) -> CliResult<()> {
    let result = ctx
        .runtime
        .gateway()
        .send(ActionRequest::new(Endpoint::ChartData))
        .await;
    let Some(body) = result.body() else {
        return Err(CliError::failure(anyhow!(result.message().to_string())));
    };
    let chart = ChartData::from_body(body)
        .ok_or_else(|| CliError::failure(anyhow!("response carried no chart data")))?;
    println!("{}", render_chart(&chart, ctx.output)?);
    Ok(())
}

pub(crate) async fn handle_watch(ctx: &CliContext, args: WatchArgs) -> CliResult<()> {
    ctx.stats.set_live(true);
    info!(interval_secs = args.interval_secs, "watching statistics");
    let _ = scheduler(ctx).refresh().await;

    match args.duration_secs {
        Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
        None => tokio::signal::ctrl_c()
            .await
            .map_err(|err| CliError::failure(anyhow!("failed to wait for Ctrl-C: {err}")))?,
    }
    ctx.runtime.polling().stop();

    if args.print_metrics
        && let Some(metrics) = ctx.runtime.metrics()
    {
        println!("{}", metrics.render().map_err(CliError::failure)?);
    }
    Ok(())
}
