use tracing::info;

use crate::cli::{IdsArgs, PropertiesCommand, PropertyCommand, UserCommand, UsersCommand};
use crate::client::{CliContext, CliResult, outcome_to_result};

pub(crate) async fn handle_property(ctx: &CliContext, command: PropertyCommand) -> CliResult<()> {
    let actions = ctx.runtime.actions();
    let outcome = match command {
        PropertyCommand::Approve(args) => actions.approve_property(args.id).await,
        PropertyCommand::Reject(args) => {
            actions
                .reject_property(args.id, args.reason.as_deref())
                .await
        }
        PropertyCommand::Premium(args) => actions.toggle_premium(args.id).await,
        PropertyCommand::Delete(args) => actions.delete_property(args.id).await,
    };
    outcome_to_result(outcome)
}

pub(crate) async fn handle_user(ctx: &CliContext, command: UserCommand) -> CliResult<()> {
    let actions = ctx.runtime.actions();
    let outcome = match command {
        UserCommand::Ban(args) => actions.ban_user(args.id).await,
        UserCommand::Unban(args) => actions.unban_user(args.id).await,
        UserCommand::Verify(args) => actions.verify_user(args.id).await,
    };
    outcome_to_result(outcome)
}

pub(crate) async fn handle_users(ctx: &CliContext, command: UsersCommand) -> CliResult<()> {
    let actions = ctx.runtime.actions();
    let outcome = match command {
        UsersCommand::BulkBan(args) => {
            select_rows(ctx, &args);
            actions.bulk_ban_users().await
        }
        UsersCommand::BulkVerify(args) => {
            select_rows(ctx, &args);
            actions.bulk_verify_users().await
        }
    };
    outcome_to_result(outcome)
}

pub(crate) async fn handle_properties(
    ctx: &CliContext,
    command: PropertiesCommand,
) -> CliResult<()> {
    let PropertiesCommand::Bulk(args) = command;
    select_rows(ctx, &args.selection);
    let outcome = ctx
        .runtime
        .actions()
        .bulk_property_action(args.action.into())
        .await;
    outcome_to_result(outcome)
}

/// The identifiers given on the command line are the rendered rows, all checked.
fn select_rows(ctx: &CliContext, args: &IdsArgs) {
    let mut tracker = ctx.runtime.selection().lock();
    tracker.reload(args.ids.iter().copied());
    let summary = tracker.toggle_all(true);
    info!(checked = summary.checked, "rows selected for bulk action");
}
