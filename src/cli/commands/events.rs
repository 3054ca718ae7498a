//! Push, click and sync commands - simulate host events

use super::Worker;
use crate::cli::args::{ClickArgs, PushArgs, SyncArgs};
use crate::config::Config;
use crate::dispatcher::{Event, EventOutcome};
use crate::error::ProxyResult;
use crate::notify::ClientAction;
use crate::ui::{self, UiContext};

/// Execute the push command
pub async fn push(args: PushArgs, config: &Config) -> ProxyResult<()> {
    let worker = Worker::start(config, UiContext::detect()).await?;
    let outcome = worker
        .dispatcher
        .dispatch(Event::Push(args.payload))
        .await
        .into_result()?;

    if let EventOutcome::Notified(notification) = outcome {
        ui::remark(
            &worker.ctx,
            &format!("Run: commute-cache click {}", notification.tag),
        );
    }
    Ok(())
}

/// Execute the click command
pub async fn click(args: ClickArgs, config: &Config) -> ProxyResult<()> {
    let worker = Worker::start(config, UiContext::detect()).await?;
    let tag = args.tag.unwrap_or_else(|| config.notification.tag.clone());

    let outcome = worker
        .dispatcher
        .dispatch(Event::NotificationClick(tag))
        .await
        .into_result()?;

    match outcome {
        EventOutcome::ClientShown(ClientAction::Focused) => {
            ui::step_ok(&worker.ctx, "Focused the open page")
        }
        EventOutcome::ClientShown(ClientAction::Opened) => {
            ui::step_ok(&worker.ctx, "Opened a new page")
        }
        other => ui::step_info(&worker.ctx, &format!("{:?}", other)),
    }
    Ok(())
}

/// Execute the sync command
pub async fn sync(args: SyncArgs, config: &Config) -> ProxyResult<()> {
    let worker = Worker::start(config, UiContext::detect()).await?;
    let outcome = worker
        .dispatcher
        .dispatch(Event::Sync(args.tag.clone()))
        .await
        .into_result()?;

    match outcome {
        EventOutcome::Synced(tag) => ui::step_ok(&worker.ctx, &format!("Synced {}", tag)),
        _ => ui::step_warn(
            &worker.ctx,
            &format!("No sync registered for tag '{}'", args.tag),
        ),
    }
    Ok(())
}
