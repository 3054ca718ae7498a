//! Message command - deliver control messages

use super::Worker;
use crate::cli::args::{ClearCacheArgs, MessageArgs};
use crate::config::Config;
use crate::dispatcher::{Event, EventOutcome};
use crate::error::ProxyResult;
use crate::messages::{MessageEvent, ReplyPort};
use crate::ui::{self, UiContext};
use serde_json::{json, Value};

/// Execute the message command
pub async fn execute(args: MessageArgs, config: &Config) -> ProxyResult<()> {
    let payload: Value = serde_json::from_str(&args.json)?;
    let mut worker = Worker::start(config, UiContext::detect()).await?;
    deliver(&mut worker, payload).await
}

/// Execute the clear-cache command
pub async fn clear_cache(args: ClearCacheArgs, config: &Config) -> ProxyResult<()> {
    let ctx = UiContext::detect().with_auto_yes(args.yes);
    if !ui::confirm(&ctx, "Delete every cache bucket?", false).await? {
        ui::step_warn(&ctx, "Cancelled; pass --yes to clear without asking");
        return Ok(());
    }

    let mut worker = Worker::start(config, ctx).await?;
    deliver(&mut worker, json!({ "type": "CLEAR_CACHE" })).await
}

async fn deliver(worker: &mut Worker, payload: Value) -> ProxyResult<()> {
    let ctx = worker.ctx.clone();
    let (port, reply) = ReplyPort::channel();
    let event = MessageEvent::new(payload).with_reply(port);

    let outcome = worker.dispatcher.dispatch(Event::Message(event)).await;
    worker.persist().await?;

    match outcome.into_result()? {
        EventOutcome::SkippedWaiting(Some(report)) => {
            ui::step_ok(&ctx, "Activated without waiting");
            super::install::print_activation(&ctx, &report);
        }
        EventOutcome::SkippedWaiting(None) => {
            let state = worker.proxy().state().await;
            ui::step_info(&ctx, &format!("Skip-waiting recorded (worker is {})", state));
        }
        EventOutcome::CacheCleared { buckets, .. } => {
            ui::step_ok(&ctx, &format!("Cleared {} bucket(s)", buckets));
        }
        EventOutcome::Ignored => {
            ui::step_warn(&ctx, "Unrecognized message ignored");
        }
        other => ui::step_info(&ctx, &format!("{:?}", other)),
    }

    if let Ok(reply) = reply.await {
        ui::key_value(&ctx, "Reply", &serde_json::to_string(&reply)?);
    }
    Ok(())
}
