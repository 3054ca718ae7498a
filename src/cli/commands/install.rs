//! Install command - populate the bucket from the manifest

use super::Worker;
use crate::config::Config;
use crate::dispatcher::{Event, EventOutcome, InstallProgress};
use crate::error::ProxyResult;
use crate::http::Url;
use crate::proxy::{ActivationReport, WorkerState};
use crate::ui::{self, ManifestProgress, UiContext};
use std::sync::Arc;

/// Execute the install command
pub async fn execute(config: &Config) -> ProxyResult<()> {
    let mut worker = Worker::start(config, UiContext::detect()).await?;
    let ctx = worker.ctx.clone();
    let tag = worker.proxy().bucket().to_string();

    ui::intro(&ctx, &format!("Install {}", tag));

    let progress = ManifestProgress::new(&ctx, worker.proxy().manifest().len());
    let bar = progress.clone();
    let on_fetched: InstallProgress = Arc::new(move |url: &Url| bar.advance(url));

    let outcome = worker
        .dispatcher
        .dispatch(Event::Install(Some(on_fetched)))
        .await;
    progress.finish();

    match outcome {
        EventOutcome::Installed(report) => {
            worker.persist_install().await?;
            ui::step_ok_detail(
                &ctx,
                &format!("Cached {} entries", report.cached),
                &format!("bucket {}", tag),
            );
            if let Some(activation) = &report.activated {
                print_activation(&ctx, activation);
            }
            if worker.proxy().state().await == WorkerState::Active {
                ui::outro_success(&ctx, &format!("{} is active", tag));
            } else {
                ui::remark(&ctx, "Run: commute-cache activate");
                ui::outro_warn(&ctx, &format!("{} is waiting", tag));
            }
            Ok(())
        }
        EventOutcome::Failed(e) => {
            worker.persist().await?;
            ui::outro_error(&ctx, &format!("{} was not installed", tag));
            Err(e)
        }
        other => {
            worker.persist().await?;
            ui::outro_warn(&ctx, &format!("Install produced {:?}", other));
            Ok(())
        }
    }
}

/// Shared with the activate command
pub(super) fn print_activation(ctx: &UiContext, report: &ActivationReport) {
    if report.deleted.is_empty() {
        ui::step_info(ctx, "No old buckets to delete");
    } else {
        for name in &report.deleted {
            ui::step_ok(ctx, &format!("Deleted old bucket {}", name));
        }
    }
    if report.claimed > 0 {
        ui::step_info(ctx, &format!("Claimed {} page(s)", report.claimed));
    }
}
