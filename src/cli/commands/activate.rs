//! Activate command - drop old buckets and take over

use super::install::print_activation;
use super::Worker;
use crate::config::Config;
use crate::dispatcher::{Event, EventOutcome};
use crate::error::ProxyResult;
use crate::ui::{self, TaskSpinner, UiContext};

/// Execute the activate command
pub async fn execute(config: &Config) -> ProxyResult<()> {
    let mut worker = Worker::start(config, UiContext::detect()).await?;
    let ctx = worker.ctx.clone();
    let tag = worker.proxy().bucket().to_string();

    let mut spinner = TaskSpinner::new(&ctx);
    spinner.start(&format!("Activating {}...", tag));

    let outcome = worker.dispatcher.dispatch(Event::Activate).await;
    worker.persist().await?;

    match outcome {
        EventOutcome::Activated(report) => {
            spinner.stop(&format!("{} is active", tag));
            print_activation(&ctx, &report);
            Ok(())
        }
        EventOutcome::Failed(e) => {
            spinner.stop_error(&format!("{} was not activated", tag));
            Err(e)
        }
        other => {
            spinner.stop(&format!("Activation produced {:?}", other));
            ui::remark(&ctx, "Nothing to activate");
            Ok(())
        }
    }
}
