//! Confirmation prompts

use super::context::UiContext;
use crate::error::{ProxyError, ProxyResult};

/// Ask a yes/no question.
///
/// `--yes` approves; without a terminal the default is taken.
pub async fn confirm(ctx: &UiContext, message: &str, default: bool) -> ProxyResult<bool> {
    if ctx.auto_yes() {
        println!("  {} (auto-approved)", message);
        return Ok(true);
    }

    if !ctx.is_interactive() {
        return Ok(default);
    }

    // cliclack blocks on stdin
    let message = message.to_string();
    let answer = tokio::task::spawn_blocking(move || {
        cliclack::confirm(&message)
            .initial_value(default)
            .interact()
    })
    .await
    .map_err(|e| ProxyError::Internal(format!("Prompt task failed: {}", e)))?;

    answer.map_err(|e| ProxyError::User(format!("Prompt failed: {}", e)))
}
