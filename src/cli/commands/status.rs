//! Status command - worker state and cache summary

use super::buckets::summarize;
use crate::config::{Config, ConfigManager};
use crate::error::ProxyResult;
use crate::proxy::WorkerState;
use crate::registration::Registry;
use crate::store::create_store;
use crate::ui::{self, UiContext};

/// Execute the status command
pub async fn execute(config: &Config) -> ProxyResult<()> {
    let ctx = UiContext::detect();
    let tag = &config.proxy.version_tag;

    ui::intro(&ctx, "Commute cache status");

    ui::section(&ctx, "Worker");
    ui::key_value(&ctx, "Version", tag);
    ui::key_value(&ctx, "Origin", &config.proxy.origin);
    ui::key_value(&ctx, "API prefix", &config.proxy.api_prefix);
    ui::key_value(&ctx, "Manifest", &format!("{} entries", config.manifest.urls.len()));

    let registry = Registry::new();
    match registry.current().await? {
        Some(record) if &record.version_tag == tag => {
            ui::key_value_status(
                &ctx,
                "State",
                &record.state.to_string(),
                record.state == WorkerState::Active,
            );
            if let Some(at) = record.installed_at {
                ui::key_value(&ctx, "Installed", &at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
            }
            if let Some(at) = record.activated_at {
                ui::key_value(&ctx, "Activated", &at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
            }
        }
        Some(record) => {
            ui::key_value_status(&ctx, "State", "not installed", false);
            ui::remark(
                &ctx,
                &format!(
                    "Registered worker is {} ({}); run: commute-cache install",
                    record.version_tag, record.state
                ),
            );
        }
        None => {
            ui::key_value_status(&ctx, "State", "not installed", false);
            ui::remark(&ctx, "Run: commute-cache install");
        }
    }

    let store = create_store(&config.store)?;
    ui::section(&ctx, "Cache");
    ui::key_value(&ctx, "Backend", store.backend_name());
    if let Some(dir) = &config.store.dir {
        ui::key_value(&ctx, "Directory", &dir.display().to_string());
    } else if config.store.backend == "disk" {
        ui::key_value(&ctx, "Directory", &ConfigManager::buckets_dir().display().to_string());
    }

    let summaries = summarize(store.as_ref(), tag).await?;
    if summaries.is_empty() {
        ui::step_info(&ctx, "No cache buckets");
    }
    for summary in &summaries {
        let label = format!("{} ({} entries)", summary.name, summary.entries);
        if summary.current {
            ui::step_ok(&ctx, &label);
        } else {
            ui::step_warn(&ctx, &format!("{} - deleted on next activation", label));
        }
    }

    Ok(())
}
