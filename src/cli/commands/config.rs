//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{validate, Config, ConfigManager};
use crate::error::{ProxyError, ProxyResult};
use crate::ui::{self, UiContext};

/// Keys accepted by `config set`
const VALID_KEYS: &[&str] = &[
    "general.verbose",
    "general.log_format",
    "general.journal",
    "proxy.version_tag",
    "proxy.origin",
    "proxy.api_prefix",
    "proxy.shell_path",
    "proxy.skip_waiting_on_install",
    "manifest.urls",
    "notification.title",
    "notification.default_body",
    "notification.icon",
    "notification.badge",
    "notification.vibrate",
    "notification.tag",
    "notification.require_interaction",
    "notification.open_path",
    "store.backend",
    "store.dir",
    "sync.tags",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> ProxyResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            apply(&mut updated, &key, &value)?;
            validate(&updated).map_err(|reason| ProxyError::ConfigInvalid {
                path: manager.path().to_path_buf(),
                reason,
            })?;
            manager.save(&updated).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> ProxyResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ProxyResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn(
            &ctx,
            &format!(
                "Config already exists at {} - use --force to overwrite",
                path.display()
            ),
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

/// Set a dot-separated `key` on `config`
pub fn apply(config: &mut Config, key: &str, value: &str) -> ProxyResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => config.general.log_format = value.to_string(),
        ["general", "journal"] => config.general.journal = parse_bool(value)?,

        ["proxy", "version_tag"] => config.proxy.version_tag = value.to_string(),
        ["proxy", "origin"] => config.proxy.origin = value.to_string(),
        ["proxy", "api_prefix"] => config.proxy.api_prefix = value.to_string(),
        ["proxy", "shell_path"] => config.proxy.shell_path = value.to_string(),
        ["proxy", "skip_waiting_on_install"] => {
            config.proxy.skip_waiting_on_install = parse_bool(value)?
        }

        ["manifest", "urls"] => config.manifest.urls = parse_list(value),

        ["notification", "title"] => config.notification.title = value.to_string(),
        ["notification", "default_body"] => config.notification.default_body = value.to_string(),
        ["notification", "icon"] => config.notification.icon = value.to_string(),
        ["notification", "badge"] => config.notification.badge = value.to_string(),
        ["notification", "vibrate"] => {
            config.notification.vibrate = parse_list(value)
                .iter()
                .map(|ms| parse_u32(ms))
                .collect::<ProxyResult<_>>()?
        }
        ["notification", "tag"] => config.notification.tag = value.to_string(),
        ["notification", "require_interaction"] => {
            config.notification.require_interaction = parse_bool(value)?
        }
        ["notification", "open_path"] => config.notification.open_path = value.to_string(),

        ["store", "backend"] => config.store.backend = value.to_string(),
        ["store", "dir"] => {
            config.store.dir = if value.is_empty() {
                None
            } else {
                Some(value.into())
            }
        }

        ["sync", "tags"] => config.sync.tags = parse_list(value),

        _ => {
            return Err(ProxyError::User(format!(
                "Unknown config key: {}. Valid keys: {}",
                key,
                VALID_KEYS.join(", ")
            )))
        }
    }

    Ok(())
}

/// Comma-separated list, blanks dropped
fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_bool(value: &str) -> ProxyResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ProxyError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u32(value: &str) -> ProxyResult<u32> {
    value
        .parse()
        .map_err(|_| ProxyError::User(format!("Invalid number: {}", value)))
}
