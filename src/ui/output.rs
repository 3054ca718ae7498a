//! Line output with fancy and plain variants
//!
//! Every step line goes through [`step`], which picks the cliclack log
//! function in interactive sessions and a bracketed tag otherwise.

use super::context::UiContext;
use console::{style, Style};

/// Severity of a step line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Level {
    Ok,
    Info,
    Warn,
}

impl Level {
    fn tag(self) -> String {
        match self {
            Level::Ok => style("[OK]").green().to_string(),
            Level::Info => style("[INFO]").cyan().to_string(),
            Level::Warn => style("[WARN]").yellow().to_string(),
        }
    }

    fn color(self) -> Style {
        match self {
            Level::Ok => Style::new().green(),
            Level::Info => Style::new().cyan(),
            Level::Warn => Style::new().yellow(),
        }
    }
}

fn step(ctx: &UiContext, level: Level, message: &str) {
    if ctx.use_fancy_output() {
        let _ = match level {
            Level::Ok => cliclack::log::success(message),
            Level::Info => cliclack::log::info(message),
            Level::Warn => cliclack::log::warning(message),
        };
    } else {
        println!("  {} {}", level.tag(), message);
    }
}

fn outro(ctx: &UiContext, color: Style, plain_tag: &str, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::outro(color.bold().apply_to(message)).ok();
    } else {
        println!("{} {}", color.apply_to(plain_tag), message);
    }
}

pub fn intro(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).green().bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn outro_success(ctx: &UiContext, message: &str) {
    outro(ctx, Level::Ok.color(), "[OK]", message);
}

pub fn outro_error(ctx: &UiContext, message: &str) {
    outro(ctx, Style::new().red(), "[ERROR]", message);
}

pub fn outro_warn(ctx: &UiContext, message: &str) {
    outro(ctx, Level::Warn.color(), "[WARN]", message);
}

/// Boxed note; plain mode prints the title then each line indented
pub fn note(ctx: &UiContext, title: &str, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::note(title, message).ok();
    } else {
        println!("{}", style(title).bold());
        for line in message.lines() {
            println!("  {}", line);
        }
    }
}

pub fn section(ctx: &UiContext, title: &str) {
    println!();
    if ctx.use_fancy_output() {
        cliclack::log::info(style(title).bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

pub fn step_ok(ctx: &UiContext, message: &str) {
    step(ctx, Level::Ok, message);
}

pub fn step_ok_detail(ctx: &UiContext, message: &str, detail: &str) {
    let detail = if ctx.use_fancy_output() {
        style(detail).dim().to_string()
    } else {
        detail.to_string()
    };
    step(ctx, Level::Ok, &format!("{} ({})", message, detail));
}

pub fn step_info(ctx: &UiContext, message: &str) {
    step(ctx, Level::Info, message);
}

pub fn step_warn(ctx: &UiContext, message: &str) {
    step(ctx, Level::Warn, message);
}

/// Dimmed follow-up hint
pub fn remark(ctx: &UiContext, message: &str) {
    if ctx.use_fancy_output() {
        cliclack::log::remark(message).ok();
    } else {
        println!("  {}", style(message).dim());
    }
}

pub fn key_value(ctx: &UiContext, key: &str, value: &str) {
    let key = if ctx.use_fancy_output() {
        style(key).dim().to_string()
    } else {
        key.to_string()
    };
    println!("  {}: {}", key, value);
}

/// Key-value pair colored green when `ok`, yellow otherwise
pub fn key_value_status(ctx: &UiContext, key: &str, value: &str, ok: bool) {
    let level = if ok { Level::Ok } else { Level::Warn };
    if ctx.use_fancy_output() {
        println!(
            "  {}: {}",
            style(key).dim(),
            level.color().apply_to(value)
        );
    } else {
        println!("  {} {}: {}", level.tag(), key, value);
    }
}
