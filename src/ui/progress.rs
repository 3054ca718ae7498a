//! Spinners and install progress with plain fallback

use super::context::UiContext;
use crate::http::Url;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Spinner around one lifecycle step such as activation
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    fancy: bool,
}

impl TaskSpinner {
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            fancy: ctx.use_fancy_output(),
        }
    }

    pub fn start(&mut self, message: &str) {
        if !self.fancy {
            println!("{} {}", style("...").dim(), message);
            return;
        }
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.spinner = Some(spinner);
    }

    pub fn stop(&mut self, message: &str) {
        self.finish(message, false);
    }

    pub fn stop_error(&mut self, message: &str) {
        self.finish(message, true);
    }

    fn finish(&mut self, message: &str, failed: bool) {
        match (self.spinner.take(), failed) {
            (Some(spinner), false) => spinner.stop(message),
            (Some(spinner), true) => spinner.error(message),
            (None, false) => println!("{} {}", style("[OK]").green(), message),
            (None, true) => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}

/// Progress over the manifest entries fetched during install.
///
/// Cheap to clone; clones drive the same bar.
#[derive(Clone)]
pub struct ManifestProgress {
    bar: Option<ProgressBar>,
}

impl ManifestProgress {
    pub fn new(ctx: &UiContext, total: usize) -> Self {
        let bar = if ctx.use_fancy_output() {
            let bar = ProgressBar::new(total as u64);
            if let Ok(bar_style) = ProgressStyle::with_template(
                "  {spinner:.green} Caching  {bar:24.green/dim} {pos}/{len} {msg:.dim}",
            ) {
                bar.set_style(bar_style.progress_chars("━╸─"));
            }
            bar.enable_steady_tick(std::time::Duration::from_millis(120));
            Some(bar)
        } else {
            println!("Fetching {} manifest entries...", total);
            None
        };
        Self { bar }
    }

    /// Mark `url` as fetched
    pub fn advance(&self, url: &Url) {
        match &self.bar {
            Some(bar) => {
                bar.inc(1);
                bar.set_message(short_label(url));
            }
            None => println!("  fetched {}", url),
        }
    }

    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}

/// Last path segment, or the host for a bare origin
fn short_label(url: &Url) -> String {
    match url.path().rsplit('/').find(|s| !s.is_empty()) {
        Some(segment) => segment.to_string(),
        None => url.authority().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_non_interactive() {
        let ctx = UiContext::non_interactive();
        let mut spinner = TaskSpinner::new(&ctx);
        spinner.start("Activating commute-tracker-v1...");
        spinner.stop("commute-tracker-v1 is active");
        spinner.start("Activating commute-tracker-v2...");
        spinner.stop_error("commute-tracker-v2 was not activated");
        assert!(spinner.spinner.is_none());
    }

    #[test]
    fn manifest_progress_non_interactive() {
        let ctx = UiContext::non_interactive();
        let progress = ManifestProgress::new(&ctx, 1);
        progress.advance(&Url::parse("http://localhost:8000/static/main.js").unwrap());
        progress.finish();
    }

    #[test]
    fn short_label_prefers_file_name() {
        let url = Url::parse("https://cdn.jsdelivr.net/npm/echarts@5.4.3/dist/echarts.min.js")
            .unwrap();
        assert_eq!(short_label(&url), "echarts.min.js");

        let url = Url::parse("https://cdn.tailwindcss.com").unwrap();
        assert_eq!(short_label(&url), "cdn.tailwindcss.com");
    }
}
