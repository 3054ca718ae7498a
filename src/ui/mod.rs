//! Terminal output for the CLI
//!
//! Uses `cliclack` for interactive sessions, with plain line output when
//! stdout is not a terminal or a CI environment is detected.
//!
//! # Example
//!
//! ```rust,ignore
//! use commute_cache::ui::{self, UiContext, ManifestProgress};
//!
//! let ctx = UiContext::detect().with_auto_yes(args.yes);
//!
//! ui::intro(&ctx, "Install commute-tracker-v1");
//! let progress = ManifestProgress::new(&ctx, manifest.len());
//! // ... progress.advance(url) per fetched entry ...
//! progress.finish();
//! ui::outro_success(&ctx, "Installed 11 entries");
//! ```

mod context;
mod output;
mod progress;
mod prompts;
mod theme;

pub use context::UiContext;
pub use output::{
    intro, key_value, key_value_status, note, outro_error, outro_success, outro_warn, remark,
    section, step_info, step_ok, step_ok_detail, step_warn,
};
pub use progress::{ManifestProgress, TaskSpinner};
pub use prompts::confirm;
pub use theme::{init_theme, CommuteTheme};
