//! cliclack theme

use cliclack::ThemeState;
use console::Style;

/// Green bars for an offline-ready app
#[derive(Debug, Clone, Default)]
pub struct CommuteTheme;

impl cliclack::Theme for CommuteTheme {
    fn bar_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().green().dim(),
        }
    }

    fn state_symbol_color(&self, state: &ThemeState) -> Style {
        match state {
            ThemeState::Active => Style::new().green(),
            ThemeState::Error(_) => Style::new().red(),
            ThemeState::Cancel => Style::new().dim(),
            ThemeState::Submit => Style::new().cyan(),
        }
    }
}

pub fn init_theme() {
    cliclack::set_theme(CommuteTheme);
}
