use crate::ui::terminal::{detect_capabilities, TerminalCapabilities};
use pystrano::presentation::ColorWhen;

/// Resolved output settings for one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UiContext {
    pub json: bool,
    /// Style stdout (header and summary)
    pub color: bool,
    /// Style the progress log on stderr
    pub log_color: bool,
    pub unicode: bool,
}

impl UiContext {
    pub fn new(json: bool, cli_color: Option<ColorWhen>) -> Self {
        Self::from_caps(json, cli_color, detect_capabilities())
    }

    pub(crate) fn from_caps(
        json: bool,
        cli_color: Option<ColorWhen>,
        caps: TerminalCapabilities,
    ) -> Self {
        let (color, log_color) = match cli_color {
            Some(ColorWhen::Never) => (false, false),
            Some(ColorWhen::Always) => (true, true),
            Some(ColorWhen::Auto) | None => (
                caps.supports_color && !caps.is_ci,
                caps.stderr_supports_color && !caps.is_ci,
            ),
        };

        Self {
            json,
            color: color && !json,
            log_color,
            unicode: caps.supports_unicode,
        }
    }

    /// Whether anything besides the JSON document goes to stdout.
    pub fn show_text(&self) -> bool {
        !self.json
    }
}
