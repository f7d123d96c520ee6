use std::time::Duration;

use crate::Cli;

/// Immutable display options, resolved once from the command line.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub interval: Duration,
    pub verbose: bool,
    pub theme: Theme,
    pub render: RenderMode,
    pub command: String,
    pub font: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    /// `notification-battery-*` names
    Notification,
    /// freedesktop `battery-*` names
    Freedesktop,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderMode {
    Icon,
    Text { font_size: f32, colors: bool },
}

pub const DEFAULT_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_COMMAND: &str = "acpi";

fn default_font() -> String { "monospace".into() }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_INTERVAL_SECS),
            verbose: false,
            theme: Theme::Notification,
            render: RenderMode::Icon,
            command: DEFAULT_COMMAND.into(),
            font: default_font(),
        }
    }
}

impl DisplayConfig {
    pub fn from_cli(cli: &Cli) -> Self {
        let render = match cli.text_mode {
            Some(font_size) => RenderMode::Text { font_size, colors: cli.colors },
            None => {
                if cli.colors {
                    log::warn!("--colors only applies to --text-mode, ignoring");
                }
                RenderMode::Icon
            }
        };

        Self {
            interval: Duration::from_secs(cli.interval),
            verbose: cli.verbose,
            theme: if cli.change_icon { Theme::Freedesktop } else { Theme::Notification },
            render,
            command: cli.command.clone(),
            font: cli.font.clone().unwrap_or_else(default_font),
        }
    }
}
