use crate::battery::{BatteryReading, BatteryState};
use crate::config::{DisplayConfig, RenderMode, Theme};
use crate::error::StatusError;

pub const MISSING_ICON: &str = "battery-missing";

pub const TEXT_DEFAULT_COLOR: [u8; 4] = [0xFF, 0xFF, 0xFF, 0xFF];
pub const TEXT_LOW_COLOR: [u8; 4] = [0xEF, 0x44, 0x44, 0xFF]; // red
pub const TEXT_HIGH_COLOR: [u8; 4] = [0x4A, 0xDE, 0x80, 0xFF]; // green

/// What the tray should show for one poll.
#[derive(Debug, Clone, PartialEq)]
pub enum Glyph {
    /// Icon theme name
    Icon(String),
    /// Short label rendered to a pixmap
    Text { label: String, color: [u8; 4] },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub glyph: Glyph,
    pub tooltip: String,
}

impl Theme {
    fn base(&self) -> &'static str {
        match self {
            Theme::Notification => "notification-battery",
            Theme::Freedesktop => "battery",
        }
    }

    /// Suffix for the four charge tiers: <20, 20-39, 40-79, >=80.
    fn tier_suffix(&self, percentage: u8) -> &'static str {
        let tier = match percentage {
            0..=19 => 0,
            20..=39 => 1,
            40..=79 => 2,
            _ => 3,
        };
        match self {
            Theme::Notification => ["-low", "-020", "-060", "-100"][tier],
            Theme::Freedesktop => ["-caution", "-low", "-good", "-full"][tier],
        }
    }

    fn charging_suffix(&self) -> &'static str {
        match self {
            Theme::Notification => "-plugged",
            Theme::Freedesktop => "-charging",
        }
    }
}

pub fn icon_name(reading: &BatteryReading, theme: Theme) -> String {
    if reading.state == BatteryState::Unknown {
        return MISSING_ICON.to_string();
    }

    let mut name = String::from(theme.base());
    name.push_str(theme.tier_suffix(reading.percentage));
    if reading.state == BatteryState::Charging {
        name.push_str(theme.charging_suffix());
    }
    name
}

pub fn text_color(percentage: u8, colors: bool) -> [u8; 4] {
    if !colors {
        return TEXT_DEFAULT_COLOR;
    }
    if percentage < 20 {
        TEXT_LOW_COLOR
    } else if percentage > 80 {
        TEXT_HIGH_COLOR
    } else {
        TEXT_DEFAULT_COLOR
    }
}

pub fn tooltip(reading: &BatteryReading, verbose: bool) -> String {
    let detail = if verbose { reading.detail.as_str() } else { "" };
    format!("{} ({}%) {}", reading.label(), reading.percentage, detail)
        .trim_end()
        .to_string()
}

pub fn select(reading: &BatteryReading, config: &DisplayConfig) -> Display {
    let glyph = match config.render {
        RenderMode::Icon => Glyph::Icon(icon_name(reading, config.theme)),
        RenderMode::Text { colors, .. } => {
            if reading.state == BatteryState::Unknown {
                Glyph::Text { label: "?".into(), color: TEXT_DEFAULT_COLOR }
            } else {
                Glyph::Text {
                    label: format!("{}%", reading.percentage),
                    color: text_color(reading.percentage, colors),
                }
            }
        }
    };

    Display { glyph, tooltip: tooltip(reading, config.verbose) }
}

/// Display for a poll that produced no reading.
pub fn degraded(err: &StatusError, config: &DisplayConfig) -> Display {
    let mut display = select(&BatteryReading::empty(), config);
    display.tooltip = format!("Battery status unavailable: {}", err);
    display
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(state: BatteryState, percentage: u8) -> BatteryReading {
        BatteryReading {
            state,
            status: state.label().into(),
            percentage,
            detail: "01:10:00 remaining".into(),
        }
    }

    #[test]
    fn notification_theme_tier_boundaries() {
        let cases = [
            (0, "notification-battery-low"),
            (19, "notification-battery-low"),
            (20, "notification-battery-020"),
            (39, "notification-battery-020"),
            (40, "notification-battery-060"),
            (79, "notification-battery-060"),
            (80, "notification-battery-100"),
            (100, "notification-battery-100"),
        ];
        for (pct, expected) in cases {
            let r = reading(BatteryState::Discharging, pct);
            assert_eq!(icon_name(&r, Theme::Notification), expected, "at {pct}%");
        }
    }

    #[test]
    fn freedesktop_theme_tier_boundaries() {
        let cases = [
            (19, "battery-caution"),
            (20, "battery-low"),
            (39, "battery-low"),
            (40, "battery-good"),
            (79, "battery-good"),
            (80, "battery-full"),
        ];
        for (pct, expected) in cases {
            let r = reading(BatteryState::Full, pct);
            assert_eq!(icon_name(&r, Theme::Freedesktop), expected, "at {pct}%");
        }
    }

    #[test]
    fn charging_appends_theme_suffix() {
        let r = reading(BatteryState::Charging, 55);
        assert_eq!(icon_name(&r, Theme::Notification), "notification-battery-060-plugged");
        assert_eq!(icon_name(&r, Theme::Freedesktop), "battery-good-charging");
    }

    #[test]
    fn unknown_state_uses_missing_icon() {
        let r = BatteryReading::empty();
        assert_eq!(icon_name(&r, Theme::Notification), MISSING_ICON);
        assert_eq!(icon_name(&r, Theme::Freedesktop), MISSING_ICON);
    }

    #[test]
    fn tooltip_respects_verbosity() {
        let r = reading(BatteryState::Discharging, 42);
        assert_eq!(tooltip(&r, false), "Discharging (42%)");
        assert_eq!(tooltip(&r, true), "Discharging (42%) 01:10:00 remaining");
    }

    #[test]
    fn tooltip_without_detail_has_no_trailing_space() {
        let r = BatteryReading {
            state: BatteryState::Full,
            status: "Full".into(),
            percentage: 100,
            detail: String::new(),
        };
        assert_eq!(tooltip(&r, true), "Full (100%)");
    }

    #[test]
    fn tooltip_shows_the_raw_status_word() {
        let r = BatteryReading {
            state: BatteryState::Full,
            status: "Not charging".into(),
            percentage: 97,
            detail: String::new(),
        };
        assert_eq!(tooltip(&r, false), "Not charging (97%)");
        assert_eq!(icon_name(&r, Theme::Notification), "notification-battery-100");
    }

    #[test]
    fn text_mode_unknown_reading_shows_question_mark() {
        let config = DisplayConfig {
            render: RenderMode::Text { font_size: 12.0, colors: true },
            ..DisplayConfig::default()
        };
        let display = select(&BatteryReading::empty(), &config);
        assert_eq!(display.glyph, Glyph::Text { label: "?".into(), color: TEXT_DEFAULT_COLOR });
        assert_eq!(display.tooltip, "Unknown (0%)");
    }

    #[test]
    fn text_colors_by_threshold() {
        assert_eq!(text_color(19, true), TEXT_LOW_COLOR);
        assert_eq!(text_color(20, true), TEXT_DEFAULT_COLOR);
        assert_eq!(text_color(80, true), TEXT_DEFAULT_COLOR);
        assert_eq!(text_color(81, true), TEXT_HIGH_COLOR);
        assert_eq!(text_color(5, false), TEXT_DEFAULT_COLOR);
        assert_eq!(text_color(95, false), TEXT_DEFAULT_COLOR);
    }

    #[test]
    fn text_mode_selects_percentage_label() {
        let config = DisplayConfig {
            render: RenderMode::Text { font_size: 12.0, colors: true },
            ..DisplayConfig::default()
        };
        let display = select(&reading(BatteryState::Discharging, 12), &config);
        assert_eq!(display.glyph, Glyph::Text { label: "12%".into(), color: TEXT_LOW_COLOR });
        assert_eq!(display.tooltip, "Discharging (12%)");
    }

    #[test]
    fn degraded_display_names_the_error() {
        let config = DisplayConfig::default();
        let err = StatusError::InsufficientFields(1);
        let display = degraded(&err, &config);
        assert_eq!(display.glyph, Glyph::Icon(MISSING_ICON.into()));
        assert_eq!(
            display.tooltip,
            "Battery status unavailable: expected at least 2 status fields, found 1"
        );
    }
}
