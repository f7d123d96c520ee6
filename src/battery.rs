use std::num::IntErrorKind;

use crate::error::StatusError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryState {
    Charging,
    Discharging,
    Full,
    /// No usable status: empty output or a failed poll.
    Unknown,
}

impl BatteryState {
    /// Exact match on the acpi state word. Every other word is treated as
    /// `Full`, which is what acpi reports for "Full" and "Not charging".
    pub fn from_word(word: &str) -> Self {
        match word {
            "Charging" => BatteryState::Charging,
            "Discharging" => BatteryState::Discharging,
            _ => BatteryState::Full,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BatteryState::Charging => "Charging",
            BatteryState::Discharging => "Discharging",
            BatteryState::Full => "Full",
            BatteryState::Unknown => "Unknown",
        }
    }
}

/// One parsed poll. Built fresh every tick and dropped after rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatteryReading {
    pub state: BatteryState,
    /// The state word exactly as the command printed it.
    pub status: String,
    pub percentage: u8,
    pub detail: String,
}

impl BatteryReading {
    pub fn empty() -> Self {
        Self {
            state: BatteryState::Unknown,
            status: String::new(),
            percentage: 0,
            detail: String::new(),
        }
    }

    /// Word shown to the user: the raw status when there is one, so
    /// "Not charging" is not presented as "Full".
    pub fn label(&self) -> &str {
        if self.status.is_empty() { self.state.label() } else { &self.status }
    }
}

/// Parse a status line of the form `<label>: <State>, <NN>%, <detail>`.
///
/// Only the first non-blank line is considered. Empty output yields
/// [`BatteryReading::empty`] instead of an error.
pub fn parse_status(output: &str) -> Result<BatteryReading, StatusError> {
    let Some(line) = output.lines().find(|l| !l.trim().is_empty()) else {
        return Ok(BatteryReading::empty());
    };

    let (_, rest) = line
        .split_once(':')
        .ok_or_else(|| StatusError::MalformedOutput(line.to_string()))?;

    let fields: Vec<&str> = rest.split(',').map(strip_field).collect();
    if fields.len() < 2 {
        return Err(StatusError::InsufficientFields(fields.len()));
    }

    let status = fields[0].to_string();
    let state = BatteryState::from_word(&status);
    let percentage = parse_percentage(fields[1])?;
    let detail = fields.get(2).copied().unwrap_or("").to_string();

    Ok(BatteryReading { state, status, percentage, detail })
}

fn strip_field(field: &str) -> &str {
    let field = field.strip_prefix(' ').unwrap_or(field);
    field.trim_end_matches(['\n', '\r'])
}

fn parse_percentage(field: &str) -> Result<u8, StatusError> {
    let digits = field.trim_end_matches(['\n', '\r']);
    let digits = digits.strip_suffix('%').unwrap_or(digits);
    let value: i64 = match digits.parse() {
        Ok(v) => v,
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => 100,
            IntErrorKind::NegOverflow => 0,
            _ => return Err(StatusError::InvalidPercentage(field.to_string())),
        },
    };
    Ok(value.clamp(0, 100) as u8)
}
