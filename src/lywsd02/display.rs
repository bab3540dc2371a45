use std::str::FromStr;

use anyhow::{Error, bail};
use serde::Deserialize;
use tracing::debug;

/// `temp_mode` request field as received; non-strings are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TempModeInput {
    Text(String),
    Other(serde_json::Value),
}

impl TempModeInput {
    pub fn mode(&self) -> Option<TempMode> {
        match self {
            TempModeInput::Text(text) => TempMode::from_input(text),
            TempModeInput::Other(value) => {
                debug!("ignoring temp_mode: not a string: {value}");
                None
            }
        }
    }
}

impl From<String> for TempModeInput {
    fn from(s: String) -> Self {
        TempModeInput::Text(s)
    }
}

/// `clock_mode` request field as received; `12.0` counts as `12`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ClockModeInput {
    Integer(i64),
    Fractional(f64),
    Other(serde_json::Value),
}

impl ClockModeInput {
    pub fn mode(&self) -> Option<ClockMode> {
        match self {
            ClockModeInput::Integer(hours) => ClockMode::from_input(*hours),
            ClockModeInput::Fractional(hours) if hours.fract() == 0.0 => {
                ClockMode::from_input(*hours as i64)
            }
            other => {
                debug!("ignoring clock_mode: unsupported value {other:?}");
                None
            }
        }
    }
}

impl From<i64> for ClockModeInput {
    fn from(hours: i64) -> Self {
        ClockModeInput::Integer(hours)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempMode {
    Celsius,
    Fahrenheit,
}

impl TempMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TempMode::Celsius => "C",
            TempMode::Fahrenheit => "F",
        }
    }

    /// Lenient parse used for request fields: anything unrecognised is a no-op.
    pub fn from_input(input: &str) -> Option<Self> {
        match input.parse() {
            Ok(mode) => Some(mode),
            Err(err) => {
                debug!("ignoring temp_mode: {err:#}");
                None
            }
        }
    }
}

impl FromStr for TempMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "C" => Ok(TempMode::Celsius),
            "F" => Ok(TempMode::Fahrenheit),
            _ => bail!("unknown temperature mode: {s:?}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockMode {
    TwelveHour,
    TwentyFourHour,
}

impl ClockMode {
    pub fn hours(&self) -> u8 {
        match self {
            ClockMode::TwelveHour => 12,
            ClockMode::TwentyFourHour => 24,
        }
    }

    /// `0` is the "not set" value of the request field; any other unknown value is ignored too.
    pub fn from_input(hours: i64) -> Option<Self> {
        match hours {
            12 => Some(ClockMode::TwelveHour),
            24 => Some(ClockMode::TwentyFourHour),
            0 => None,
            _ => {
                debug!("ignoring clock_mode: unsupported value {hours}");
                None
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DisplayPrefs {
    pub temp_mode: Option<TempMode>,
    pub clock_mode: Option<ClockMode>,
}

impl DisplayPrefs {
    pub fn from_inputs(
        temp_mode: Option<&TempModeInput>,
        clock_mode: Option<&ClockModeInput>,
    ) -> Self {
        Self {
            temp_mode: temp_mode.and_then(TempModeInput::mode),
            clock_mode: clock_mode.and_then(ClockModeInput::mode),
        }
    }
}
