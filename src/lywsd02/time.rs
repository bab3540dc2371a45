use std::fmt;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::lywsd02::Clock;

const SECONDS_PER_HOUR: i64 = 3600;

/// Caller-supplied timezone offset in hours, as it arrives in a request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TzOffsetInput {
    Integer(i64),
    Fractional(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Caller-supplied epoch timestamp, as it arrives in a request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum TimestampInput {
    Integer(i64),
    /// Truncated toward zero.
    Fractional(f64),
    Text(String),
    Other(serde_json::Value),
}

/// Whole-hour offset plus the sub-hour part that gets folded into the timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParsedOffset {
    pub hours: i64,
    pub remainder_seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTime {
    pub epoch_seconds: i64,
    pub offset_hours: i64,
}

/// How a timestamp of exactly `0` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroTimestamp {
    /// `0` means "not supplied"; the current time is used instead.
    #[default]
    Unset,
    /// `0` is 1970-01-01T00:00:00Z.
    Epoch,
}

impl TzOffsetInput {
    pub fn parse(&self) -> Result<ParsedOffset> {
        match self {
            TzOffsetInput::Integer(hours) => Ok(ParsedOffset::whole(*hours)),
            TzOffsetInput::Fractional(value) => {
                ParsedOffset::fractional(*value).ok_or_else(|| self.invalid())
            }
            TzOffsetInput::Text(text) => {
                let text = text.trim();
                if text.contains('.') {
                    let value: f64 = text.parse().map_err(|_| self.invalid())?;
                    ParsedOffset::fractional(value).ok_or_else(|| self.invalid())
                } else {
                    let hours = text.parse().map_err(|_| self.invalid())?;
                    Ok(ParsedOffset::whole(hours))
                }
            }
            TzOffsetInput::Other(_) => Err(self.invalid()),
        }
    }

    fn invalid(&self) -> Error {
        Error::InvalidOffset {
            input: self.to_string(),
        }
    }
}

impl fmt::Display for TzOffsetInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TzOffsetInput::Integer(v) => write!(f, "{v}"),
            TzOffsetInput::Fractional(v) => write!(f, "{v}"),
            TzOffsetInput::Text(v) => f.write_str(v),
            TzOffsetInput::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<String> for TzOffsetInput {
    fn from(s: String) -> Self {
        TzOffsetInput::Text(s)
    }
}

impl TimestampInput {
    pub fn parse(&self) -> Result<i64> {
        match self {
            TimestampInput::Integer(v) => Ok(*v),
            TimestampInput::Fractional(v) => {
                let truncated = v.trunc();
                if truncated.is_finite() && (i64::MIN as f64..i64::MAX as f64).contains(&truncated)
                {
                    Ok(truncated as i64)
                } else {
                    Err(self.invalid())
                }
            }
            TimestampInput::Text(text) => text.trim().parse().map_err(|_| self.invalid()),
            TimestampInput::Other(_) => Err(self.invalid()),
        }
    }

    fn invalid(&self) -> Error {
        let input = match self {
            TimestampInput::Integer(v) => v.to_string(),
            TimestampInput::Fractional(v) => v.to_string(),
            TimestampInput::Text(v) => v.clone(),
            TimestampInput::Other(v) => v.to_string(),
        };
        Error::InvalidTimestamp { input }
    }
}

impl From<String> for TimestampInput {
    fn from(s: String) -> Self {
        TimestampInput::Text(s)
    }
}

impl ParsedOffset {
    pub fn whole(hours: i64) -> Self {
        Self {
            hours,
            remainder_seconds: 0,
        }
    }

    /// Floor-divides `value` by one hour: `-5.5` becomes `-6` hours and `+1800` seconds.
    pub fn fractional(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }

        let hours = value.floor();
        let fraction = value - hours;

        Some(Self {
            hours: hours as i64,
            remainder_seconds: (fraction * SECONDS_PER_HOUR as f64).round() as i64,
        })
    }
}

#[derive(Debug, Clone)]
pub struct TimeResolver<C> {
    clock: C,
    zero_timestamp: ZeroTimestamp,
}

impl<C: Clock> TimeResolver<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            zero_timestamp: ZeroTimestamp::default(),
        }
    }

    pub fn with_zero_timestamp(mut self, zero_timestamp: ZeroTimestamp) -> Self {
        self.zero_timestamp = zero_timestamp;
        self
    }

    pub fn resolve(
        &self,
        timestamp: Option<&TimestampInput>,
        tz_offset: Option<&TzOffsetInput>,
    ) -> Result<ResolvedTime> {
        let offset = tz_offset.map(TzOffsetInput::parse).transpose()?;
        let timestamp = timestamp
            .map(TimestampInput::parse)
            .transpose()?
            .filter(|&ts| ts != 0 || self.zero_timestamp == ZeroTimestamp::Epoch);

        let resolved = match (timestamp, offset) {
            (Some(timestamp), offset) => {
                let offset = offset.unwrap_or_default();
                ResolvedTime {
                    epoch_seconds: timestamp.saturating_add(offset.remainder_seconds),
                    offset_hours: offset.hours,
                }
            }
            (None, Some(offset)) => ResolvedTime {
                epoch_seconds: self
                    .clock
                    .now()
                    .timestamp()
                    .saturating_add(offset.remainder_seconds),
                offset_hours: offset.hours,
            },
            (None, None) => self.local_time(),
        };

        debug!(
            epoch_seconds = resolved.epoch_seconds,
            offset_hours = resolved.offset_hours,
            "resolved device time"
        );

        Ok(resolved)
    }

    /// Current time as the reference zone's wall clock would show it.
    fn local_time(&self) -> ResolvedTime {
        let now = self.clock.now();
        let diff = i64::from(self.clock.utc_offset_seconds(now));

        ResolvedTime {
            epoch_seconds: now.timestamp() + diff.rem_euclid(SECONDS_PER_HOUR),
            offset_hours: diff.div_euclid(SECONDS_PER_HOUR),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{FixedOffset, TimeZone as _, Utc};

    use super::*;
    use crate::lywsd02::FixedClock;

    const NOW: i64 = 1_750_000_000;

    fn resolver(offset_seconds: i32) -> TimeResolver<FixedClock> {
        let now = Utc.timestamp_opt(NOW, 0).unwrap();
        let offset = FixedOffset::east_opt(offset_seconds).unwrap();
        TimeResolver::new(FixedClock::new(now, offset))
    }

    fn text(s: &str) -> TzOffsetInput {
        TzOffsetInput::Text(s.to_string())
    }

    #[test]
    fn integral_offsets_have_no_remainder() {
        for hours in -12..=14 {
            let parsed = TzOffsetInput::Integer(hours).parse().unwrap();
            assert_eq!(parsed, ParsedOffset::whole(hours));

            let parsed = text(&hours.to_string()).parse().unwrap();
            assert_eq!(parsed, ParsedOffset::whole(hours));
        }
    }

    #[test]
    fn fractional_offsets_floor_hours() {
        let cases = [
            (5.5, 5, 1800),
            (5.75, 5, 2700),
            (-5.5, -6, 1800),
            (-3.25, -4, 2700),
            (0.1, 0, 360),
            (9.0, 9, 0),
        ];

        for (value, hours, remainder_seconds) in cases {
            let expected = ParsedOffset {
                hours,
                remainder_seconds,
            };
            assert_eq!(
                TzOffsetInput::Fractional(value).parse().unwrap(),
                expected,
                "{value}"
            );
            assert_eq!(text(&format!("{value:?}")).parse().unwrap(), expected, "{value}");
        }
    }

    #[test]
    fn invalid_offsets() {
        for input in [text("abc"), text(""), text("5.5.5"), text("inf"), text("NaN.")] {
            assert!(
                matches!(input.parse(), Err(Error::InvalidOffset { .. })),
                "{input:?}"
            );
        }
        assert!(matches!(
            TzOffsetInput::Fractional(f64::NAN).parse(),
            Err(Error::InvalidOffset { .. })
        ));

        let input: TzOffsetInput = serde_json::from_str("[5]").unwrap();
        assert!(matches!(input.parse(), Err(Error::InvalidOffset { .. })));
    }

    #[test]
    fn invalid_timestamp() {
        let input = TimestampInput::Text("yesterday".to_string());
        let err = resolver(0).resolve(Some(&input), None).unwrap_err();
        assert!(matches!(err, Error::InvalidTimestamp { .. }));

        let input = TimestampInput::Text("1700000000.5".to_string());
        assert!(input.parse().is_err());

        for input in [
            TimestampInput::Fractional(f64::NAN),
            TimestampInput::Fractional(f64::INFINITY),
            TimestampInput::Fractional(1e30),
            TimestampInput::Other(serde_json::Value::Bool(true)),
        ] {
            assert!(
                matches!(input.parse(), Err(Error::InvalidTimestamp { .. })),
                "{input:?}"
            );
        }
    }

    #[test]
    fn fractional_timestamp_is_truncated() {
        assert_eq!(
            TimestampInput::Fractional(1_700_000_000.9).parse().unwrap(),
            1_700_000_000
        );

        let ts: TimestampInput = serde_json::from_str("1700000000.5").unwrap();
        let resolved = resolver(0)
            .resolve(Some(&ts), Some(&TzOffsetInput::Integer(3)))
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedTime {
                epoch_seconds: 1_700_000_000,
                offset_hours: 3
            }
        );
    }

    #[test]
    fn explicit_timestamp_and_offset() {
        let ts = TimestampInput::Integer(1_700_000_000);

        let resolved = resolver(0)
            .resolve(Some(&ts), Some(&TzOffsetInput::Integer(5)))
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedTime {
                epoch_seconds: 1_700_000_000,
                offset_hours: 5
            }
        );

        let resolved = resolver(0)
            .resolve(Some(&ts), Some(&TzOffsetInput::Fractional(5.5)))
            .unwrap();
        assert_eq!(
            resolved,
            ResolvedTime {
                epoch_seconds: 1_700_000_000 + 1800,
                offset_hours: 5
            }
        );
    }

    #[test]
    fn explicit_timestamp_without_offset() {
        let ts = TimestampInput::Text(" 1700000000 ".to_string());
        let resolved = resolver(9 * 3600).resolve(Some(&ts), None).unwrap();

        assert_eq!(
            resolved,
            ResolvedTime {
                epoch_seconds: 1_700_000_000,
                offset_hours: 0
            }
        );
    }

    #[test]
    fn offset_without_timestamp_uses_now() {
        let resolved = resolver(9 * 3600)
            .resolve(None, Some(&text("-3.5")))
            .unwrap();

        assert_eq!(
            resolved,
            ResolvedTime {
                epoch_seconds: NOW + 1800,
                offset_hours: -4
            }
        );
    }

    #[test]
    fn local_time_derivation() {
        let cases = [
            (0, NOW, 0),
            (9 * 3600, NOW, 9),
            (-5 * 3600, NOW, -5),
            (5 * 3600 + 1800, NOW + 1800, 5),
            (-(3 * 3600 + 1800), NOW + 1800, -4),
            (5 * 3600 + 45 * 60, NOW + 45 * 60, 5),
        ];

        for (offset_seconds, epoch_seconds, offset_hours) in cases {
            let resolved = resolver(offset_seconds).resolve(None, None).unwrap();
            assert_eq!(
                resolved,
                ResolvedTime {
                    epoch_seconds,
                    offset_hours
                },
                "{offset_seconds}"
            );
        }
    }

    #[test]
    fn zero_timestamp_is_unset_by_default() {
        let zero = TimestampInput::Integer(0);
        let resolved = resolver(2 * 3600)
            .resolve(Some(&zero), Some(&TzOffsetInput::Integer(1)))
            .unwrap();

        assert_eq!(
            resolved,
            ResolvedTime {
                epoch_seconds: NOW,
                offset_hours: 1
            }
        );
    }

    #[test]
    fn zero_timestamp_as_epoch() {
        let zero = TimestampInput::Integer(0);
        let resolved = resolver(2 * 3600)
            .with_zero_timestamp(ZeroTimestamp::Epoch)
            .resolve(Some(&zero), Some(&TzOffsetInput::Fractional(1.5)))
            .unwrap();

        assert_eq!(
            resolved,
            ResolvedTime {
                epoch_seconds: 1800,
                offset_hours: 1
            }
        );
    }

    #[test]
    fn deserialize_inputs() {
        let offset: TzOffsetInput = serde_json::from_str("5").unwrap();
        assert_eq!(offset, TzOffsetInput::Integer(5));

        let offset: TzOffsetInput = serde_json::from_str("5.5").unwrap();
        assert_eq!(offset, TzOffsetInput::Fractional(5.5));

        let offset: TzOffsetInput = serde_json::from_str("\"-2.5\"").unwrap();
        assert_eq!(offset, text("-2.5"));

        let ts: TimestampInput = serde_json::from_str("1700000000").unwrap();
        assert_eq!(ts, TimestampInput::Integer(1_700_000_000));
    }
}
