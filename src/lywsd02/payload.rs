use tracing::debug;

use crate::error::{Error, Result};
use crate::lywsd02::{Characteristic, ClockMode, DisplayPrefs, ResolvedTime, TempMode};

pub const MIN_OFFSET_HOURS: i64 = -12;
pub const MAX_OFFSET_HOURS: i64 = 14;

const TEMP_MODE_FAHRENHEIT: u8 = 0x01;
const TEMP_MODE_CELSIUS: u8 = 0xff;

const CLOCK_MODE_12H: u8 = 0xaa;
const CLOCK_MODE_24H: u8 = 0x00;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedWrite {
    pub target: Characteristic,
    pub bytes: Vec<u8>,
}

/// Builds the writes for one device conversation, in transmission order.
///
/// Range checks run before anything is produced, so an error here means no
/// write must be attempted.
pub fn encode(resolved: &ResolvedTime, prefs: &DisplayPrefs) -> Result<Vec<EncodedWrite>> {
    let time = encode_time(resolved)?;

    let mut writes = Vec::with_capacity(3);
    writes.push(EncodedWrite {
        target: Characteristic::Time,
        bytes: time.to_vec(),
    });

    if let Some(temp_mode) = prefs.temp_mode {
        writes.push(EncodedWrite {
            target: Characteristic::Mode,
            bytes: encode_temp_mode(temp_mode).to_vec(),
        });
    }

    if let Some(clock_mode) = prefs.clock_mode {
        // The firmware takes the 12/24h switch on the time characteristic, not the mode one.
        writes.push(EncodedWrite {
            target: Characteristic::Time,
            bytes: encode_clock_mode(clock_mode).to_vec(),
        });
    }

    debug!(count = writes.len(), "encoded writes");

    Ok(writes)
}

/// `u32` LE epoch seconds followed by `i8` offset hours.
pub fn encode_time(resolved: &ResolvedTime) -> Result<[u8; 5]> {
    let epoch_seconds =
        u32::try_from(resolved.epoch_seconds).map_err(|_| Error::EncodingRange {
            field: "epoch seconds",
            expected: "0..=4294967295",
            value: resolved.epoch_seconds,
        })?;

    if !(MIN_OFFSET_HOURS..=MAX_OFFSET_HOURS).contains(&resolved.offset_hours) {
        return Err(Error::EncodingRange {
            field: "offset hours",
            expected: "-12..=14",
            value: resolved.offset_hours,
        });
    }
    let offset_hours = resolved.offset_hours as i8;

    let mut buf = [0u8; 5];
    buf[..4].copy_from_slice(&epoch_seconds.to_le_bytes());
    buf[4] = offset_hours.to_le_bytes()[0];

    Ok(buf)
}

pub fn encode_temp_mode(mode: TempMode) -> [u8; 1] {
    match mode {
        TempMode::Fahrenheit => [TEMP_MODE_FAHRENHEIT],
        TempMode::Celsius => [TEMP_MODE_CELSIUS],
    }
}

/// Four zero bytes, two zero bytes, then the mode byte.
pub fn encode_clock_mode(mode: ClockMode) -> [u8; 7] {
    let mode = match mode {
        ClockMode::TwelveHour => CLOCK_MODE_12H,
        ClockMode::TwentyFourHour => CLOCK_MODE_24H,
    };

    let mut buf = [0u8; 7];
    buf[6] = mode;
    buf
}
