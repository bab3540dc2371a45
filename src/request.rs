use std::time::Duration;

use macaddr::MacAddr6;
use serde::Deserialize;
use tracing::info;

use crate::error::{Error, Result};
use crate::lywsd02::{
    Clock, ClockModeInput, DisplayPrefs, EncodedWrite, ResolvedTime, TempModeInput, TimeResolver,
    TimestampInput, TzOffsetInput, encode,
};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Data of a `lywsd02.set_time` service call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetTimeRequest {
    pub mac: Option<String>,

    pub timestamp: Option<TimestampInput>,

    pub tz_offset: Option<TzOffsetInput>,

    pub temp_mode: Option<TempModeInput>,

    pub clock_mode: Option<ClockModeInput>,

    /// Seconds.
    pub timeout: Option<u64>,
}

/// Everything the link needs for one device conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetTimePlan {
    pub device: MacAddr6,
    pub resolved: ResolvedTime,
    pub writes: Vec<EncodedWrite>,
    pub timeout: Duration,
}

impl SetTimeRequest {
    pub fn device(&self) -> Result<MacAddr6> {
        let mac = self
            .mac
            .as_deref()
            .map(str::trim)
            .filter(|mac| !mac.is_empty())
            .ok_or(Error::MissingRequiredField("mac"))?;

        mac.to_uppercase()
            .parse()
            .map_err(|_| Error::InvalidDeviceAddress {
                input: mac.to_string(),
            })
    }

    pub fn display_prefs(&self) -> DisplayPrefs {
        DisplayPrefs::from_inputs(self.temp_mode.as_ref(), self.clock_mode.as_ref())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    /// Validates the request and computes the writes without touching the radio.
    pub fn plan<C: Clock>(&self, resolver: &TimeResolver<C>) -> Result<SetTimePlan> {
        let device = self.device()?;
        let resolved = resolver.resolve(self.timestamp.as_ref(), self.tz_offset.as_ref())?;
        let prefs = self.display_prefs();
        let writes = encode(&resolved, &prefs)?;

        info!(
            %device,
            epoch_seconds = resolved.epoch_seconds,
            offset_hours = resolved.offset_hours,
            temp_mode = ?prefs.temp_mode.map(|m| m.as_str()),
            clock_mode = ?prefs.clock_mode.map(|m| m.hours()),
            writes = writes.len(),
            "planned time update"
        );

        Ok(SetTimePlan {
            device,
            resolved,
            writes,
            timeout: self.timeout(),
        })
    }
}
