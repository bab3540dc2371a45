use anyhow::{Context as _, Result};
use chrono_tz::Tz;
use clap::{Parser, ValueEnum};
use lywsd02_clock::{lywsd02::ZeroTimestamp, request::SetTimeRequest};

#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum ZeroTimestampArg {
    /// A timestamp of 0 means "use the current time".
    #[default]
    Unset,
    /// A timestamp of 0 is 1970-01-01T00:00:00Z.
    Epoch,
}

impl From<ZeroTimestampArg> for ZeroTimestamp {
    fn from(arg: ZeroTimestampArg) -> Self {
        match arg {
            ZeroTimestampArg::Unset => ZeroTimestamp::Unset,
            ZeroTimestampArg::Epoch => ZeroTimestamp::Epoch,
        }
    }
}

#[derive(Debug, Parser)]
pub struct Args {
    #[arg(long, env = "LYWSD02_MAC")]
    pub mac: Option<String>,

    #[arg(long, allow_hyphen_values = true)]
    pub timestamp: Option<String>,

    /// Hours east of UTC, may be fractional (e.g. 5.5 or -3.5).
    #[arg(long, allow_hyphen_values = true)]
    pub tz_offset: Option<String>,

    /// C or F.
    #[arg(long)]
    pub temp_mode: Option<String>,

    /// 12 or 24.
    #[arg(long)]
    pub clock_mode: Option<i64>,

    /// Seconds.
    #[arg(long, env = "LYWSD02_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Service call data as JSON. Field flags take precedence over its values.
    #[arg(long)]
    pub data: Option<String>,

    /// Zone used when neither timestamp nor offset is given. Defaults to the host zone.
    #[arg(long, env = "LYWSD02_TIMEZONE")]
    pub timezone: Option<Tz>,

    #[arg(long, value_enum, default_value_t = ZeroTimestampArg::Unset)]
    pub zero_timestamp: ZeroTimestampArg,

    #[arg(long)]
    pub dry_run: bool,
}

impl Args {
    pub fn request(&self) -> Result<SetTimeRequest> {
        let mut request: SetTimeRequest = match &self.data {
            Some(data) => serde_json::from_str(data)
                .with_context(|| format!("failed to parse service call data: {data}"))?,
            None => SetTimeRequest::default(),
        };

        if let Some(mac) = &self.mac {
            request.mac = Some(mac.clone());
        }
        if let Some(timestamp) = &self.timestamp {
            request.timestamp = Some(timestamp.clone().into());
        }
        if let Some(tz_offset) = &self.tz_offset {
            request.tz_offset = Some(tz_offset.clone().into());
        }
        if let Some(temp_mode) = &self.temp_mode {
            request.temp_mode = Some(temp_mode.clone().into());
        }
        if let Some(clock_mode) = self.clock_mode {
            request.clock_mode = Some(clock_mode.into());
        }
        if let Some(timeout) = self.timeout {
            request.timeout = Some(timeout);
        }

        Ok(request)
    }
}
