use std::time::Duration;

use macaddr::MacAddr6;
use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by a `set_time` invocation.
///
/// Everything up to [`Error::EncodingRange`] is detected before the radio is
/// touched; the remaining variants come from the link.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    #[error("invalid device address: {input:?}")]
    InvalidDeviceAddress { input: String },

    #[error("invalid timezone offset: {input:?}")]
    InvalidOffset { input: String },

    #[error("invalid timestamp: {input:?}")]
    InvalidTimestamp { input: String },

    #[error("{field} out of range: expected {expected}, got {value}")]
    EncodingRange {
        field: &'static str,
        expected: &'static str,
        value: i64,
    },

    #[error("no Bluetooth adapters found")]
    NoAdapter,

    #[error("device not found: {0}")]
    DeviceNotFound(MacAddr6),

    #[error("characteristic not found: {0}")]
    CharacteristicNotFound(Uuid),

    #[error("BLE link failure while {action}")]
    LinkFailure {
        action: &'static str,
        #[source]
        source: btleplug::Error,
    },

    #[error("BLE link timed out after {0:?}")]
    LinkTimeout(Duration),
}

impl Error {
    pub fn link(action: &'static str) -> impl FnOnce(btleplug::Error) -> Self {
        move |source| Error::LinkFailure { action, source }
    }

    /// Whether the radio may already have been touched when this error was raised.
    pub fn is_link_error(&self) -> bool {
        matches!(
            self,
            Error::NoAdapter
                | Error::DeviceNotFound(_)
                | Error::CharacteristicNotFound(_)
                | Error::LinkFailure { .. }
                | Error::LinkTimeout(_)
        )
    }
}
