use std::fmt;

use uuid::{Uuid, uuid};

// Ref: https://github.com/h4/lywsd02/blob/master/lywsd02/client.py
pub const TIME_CHARACTERISTIC_UUID: Uuid = uuid!("ebe0ccb7-7a0a-4b0c-8a1a-6ff2997da3a6");
pub const MODE_CHARACTERISTIC_UUID: Uuid = uuid!("ebe0ccbe-7a0a-4b0c-8a1a-6ff2997da3a6");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Characteristic {
    /// Clock value and timezone offset. Also receives the clock-mode write.
    Time,
    /// Temperature unit.
    Mode,
}

impl Characteristic {
    pub fn uuid(&self) -> Uuid {
        match self {
            Characteristic::Time => TIME_CHARACTERISTIC_UUID,
            Characteristic::Mode => MODE_CHARACTERISTIC_UUID,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Characteristic::Time => "time",
            Characteristic::Mode => "mode",
        }
    }
}

impl fmt::Display for Characteristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.as_str(), self.uuid())
    }
}
