use chrono::{DateTime, FixedOffset, Local, Offset as _, Utc};
use chrono_tz::Tz;

/// Source of "now" and of the reference zone used to derive local time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Seconds the reference zone is ahead of UTC at `at`.
    fn utc_offset_seconds(&self, at: DateTime<Utc>) -> i32;
}

/// The host's clock and time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn utc_offset_seconds(&self, at: DateTime<Utc>) -> i32 {
        at.with_timezone(&Local).offset().local_minus_utc()
    }
}

/// The host's clock, displayed in an explicit IANA zone.
#[derive(Debug, Clone, Copy)]
pub struct ZonedClock(pub Tz);

impl Clock for ZonedClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn utc_offset_seconds(&self, at: DateTime<Utc>) -> i32 {
        at.with_timezone(&self.0).offset().fix().local_minus_utc()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub offset: FixedOffset,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { now, offset }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn utc_offset_seconds(&self, _at: DateTime<Utc>) -> i32 {
        self.offset.local_minus_utc()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone as _;

    use super::*;

    #[test]
    fn zoned_clock_follows_dst() {
        let clock = ZonedClock(chrono_tz::Europe::Berlin);

        let winter = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        let summer = Utc.with_ymd_and_hms(2024, 7, 15, 12, 0, 0).unwrap();

        assert_eq!(clock.utc_offset_seconds(winter), 3600);
        assert_eq!(clock.utc_offset_seconds(summer), 7200);
    }

    #[test]
    fn zoned_clock_sub_hour_zone() {
        let clock = ZonedClock(chrono_tz::Asia::Kolkata);
        let at = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();

        assert_eq!(clock.utc_offset_seconds(at), 5 * 3600 + 1800);
    }
}
