/// Clock adapter
/// Reads the current instant in one fixed civil time zone, regardless of the
/// host's local zone setting.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// Default station zone
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::New_York;

/// Weekday and time-of-day in the station zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockReading {
    /// 0 = Monday .. 6 = Sunday
    pub weekday: u32,
    /// Seconds since local midnight, 0..86399
    pub seconds: u32,
}

impl ClockReading {
    pub fn is_weekend(&self) -> bool {
        self.weekday >= 5
    }
}

/// Testable version: reading for a given zoned instant
pub fn reading_at<T: TimeZone>(now: &DateTime<T>) -> ClockReading {
    ClockReading {
        weekday: now.weekday().num_days_from_monday(),
        seconds: now.num_seconds_from_midnight(),
    }
}

/// Source of "now" in the station zone
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Tz>;

    fn reading(&self) -> ClockReading {
        reading_at(&self.now())
    }
}

/// Wall clock converted into a fixed zone
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEZONE)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// Clock that follows tokio's time source from a fixed starting instant.
/// Under a paused runtime it only moves when the runtime's time advances.
#[cfg(test)]
#[derive(Debug)]
pub(crate) struct TokioClock {
    anchor: DateTime<Tz>,
    started: tokio::time::Instant,
}

#[cfg(test)]
impl TokioClock {
    pub(crate) fn starting_at(anchor: DateTime<Tz>) -> Self {
        Self {
            anchor,
            started: tokio::time::Instant::now(),
        }
    }
}

#[cfg(test)]
impl Clock for TokioClock {
    fn now(&self) -> DateTime<Tz> {
        let elapsed = chrono::Duration::from_std(self.started.elapsed()).unwrap_or_default();
        self.anchor + elapsed
    }
}
