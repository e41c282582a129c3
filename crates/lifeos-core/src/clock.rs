//! Injectable wall clock.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::sync::Mutex;

/// Source of "now" for the organizer.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    fn now_utc(&self) -> DateTime<Utc> {
        self.now().with_timezone(&Utc)
    }

    /// Local wall-clock time, used for date arithmetic.
    fn now_local(&self) -> NaiveDateTime {
        self.now().naive_local()
    }

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// The operating system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Local>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Local>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Build from a local wall-clock reading such as `2025-12-14T09:00:00`.
    ///
    /// Ambiguous or skipped local times (DST transitions) resolve to the
    /// earliest valid instant.
    pub fn at_local(naive: NaiveDateTime) -> Self {
        let now = Local
            .from_local_datetime(&naive)
            .earliest()
            .unwrap_or_else(|| Local.from_utc_datetime(&naive));
        Self::new(now)
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut guard = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *guard += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_advances() {
        let start: NaiveDateTime = "2025-12-14T09:00:00".parse().unwrap();
        let clock = FixedClock::at_local(start);
        assert_eq!(clock.now_local(), start);
        clock.advance(chrono::Duration::seconds(90));
        assert_eq!(
            clock.now_local(),
            "2025-12-14T09:01:30".parse::<NaiveDateTime>().unwrap()
        );
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 12, 14).unwrap());
    }
}
